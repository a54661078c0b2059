use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use log::{debug, info};

use crate::cli::error::{
    clean_tags, parse_category, validate_task_id, validate_task_name, validate_time_range, UserError,
};
use crate::cli::output::{
    build_task_rows, format_tagset_summary, format_task_detail, format_task_list,
    format_weekly_summaries, get_terminal_width, is_tty,
};
use crate::config::Config;
use crate::models::{Category, Task, Timestamp, Watch};
use crate::report::{current_week_start, week_starts};
use crate::store::TaskStore;
use crate::utils::{format_duration, parse_date_expr, parse_interval_at};

#[derive(Parser)]
#[command(name = "ow")]
#[command(about = "Owatch - track time spent on named tasks and summarize it by tag")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Task data file (overrides ~/.owatch/rc)
    #[arg(long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task
    Add {
        /// Task name
        #[arg(required = true)]
        name: Vec<String>,
        /// Longer description of the task
        #[arg(short = 'd', long)]
        description: Option<String>,
        /// Tag (repeatable, or comma-separated)
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,
        /// Category: work, completed or backlog
        #[arg(short = 'c', long, value_parser = parse_category)]
        category: Option<Category>,
    },
    /// List tasks, most recently active first
    List {
        /// Only show tasks in this category
        #[arg(short = 'c', long, value_parser = parse_category)]
        category: Option<Category>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show a task and all of its segments
    Show {
        /// Task ID
        id: String,
    },
    /// Start timing a task
    Start {
        /// Task ID
        id: String,
        /// Note for the new segment
        note: Vec<String>,
        /// Start time (defaults to now)
        #[arg(long, allow_hyphen_values = true)]
        at: Option<String>,
    },
    /// Stop timing a task
    Stop {
        /// Task ID
        id: String,
        /// Stop time (defaults to now)
        #[arg(long, allow_hyphen_values = true)]
        at: Option<String>,
    },
    /// Record a finished segment (e.g., "09:00..11:30")
    Log {
        /// Task ID
        id: String,
        /// Interval START..END
        #[arg(allow_hyphen_values = true)]
        interval: String,
        /// Note for the segment
        note: Vec<String>,
    },
    /// Change a task's name, description or tags
    Modify {
        /// Task ID
        id: String,
        /// New task name
        #[arg(long)]
        name: Option<String>,
        /// New description
        #[arg(short = 'd', long)]
        description: Option<String>,
        /// Replace the tags (repeatable, or comma-separated)
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,
        /// Remove every tag
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },
    /// Move a task to another category
    Category {
        /// Task ID
        id: String,
        /// New category: work, completed or backlog
        #[arg(value_parser = parse_category)]
        category: Category,
    },
    /// Delete a task and its segments
    Delete {
        /// Task ID
        id: String,
    },
    /// Weekly time report grouped by tagset
    Summary {
        /// List tasks under each tagset
        #[arg(long)]
        tasks: bool,
        /// First week to report (defaults to the earliest segment)
        #[arg(long, allow_hyphen_values = true)]
        start: Option<String>,
        /// Last week to report (defaults to the latest segment)
        #[arg(long, allow_hyphen_values = true)]
        finish: Option<String>,
    },
    /// Total time per tagset over a range
    Tagsets {
        /// List tasks under each tagset
        #[arg(long)]
        tasks: bool,
        /// Only count segments finishing after this time
        #[arg(long, allow_hyphen_values = true)]
        start: Option<String>,
        /// Only count segments finishing at or before this time
        #[arg(long, allow_hyphen_values = true)]
        finish: Option<String>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    execute(cli)
}

/// Execute a parsed command line
pub fn execute(cli: Cli) -> Result<()> {
    let mut session = Session::open(cli.file)?;

    match cli.command {
        Commands::Add { name, description, tags, category } => {
            handle_add(&mut session, name, description, tags, category)
        }
        Commands::List { category, json } => handle_list(&session, category, json),
        Commands::Show { id } => handle_show(&session, &id),
        Commands::Start { id, note, at } => handle_start(&mut session, &id, note, at),
        Commands::Stop { id, at } => handle_stop(&mut session, &id, at),
        Commands::Log { id, interval, note } => handle_log(&mut session, &id, &interval, note),
        Commands::Modify { id, name, description, tags, clear_tags } => {
            handle_modify(&mut session, &id, name, description, tags, clear_tags)
        }
        Commands::Category { id, category } => handle_category(&mut session, &id, category),
        Commands::Delete { id } => handle_delete(&mut session, &id),
        Commands::Summary { tasks, start, finish } => handle_summary(&session, tasks, start, finish),
        Commands::Tagsets { tasks, start, finish } => handle_tagsets(&session, tasks, start, finish),
    }
}

/// Loaded watch plus the store it came from
struct Session {
    store: Box<dyn TaskStore>,
    watch: Watch,
}

impl Session {
    fn open(file: Option<PathBuf>) -> Result<Self> {
        let config = Config::resolve(file);
        debug!("Using {:?} store at {}", config.backend, config.data_path.display());

        let store = config.open_store();
        let watch = Watch::load_from(store.as_ref()).context("Failed to load tasks")?;
        Ok(Self { store, watch })
    }

    fn save(&self) -> Result<()> {
        self.watch
            .save_to(self.store.as_ref())
            .context("Failed to save tasks")
    }

    /// Turn a 1-based ID into a watch index
    fn resolve(&self, id_str: &str) -> Result<usize> {
        let id = validate_task_id(id_str)?;
        if id > self.watch.len() {
            return Err(UserError::TaskNotFound(id).into());
        }
        Ok(id - 1)
    }

    fn task(&self, index: usize) -> Result<&Task> {
        self.watch
            .task(index)
            .ok_or_else(|| UserError::TaskNotFound(index + 1).into())
    }

    fn task_mut(&mut self, index: usize) -> Result<&mut Task> {
        self.watch
            .task_mut(index)
            .ok_or_else(|| UserError::TaskNotFound(index + 1).into())
    }
}

fn parse_time_arg(expr: Option<String>) -> Result<Option<Timestamp>> {
    expr.map(|e| parse_date_expr(&e)).transpose()
}

fn split_tags(raw: Vec<String>) -> Vec<String> {
    clean_tags(
        raw.iter()
            .flat_map(|t| t.split(','))
            .map(str::to_string)
            .collect(),
    )
}

fn handle_add(
    session: &mut Session,
    name: Vec<String>,
    description: Option<String>,
    tags: Vec<String>,
    category: Option<Category>,
) -> Result<()> {
    let name = name.join(" ").trim().to_string();
    validate_task_name(&name)?;

    let tags = split_tags(tags);
    let task = session
        .watch
        .add_task(name, description.unwrap_or_default(), tags, category);
    let (name, category) = (task.name.clone(), task.category());
    let id = session.watch.len();

    session.save()?;
    info!("Added task {} ({})", id, category);
    println!("Created task {}: {}", id, name);
    Ok(())
}

fn handle_list(session: &Session, category: Option<Category>, json: bool) -> Result<()> {
    let tasks = session.watch.tasks_sorted_by_activity_with_filter(category);
    let week_start = current_week_start().with_timezone(&Utc);
    let rows = build_task_rows(&session.watch, &tasks, week_start);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", format_task_list(&rows, get_terminal_width(), is_tty()));
    }
    Ok(())
}

fn handle_show(session: &Session, id_str: &str) -> Result<()> {
    let index = session.resolve(id_str)?;
    let task = session.task(index)?;
    print!("{}", format_task_detail(index + 1, task, Utc::now()));
    Ok(())
}

fn handle_start(session: &mut Session, id_str: &str, note: Vec<String>, at: Option<String>) -> Result<()> {
    let index = session.resolve(id_str)?;
    let at = parse_time_arg(at)?.unwrap_or_else(Utc::now);

    let task = session.task_mut(index)?;
    if task.has_unclosed_segment() {
        return Err(UserError::AlreadyRunning(index + 1).into());
    }
    task.add_segment_at(note.join(" "), at);
    let name = task.name.clone();

    session.save()?;
    info!("Started task {} at {}", index + 1, at);
    println!("Started task {}: {}", index + 1, name);
    Ok(())
}

fn handle_stop(session: &mut Session, id_str: &str, at: Option<String>) -> Result<()> {
    let index = session.resolve(id_str)?;
    let at = parse_time_arg(at)?.unwrap_or_else(Utc::now);

    let task = session.task_mut(index)?;
    if !task.has_unclosed_segment() {
        println!("Task {} has no open segment.", index + 1);
        return Ok(());
    }

    let latest_open = task
        .segments
        .iter()
        .filter(|s| !s.is_closed())
        .map(|s| s.create)
        .max();
    validate_time_range(latest_open, Some(at))?;

    let closed = task.close_segment_at(at);
    let name = task.name.clone();
    let duration = task
        .last_segment()
        .and_then(|s| s.duration())
        .unwrap_or_else(chrono::Duration::zero);

    session.save()?;
    info!("Stopped task {}, closed {} segment(s)", index + 1, closed);
    println!("Stopped task {}: {} ({})", index + 1, name, format_duration(duration));
    Ok(())
}

fn handle_log(session: &mut Session, id_str: &str, interval: &str, note: Vec<String>) -> Result<()> {
    let index = session.resolve(id_str)?;
    let (start, finish) = parse_interval_at(interval, Local::now())?;
    validate_time_range(Some(start), Some(finish))?;

    let task = session.task_mut(index)?;
    task.add_closed_segment(start, finish, note.join(" "));
    let name = task.name.clone();

    session.save()?;
    info!("Logged segment on task {} from {} to {}", index + 1, start, finish);
    println!(
        "Logged {} on task {}: {}",
        format_duration(finish - start),
        index + 1,
        name
    );
    Ok(())
}

fn handle_modify(
    session: &mut Session,
    id_str: &str,
    name: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    clear_tags: bool,
) -> Result<()> {
    let index = session.resolve(id_str)?;
    if name.is_none() && description.is_none() && tags.is_empty() && !clear_tags {
        return Err(UserError::NoChanges.into());
    }

    let name = name.map(|n| n.trim().to_string());
    if let Some(name) = &name {
        validate_task_name(name)?;
    }

    let task = session.task_mut(index)?;
    if let Some(name) = name {
        task.name = name;
    }
    if let Some(description) = description {
        task.description = description;
    }
    if clear_tags {
        task.tags.clear();
    } else if !tags.is_empty() {
        task.tags = split_tags(tags);
    }
    let name = task.name.clone();

    session.save()?;
    info!("Modified task {}", index + 1);
    println!("Modified task {}: {}", index + 1, name);
    Ok(())
}

fn handle_category(session: &mut Session, id_str: &str, category: Category) -> Result<()> {
    let index = session.resolve(id_str)?;
    session.task_mut(index)?.set_category(category);

    session.save()?;
    info!("Task {} moved to {}", index + 1, category);
    println!("Task {} moved to {}", index + 1, category);
    Ok(())
}

fn handle_delete(session: &mut Session, id_str: &str) -> Result<()> {
    let index = session.resolve(id_str)?;
    let task = session
        .watch
        .remove_task(index)
        .ok_or(UserError::TaskNotFound(index + 1))?;

    session.save()?;
    info!("Deleted task {} with {} segment(s)", index + 1, task.segments.len());
    println!("Deleted task {}: {}", index + 1, task.name);
    Ok(())
}

fn handle_summary(
    session: &Session,
    include_tasks: bool,
    start: Option<String>,
    finish: Option<String>,
) -> Result<()> {
    let start = parse_time_arg(start)?;
    let finish = parse_time_arg(finish)?;
    validate_time_range(start, finish)?;

    let Some((earliest, latest)) = session.watch.earliest_and_latest_segment_times() else {
        println!("No segments found");
        return Ok(());
    };

    let first = start.unwrap_or(earliest).with_timezone(&Local);
    let last = finish.unwrap_or(latest).with_timezone(&Local);
    let starts = week_starts(&first, &last);

    let weeks = if include_tasks {
        session.watch.weekly_summary_by_tagset_with_tasks(&starts)
    } else {
        session.watch.weekly_summary_by_tagset(&starts)
    };

    if weeks.is_empty() {
        println!("No segments found");
        return Ok(());
    }

    print!("{}", format_weekly_summaries(&weeks, include_tasks));
    Ok(())
}

fn handle_tagsets(
    session: &Session,
    include_tasks: bool,
    start: Option<String>,
    finish: Option<String>,
) -> Result<()> {
    let start = parse_time_arg(start)?;
    let finish = parse_time_arg(finish)?;
    validate_time_range(start, finish)?;

    let summaries = session.watch.summary_by_tagset(start, finish);
    if summaries.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    print!("{}", format_tagset_summary(&summaries, include_tasks, start, finish));
    Ok(())
}
