// Output formatting utilities

use std::io::IsTerminal;

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

use crate::models::{Category, Task, Timestamp, Watch};
use crate::report::{week_end, TagsetSummary, WeeklySummary};
use crate::utils::format_duration;

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";
const ANSI_FG_RED: &str = "\x1b[31m";
const ANSI_FG_GREEN: &str = "\x1b[32m";
const ANSI_FG_YELLOW: &str = "\x1b[33m";
const ANSI_FG_BLUE: &str = "\x1b[34m";
const ANSI_FG_BRIGHT_BLACK: &str = "\x1b[90m";

const RUNNING_MARK: &str = "▶";
const IDLE_MARK: &str = "●";

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, falling back to COLUMNS and then 120
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    std::env::var("COLUMNS")
        .ok()
        .and_then(|cols| cols.parse::<usize>().ok())
        .filter(|w| *w > 0 && *w < 10000)
        .unwrap_or(120)
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("{}{}{}", code, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

fn category_color(category: Category) -> &'static str {
    match category {
        Category::Work => ANSI_FG_YELLOW,
        Category::Completed => ANSI_FG_GREEN,
        Category::Backlog => ANSI_FG_BRIGHT_BLACK,
    }
}

/// Format timestamp for display in local time
pub fn format_timestamp(ts: Timestamp) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format date for display (date only, no time)
pub fn format_date(ts: Timestamp) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// One row of `ow list`
#[derive(Debug, Clone, Serialize)]
pub struct TaskRow {
    pub id: usize,
    pub uuid: String,
    pub running: bool,
    pub name: String,
    pub tags: Vec<String>,
    pub category: Category,
    pub last_activity: Option<Timestamp>,
    pub total_secs: i64,
    pub this_week_secs: i64,
}

/// Build list rows in display order, mapping each task back to its ID
pub fn build_task_rows(watch: &Watch, tasks: &[&Task], week_start: Timestamp) -> Vec<TaskRow> {
    tasks
        .iter()
        .filter_map(|task| {
            let index = watch.task_index(task.id)?;
            Some(TaskRow {
                id: index + 1,
                uuid: task.id.to_string(),
                running: task.is_active(),
                name: task.name.clone(),
                tags: task.tags.clone(),
                category: task.category(),
                last_activity: task.last_activity(),
                total_secs: task.closed_segments_duration().num_seconds(),
                this_week_secs: task.this_week_duration(week_start).num_seconds(),
            })
        })
        .collect()
}

/// Format the task list table
pub fn format_task_list(rows: &[TaskRow], width: usize, color: bool) -> String {
    if rows.is_empty() {
        return "No tasks found.\n".to_string();
    }

    let tags_text = |row: &TaskRow| {
        if row.tags.is_empty() {
            String::new()
        } else {
            format!("({})", row.tags.join(", "))
        }
    };

    let id_w = rows.iter().map(|r| r.id.to_string().len()).max().unwrap_or(1).max(2);
    let tags_w = rows.iter().map(|r| tags_text(r).chars().count()).max().unwrap_or(0).max(4);
    // Fixed columns: id, status, tags, category(9), activity(10), two durations(9 each), separators
    let fixed = id_w + 2 + tags_w + 9 + 10 + 9 + 9 + 8;
    let name_max = rows.iter().map(|r| r.name.chars().count()).max().unwrap_or(0).max(4);
    let name_w = name_max.min(width.saturating_sub(fixed).max(12));

    let mut out = String::new();
    let header = format!(
        "{:<id_w$} {:<1} {:<name_w$} {:<tags_w$} {:<9} {:<10} {:>9} {:>9}",
        "ID", "", "Name", "Tags", "Category", "Activity", "Total", "Week",
    );
    out.push_str(&paint(header.trim_end(), ANSI_BOLD, color));
    out.push('\n');

    for row in rows {
        let mark = if row.running {
            paint(RUNNING_MARK, ANSI_FG_RED, color)
        } else {
            paint(IDLE_MARK, ANSI_FG_BRIGHT_BLACK, color)
        };
        let category = format!("{:<9}", row.category.as_str());
        let activity = row.last_activity.map(format_date).unwrap_or_else(|| "-".to_string());
        let tags = format!("{:<tags_w$}", tags_text(row));

        let line = format!(
            "{:<id_w$} {} {:<name_w$} {} {} {:<10} {:>9} {:>9}",
            row.id,
            mark,
            truncate(&row.name, name_w),
            paint(&tags, ANSI_FG_BLUE, color),
            paint(&category, category_color(row.category), color),
            activity,
            format_duration(chrono::Duration::seconds(row.total_secs)),
            format_duration(chrono::Duration::seconds(row.this_week_secs)),
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let kept: String = text.chars().take(width.saturating_sub(2)).collect();
        format!("{}..", kept)
    }
}

/// Format the detail view of one task and its segments
pub fn format_task_detail(id: usize, task: &Task, now: Timestamp) -> String {
    let mut out = String::new();
    out.push_str(&format!("Task {}: {}\n", id, task.name));
    out.push_str(&format!("Category: {}\n", task.category()));
    if !task.tags.is_empty() {
        out.push_str(&format!("Tags: {}\n", task.tags.join(", ")));
    }
    if !task.description.is_empty() {
        out.push_str(&format!("Description: {}\n", task.description));
    }
    out.push_str(&format!(
        "Total: {}\n",
        format_duration(task.closed_segments_duration())
    ));
    if task.is_active() {
        out.push_str(&format!(
            "Running: {} (ongoing)\n",
            format_duration(task.current_segment_duration_at(now))
        ));
    }
    out.push('\n');

    if task.segments.is_empty() {
        out.push_str("No segments found for this task.\n");
        return out;
    }

    for (i, segment) in task.segments.iter().enumerate() {
        out.push_str(&format!("Segment {}:\n", i + 1));
        out.push_str(&format!("  Created:  {}\n", format_timestamp(segment.create)));
        match segment.finish {
            Some(finish) => {
                out.push_str(&format!("  Finished: {}\n", format_timestamp(finish)));
                out.push_str(&format!("  Duration: {}\n", format_duration(finish - segment.create)));
            }
            None => {
                out.push_str("  Status:   Open\n");
                out.push_str(&format!(
                    "  Duration: {} (ongoing)\n",
                    format_duration(segment.elapsed(now))
                ));
            }
        }
        if segment.note.is_empty() {
            out.push_str("  Note:     (none)\n");
        } else {
            out.push_str(&format!("  Note:     {}\n", segment.note));
        }
    }

    out
}

/// Format the flat tagset summary
pub fn format_tagset_summary(
    summaries: &[TagsetSummary<'_>],
    include_tasks: bool,
    start: Option<Timestamp>,
    finish: Option<Timestamp>,
) -> String {
    let mut out = String::new();

    for summary in summaries {
        let count = summary.tasks.len();
        let noun = if count == 1 { "task" } else { "tasks" };
        out.push_str(&format!(
            "{} totaling {} {} and {}\n",
            summary.tagset,
            count,
            noun,
            format_duration(summary.duration)
        ));

        if include_tasks {
            for task in &summary.tasks {
                let duration = task.filtered_closed_segments_duration(start, finish);
                out.push_str(&format!("  Task: {} {}\n", task.name, format_duration(duration)));
            }
        }
    }

    out
}

/// Format the weekly report
///
/// Task lines use each week's own window for their durations.
pub fn format_weekly_summaries<Tz: TimeZone>(weeks: &[WeeklySummary<'_, Tz>], include_tasks: bool) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();

    for week in weeks {
        out.push_str(&format!("Week starting {}\n", week.week_start.format("%m/%d/%Y")));

        for tagset in &week.tagsets {
            out.push_str(&format!("- {} [{}]\n", tagset.tagset, format_duration(tagset.duration)));

            if include_tasks {
                out.push_str(&format_week_tasks(&week.week_start, &tagset.tasks));
            }
        }

        out.push('\n');
    }

    out
}

fn format_week_tasks<Tz: TimeZone>(week_start: &DateTime<Tz>, tasks: &[&Task]) -> String {
    let start = week_start.with_timezone(&chrono::Utc);
    let end = week_end(week_start).with_timezone(&chrono::Utc);

    tasks
        .iter()
        .map(|task| {
            let duration = task.filtered_closed_segments_duration(Some(start), Some(end));
            format!("-- {} [{}]\n", task.name, format_duration(duration))
        })
        .collect()
}
