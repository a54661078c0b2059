use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::migrations::MigrationManager;
use super::{format_timestamp, parse_timestamp, StoreError, TaskStore};
use crate::models::{Category, Segment, Task};

/// SQLite-backed store
///
/// Every save rewrites all rows inside one transaction.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the database, creating parent directories and schema if needed
    fn connect(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&self.path)?;
        conn.execute("PRAGMA foreign_keys=ON", [])?;
        MigrationManager::initialize(&conn)?;
        Ok(conn)
    }
}

impl TaskStore for SqliteStore {
    fn load(&self) -> Result<Vec<Task>, StoreError> {
        if !self.path.exists() {
            debug!("No task database at {}, starting empty", self.path.display());
            return Ok(Vec::new());
        }

        let conn = self.connect()?;
        load_tasks(&conn)
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        save_tasks(&mut conn, tasks)?;
        debug!("Saved {} tasks to {}", tasks.len(), self.path.display());
        Ok(())
    }
}

fn load_tasks(conn: &Connection) -> Result<Vec<Task>, StoreError> {
    let mut tags: HashMap<i64, Vec<String>> = HashMap::new();
    let mut stmt = conn.prepare("SELECT task_id, tag FROM task_tags ORDER BY task_id, position")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
    for row in rows {
        let (task_id, tag) = row?;
        tags.entry(task_id).or_default().push(tag);
    }

    let mut segments: HashMap<i64, Vec<Segment>> = HashMap::new();
    let mut stmt = conn.prepare(
        "SELECT task_id, create_at, finish_at, note FROM segments ORDER BY task_id, position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;
    for row in rows {
        let (task_id, create, finish, note) = row?;
        let segment = Segment {
            create: parse_timestamp(&create)?,
            finish: finish.as_deref().map(parse_timestamp).transpose()?,
            note,
        };
        segments.entry(task_id).or_default().push(segment);
    }

    let mut stmt = conn.prepare(
        "SELECT id, uuid, name, description, category FROM tasks ORDER BY position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut tasks = Vec::new();
    for row in rows {
        let (row_id, uuid, name, description, category) = row?;
        let category =
            Category::from_stored(&category).ok_or(StoreError::InvalidCategory(category))?;

        tasks.push(Task {
            id: Uuid::parse_str(&uuid).map_err(|_| StoreError::InvalidId(uuid.clone()))?,
            name,
            description,
            tags: tags.remove(&row_id).unwrap_or_default(),
            category,
            segments: segments.remove(&row_id).unwrap_or_default(),
        });
    }

    Ok(tasks)
}

fn save_tasks(conn: &mut Connection, tasks: &[Task]) -> Result<(), StoreError> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM segments", [])?;
    tx.execute("DELETE FROM task_tags", [])?;
    tx.execute("DELETE FROM tasks", [])?;

    for (position, task) in tasks.iter().enumerate() {
        tx.execute(
            "INSERT INTO tasks (uuid, position, name, description, category)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                task.id.to_string(),
                position as i64,
                task.name,
                task.description,
                task.category.as_str()
            ],
        )?;
        let task_id = tx.last_insert_rowid();

        for (tag_position, tag) in task.tags.iter().enumerate() {
            tx.execute(
                "INSERT INTO task_tags (task_id, position, tag) VALUES (?1, ?2, ?3)",
                params![task_id, tag_position as i64, tag],
            )?;
        }

        for (segment_position, segment) in task.segments.iter().enumerate() {
            tx.execute(
                "INSERT INTO segments (task_id, position, create_at, finish_at, note)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    task_id,
                    segment_position as i64,
                    format_timestamp(segment.create),
                    segment.finish.map(format_timestamp),
                    segment.note
                ],
            )?;
        }
    }

    tx.commit()?;
    Ok(())
}
