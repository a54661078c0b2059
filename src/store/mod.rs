// Persistence for the task collection
//
// The model never touches files directly. A store loads and saves the whole
// task list; the record types below are the only place where the persisted
// shape is converted to and from the model.

pub mod file;
pub mod migrations;
pub mod sqlite;

use std::io;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Category, Segment, Task, Timestamp};

pub use file::FileStore;
pub use sqlite::SqliteStore;

/// Load/save capability the watch depends on
pub trait TaskStore {
    /// Load all tasks; an absent store yields an empty list
    fn load(&self) -> Result<Vec<Task>, StoreError>;

    /// Replace the stored tasks with `tasks`
    fn save(&self, tasks: &[Task]) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read task file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write task file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse task file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode tasks")]
    Encode(#[source] serde_json::Error),

    #[error("Task database error")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid category '{0}' in stored task")]
    InvalidCategory(String),

    #[error("Invalid task id '{0}' in stored task")]
    InvalidId(String),

    #[error("Invalid timestamp '{0}' in stored segment")]
    InvalidTimestamp(String),
}

/// Persisted form of a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub segments: Option<Vec<SegmentRecord>>,
}

/// Persisted form of a segment; `finish: null` marks an open segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub create: Timestamp,
    #[serde(default)]
    pub finish: Option<Timestamp>,
    #[serde(default)]
    pub note: String,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: Some(task.id),
            name: task.name.clone(),
            description: task.description.clone(),
            tags: Some(task.tags.clone()),
            category: task.category.as_str().to_string(),
            segments: Some(task.segments.iter().map(SegmentRecord::from).collect()),
        }
    }
}

impl From<&Segment> for SegmentRecord {
    fn from(segment: &Segment) -> Self {
        Self {
            create: segment.create,
            finish: segment.finish,
            note: segment.note.clone(),
        }
    }
}

impl TaskRecord {
    /// Convert to a model task, assigning an id when none was stored
    pub fn into_task(self) -> Result<Task, StoreError> {
        let category = Category::from_stored(&self.category)
            .ok_or_else(|| StoreError::InvalidCategory(self.category.clone()))?;

        let segments: Vec<Segment> = self
            .segments
            .unwrap_or_default()
            .into_iter()
            .map(|record| Segment {
                create: record.create,
                finish: record.finish,
                note: record.note,
            })
            .collect();

        for segment in &segments {
            if segment.finish.is_some_and(|finish| finish < segment.create) {
                warn!(
                    "Segment of task '{}' finishes before it starts ({})",
                    self.name,
                    format_timestamp(segment.create)
                );
            }
        }

        Ok(Task {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self.name,
            description: self.description,
            tags: self.tags.unwrap_or_default(),
            category,
            segments,
        })
    }
}

/// Exact textual form used for timestamps in the database
pub(crate) fn format_timestamp(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub(crate) fn parse_timestamp(text: &str) -> Result<Timestamp, StoreError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidTimestamp(text.to_string()))
}
