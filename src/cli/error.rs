// User-facing errors and input validation for CLI commands

use thiserror::Error;

use crate::models::{Category, Timestamp};

/// Errors caused by user input rather than by storage failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    #[error("Task name cannot be empty")]
    EmptyTaskName,

    #[error("Invalid task ID: '{0}'. Task ID must be a positive number.")]
    InvalidTaskId(String),

    #[error("Task {0} not found")]
    TaskNotFound(usize),

    #[error("Task {0} already has an open segment. Stop it first.")]
    AlreadyRunning(usize),

    #[error("Start time must be before finish time")]
    InvalidTimeRange,

    #[error("Invalid category '{0}'. Expected one of: work, completed, backlog")]
    InvalidCategory(String),

    #[error("Nothing to modify. Use --name, --description, --tag or --clear-tags.")]
    NoChanges,
}

/// Validate a task name before creating the task
pub fn validate_task_name(name: &str) -> Result<(), UserError> {
    if name.trim().is_empty() {
        Err(UserError::EmptyTaskName)
    } else {
        Ok(())
    }
}

/// Validate that start is not after finish when both are given
pub fn validate_time_range(start: Option<Timestamp>, finish: Option<Timestamp>) -> Result<(), UserError> {
    match (start, finish) {
        (Some(start), Some(finish)) if start > finish => Err(UserError::InvalidTimeRange),
        _ => Ok(()),
    }
}

/// Parse a 1-based task ID as shown by `ow list`
pub fn validate_task_id(id_str: &str) -> Result<usize, UserError> {
    match id_str.trim().parse::<usize>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(UserError::InvalidTaskId(id_str.to_string())),
    }
}

/// Parse a category name for clap
pub fn parse_category(value: &str) -> Result<Category, UserError> {
    value
        .trim()
        .to_lowercase()
        .parse()
        .map_err(|_| UserError::InvalidCategory(value.to_string()))
}

/// Trim tags and drop empty ones
pub fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
