//! Owatch - personal time tracking for named tasks
//!
//! This library provides the core functionality for the `ow` tool:
//! - Data model for tasks, their timed segments and categories
//! - Activity ordering, tagset grouping and weekly reports
//! - Pluggable persistence (JSON flat file or SQLite)
//! - Configuration resolution and CLI command execution
//!
//! # Example
//!
//! ```
//! use owatch::models::Watch;
//!
//! let mut watch = Watch::new();
//! let task = watch.add_task("Feature work", "new endpoints", vec!["api".to_string()], None);
//! task.add_segment("first pass");
//! task.close_segment();
//!
//! let summary = watch.summary_by_tagset(None, None);
//! assert_eq!(summary[0].tagset, "api");
//! ```

pub mod cli;
pub mod config;
pub mod models;
pub mod report;
pub mod store;
pub mod utils;
