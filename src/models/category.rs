use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Task category
///
/// Stored as a lowercase string at the persistence edge; everything inside the
/// crate works with the closed variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Work,
    Completed,
    Backlog,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Work, Category::Completed, Category::Backlog];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Completed => "completed",
            Category::Backlog => "backlog",
        }
    }

    /// Parse a persisted value, treating an empty string as the default
    pub fn from_stored(s: &str) -> Option<Self> {
        if s.trim().is_empty() {
            Some(Category::default())
        } else {
            s.trim().parse().ok()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(Category::Work),
            "completed" => Ok(Category::Completed),
            "backlog" => Ok(Category::Backlog),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
