// Configuration: where tasks live and which store backend reads them

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, warn};

use crate::store::{FileStore, SqliteStore, TaskStore};

/// Directory under the home directory holding the rc file and default data
pub const CONFIG_DIR_NAME: &str = ".owatch";
/// Default data file name
pub const DEFAULT_TASKS_FILE_NAME: &str = "tasks.json";

/// Storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Json,
    Sqlite,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Backend::Json),
            "sqlite" => Ok(Backend::Sqlite),
            _ => Err(format!("unknown backend '{}'", s)),
        }
    }
}

impl Backend {
    /// Pick a backend from the file extension of `path`
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("db") | Some("sqlite") | Some("sqlite3") => Backend::Sqlite,
            _ => Backend::Json,
        }
    }
}

/// Resolved configuration, built once at startup and passed to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
    pub backend: Backend,
}

impl Config {
    pub fn new(data_path: impl Into<PathBuf>, backend: Backend) -> Self {
        Self {
            data_path: data_path.into(),
            backend,
        }
    }

    /// Resolve configuration: explicit file, then the rc file, then the default
    pub fn resolve(file_override: Option<PathBuf>) -> Self {
        Self::resolve_with_home(file_override, dirs::home_dir().as_deref())
    }

    pub fn resolve_with_home(file_override: Option<PathBuf>, home: Option<&Path>) -> Self {
        if let Some(path) = file_override {
            let backend = Backend::for_path(&path);
            return Self::new(path, backend);
        }

        let config_dir = match home {
            Some(home) => home.join(CONFIG_DIR_NAME),
            None => {
                warn!("No home directory found, using {} in the working directory", DEFAULT_TASKS_FILE_NAME);
                return Self::new(DEFAULT_TASKS_FILE_NAME, Backend::Json);
            }
        };

        let rc_path = config_dir.join("rc");
        let mut location = None;
        let mut backend = None;

        if let Ok(rc) = fs::read_to_string(&rc_path) {
            debug!("Reading configuration from {}", rc_path.display());
            for line in rc.lines().map(str::trim) {
                if let Some(value) = line.strip_prefix("data.location=") {
                    let path = PathBuf::from(value.trim());
                    location = Some(if path.is_relative() {
                        config_dir.join(path)
                    } else {
                        path
                    });
                } else if let Some(value) = line.strip_prefix("data.backend=") {
                    match value.trim().parse::<Backend>() {
                        Ok(b) => backend = Some(b),
                        Err(e) => warn!("Ignoring {} in {}", e, rc_path.display()),
                    }
                }
            }
        }

        let data_path = location.unwrap_or_else(|| config_dir.join(DEFAULT_TASKS_FILE_NAME));
        let backend = backend.unwrap_or_else(|| Backend::for_path(&data_path));
        Self::new(data_path, backend)
    }

    /// Build the store this configuration points at
    pub fn open_store(&self) -> Box<dyn TaskStore> {
        match self.backend {
            Backend::Json => Box::new(FileStore::new(&self.data_path)),
            Backend::Sqlite => Box::new(SqliteStore::new(&self.data_path)),
        }
    }
}
