use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;

use super::{StoreError, TaskRecord, TaskStore};
use crate::models::Task;

/// JSON flat-file store
///
/// Saving writes a sibling temporary file and renames it over the target, so
/// a failed write never leaves a truncated task file behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Drop whatever is left at `temp` when writing or renaming failed
    fn finish_write(&self, temp: &Path, written: io::Result<()>) -> Result<(), StoreError> {
        written.map_err(|e| {
            let _ = fs::remove_file(temp);
            self.write_err(e)
        })
    }

    fn write_err(&self, source: io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl TaskStore for FileStore {
    fn load(&self) -> Result<Vec<Task>, StoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No task file at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if data.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<TaskRecord> =
            serde_json::from_str(&data).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        records.into_iter().map(TaskRecord::into_task).collect()
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_err(e))?;
        }

        let records: Vec<TaskRecord> = tasks.iter().map(TaskRecord::from).collect();
        let data = serde_json::to_string_pretty(&records).map_err(StoreError::Encode)?;

        let temp = self.temp_path();
        let written = write_private(&temp, data.as_bytes()).and_then(|()| fs::rename(&temp, &self.path));
        self.finish_write(&temp, written)?;

        debug!("Saved {} tasks to {}", tasks.len(), self.path.display());
        Ok(())
    }
}

/// Write a file readable only by its owner
fn write_private(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.sync_all()
}
