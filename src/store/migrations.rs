use rusqlite::{Connection, Result, Transaction};

/// Current database schema version
const CURRENT_VERSION: u32 = 1;

/// Versioned schema setup for the SQLite task store
pub struct MigrationManager;

impl MigrationManager {
    /// Create the schema_version table and apply every pending migration
    pub fn initialize(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version = Self::get_version(conn)?;

        for version in (current_version + 1)..=CURRENT_VERSION {
            Self::apply_migration(conn, version)?;
        }

        Ok(())
    }

    fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
        let migration = match version {
            1 => migration_v1,
            _ => {
                return Err(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
                    Some(format!("No migration found for version {}", version)),
                ))
            }
        };

        let tx = conn.unchecked_transaction()?;
        migration(&tx)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
        tx.commit()
    }

    /// Get the current schema version
    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

/// Migration v1: tasks, their ordered tags and segments
fn migration_v1(tx: &Transaction) -> Result<()> {
    tx.execute("PRAGMA foreign_keys=ON", [])?;

    // position keeps the watch's insertion order
    tx.execute(
        "CREATE TABLE tasks (
            id INTEGER PRIMARY KEY,
            uuid TEXT NOT NULL UNIQUE,
            position INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT 'work'
        )",
        [],
    )?;

    tx.execute(
        "CREATE TABLE task_tags (
            task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            tag TEXT NOT NULL,
            PRIMARY KEY (task_id, position)
        )",
        [],
    )?;

    // finish_at is NULL while the segment is open
    tx.execute(
        "CREATE TABLE segments (
            task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            create_at TEXT NOT NULL,
            finish_at TEXT NULL,
            note TEXT NOT NULL DEFAULT '',
            PRIMARY KEY (task_id, position)
        )",
        [],
    )?;

    Ok(())
}
