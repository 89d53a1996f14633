// Communication with SQLite
// The database is used as a plain key-value store; the whole task
// collection lives under a single key as a JSON array.
use log::{error, info, warn};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::app::models::Task;

pub const DEFAULT_TASKS_KEY: &str = "tasks";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not encode or decode the task snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

pub struct Storage {
    db_con: Connection,
    tasks_key: String,
}

impl Storage {
    pub fn open(path: impl AsRef<Path>, tasks_key: &str) -> StorageResult<Storage> {
        info!(
            "event=storage_open module=storage status=start mode=file path={}",
            path.as_ref().display()
        );
        Storage::bootstrap(Connection::open(path)?, tasks_key)
    }

    pub fn open_in_memory() -> StorageResult<Storage> {
        info!("event=storage_open module=storage status=start mode=memory");
        Storage::bootstrap(Connection::open_in_memory()?, DEFAULT_TASKS_KEY)
    }

    fn bootstrap(db_con: Connection, tasks_key: &str) -> StorageResult<Storage> {
        let storage = Storage {
            db_con,
            tasks_key: tasks_key.to_string(),
        };
        storage.create_table_if_not_exists()?;
        info!("event=storage_open module=storage status=ok key={}", storage.tasks_key);
        Ok(storage)
    }

    fn create_table_if_not_exists(&self) -> StorageResult<()> {
        self.db_con.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                Key TEXT PRIMARY KEY,
                Value TEXT NOT NULL
            );",
            (),
        )?;
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .db_con
            .query_row("SELECT Value FROM kv_store WHERE Key = ?1;", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.db_con.execute(
            "INSERT INTO kv_store (Key, Value) VALUES (?1, ?2)
             ON CONFLICT(Key) DO UPDATE SET Value = excluded.Value;",
            (key, value),
        )?;
        Ok(())
    }

    // READ
    // Missing or unreadable snapshots count as "no tasks".
    pub fn load_tasks(&self) -> Vec<Task> {
        let raw = match self.get_item(&self.tasks_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=tasks_load module=storage status=ok count=0 reason=absent");
                return Vec::new();
            }
            Err(err) => {
                warn!("event=tasks_load module=storage status=error error={}", err);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Option<Vec<Task>>>(&raw) {
            Ok(tasks) => {
                let tasks = tasks.unwrap_or_default();
                info!("event=tasks_load module=storage status=ok count={}", tasks.len());
                tasks
            }
            Err(err) => {
                warn!(
                    "event=tasks_load module=storage status=error reason=malformed error={}",
                    err
                );
                Vec::new()
            }
        }
    }

    // WRITE
    // Overwrites the whole snapshot.
    pub fn save_tasks(&self, tasks: &[Task]) -> StorageResult<()> {
        serde_json::to_string(tasks)
            .map_err(StorageError::from)
            .and_then(|encoded| self.set_item(&self.tasks_key, &encoded))
            .map_err(|err| {
                error!("event=tasks_save module=storage status=error error={}", err);
                err
            })
    }
}
