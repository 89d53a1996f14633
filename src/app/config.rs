use clap::Parser;
use std::path::PathBuf;

use crate::app::storage::DEFAULT_TASKS_KEY;

/// Terminal task list with categories, due dates and drag-and-drop ordering
#[derive(Parser, Debug)]
#[command(name = "task_board", version)]
pub struct Cli {
    /// SQLite file holding the task snapshot
    #[arg(long, default_value = "tasks.db")]
    pub db: PathBuf,

    /// Key the task collection is stored under
    #[arg(long, default_value = DEFAULT_TASKS_KEY)]
    pub storage_key: String,

    /// Directory for log files (defaults to a folder in the system temp dir)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// trace, debug, info, warn or error
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// UI poll interval in milliseconds
    #[arg(long, default_value_t = 250)]
    pub tick_rate_ms: u64,
}

impl Cli {
    pub fn log_dir(&self) -> PathBuf {
        match &self.log_dir {
            Some(dir) => dir.clone(),
            None => std::env::temp_dir().join("task_board_logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["task_board"]).unwrap();
        assert_eq!(cli.db, PathBuf::from("tasks.db"));
        assert_eq!(cli.storage_key, "tasks");
        assert_eq!(cli.log_level, "info");
        assert_eq!(cli.tick_rate_ms, 250);
        assert!(cli.log_dir().ends_with("task_board_logs"));
    }

    #[test]
    fn overrides() {
        let cli = Cli::try_parse_from([
            "task_board",
            "--db",
            "/tmp/board.db",
            "--storage-key",
            "board",
            "--log-dir",
            "/var/log/board",
            "--tick-rate-ms",
            "100",
        ])
        .unwrap();
        assert_eq!(cli.db, PathBuf::from("/tmp/board.db"));
        assert_eq!(cli.storage_key, "board");
        assert_eq!(cli.log_dir(), PathBuf::from("/var/log/board"));
        assert_eq!(cli.tick_rate_ms, 100);
    }

    #[test]
    fn rejects_non_numeric_tick_rate() {
        assert!(Cli::try_parse_from(["task_board", "--tick-rate-ms", "fast"]).is_err());
    }
}
