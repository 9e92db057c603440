use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use super::app_paths::AppPaths;
use super::logging::LogEntry;

/// Global file logger instance
static DUAL_LOGGER: OnceLock<Option<DualLogger>> = OnceLock::new();

/// File half of the dual logging setup; the ring buffer half lives in
/// `logging`.
pub struct DualLogger {
    log_file: Mutex<File>,
    log_path: PathBuf,
}

impl DualLogger {
    /// Open a timestamped log file in `log_dir` and point `latest.log` at it.
    pub fn create_in(log_dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(log_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("pm-dash_{}.log", timestamp));

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let latest_path = log_dir.join("latest.log");

        #[cfg(unix)]
        {
            let _ = std::fs::remove_file(&latest_path);
            let _ = std::os::unix::fs::symlink(&log_path, &latest_path);
        }

        #[cfg(windows)]
        {
            // Symlinks need elevated rights on Windows
            let pointer_content = format!("Current log file: {}\n", log_path.display());
            let _ = std::fs::write(&latest_path, pointer_content);
        }

        Ok(Self {
            log_file: Mutex::new(log_file),
            log_path,
        })
    }

    pub fn write_entry(&self, entry: &LogEntry) {
        if let Ok(mut file) = self.log_file.lock() {
            let log_line = format!("{}\n", entry.format_for_display());
            let _ = file.write_all(log_line.as_bytes());
            let _ = file.flush();
        }

        if std::env::var("PM_DASH_DEBUG").is_ok() {
            eprintln!("{}", entry.format_for_display());
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn flush(&self) {
        if let Ok(mut file) = self.log_file.lock() {
            let _ = file.flush();
        }
    }
}

/// Initialize the global file logger. `None` when no log file can be opened;
/// logging then only goes to the ring buffer.
pub fn init_dual_logger() -> Option<&'static DualLogger> {
    DUAL_LOGGER
        .get_or_init(|| {
            AppPaths::log_dir()
                .ok()
                .and_then(|dir| DualLogger::create_in(&dir).ok())
        })
        .as_ref()
}

/// Get the global file logger
pub fn get_dual_logger() -> Option<&'static DualLogger> {
    DUAL_LOGGER.get().and_then(|l| l.as_ref())
}
