// src/logging.rs
//
// `tlog!` writes `HH:MM:SS.mmm <message>` to stderr. After init_file_logging()
// every line is copied to a per-run log file as well.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

static LOG_FILE: Mutex<Option<File>> = Mutex::new(None);

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S%.3f").to_string()
}

/// Backing function of `tlog!`.
#[doc(hidden)]
pub fn write_line(message: &str) {
    let line = format!("{} {}", timestamp(), message);
    eprintln!("{}", line);
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(file) = guard.as_mut() {
            let _ = writeln!(file, "{}", line);
        }
    }
}

/// Start copying log lines to `<log_dir>/YYYYmmdd-HHMMSS-elevator-link.log`.
/// Returns the path of the new file. A previously open log file is replaced.
pub fn init_file_logging(log_dir: &Path) -> Result<PathBuf, String> {
    std::fs::create_dir_all(log_dir).map_err(|e| format!("Failed to create log dir: {}", e))?;

    let path = log_dir.join(
        chrono::Local::now()
            .format("%Y%m%d-%H%M%S-elevator-link.log")
            .to_string(),
    );
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("Failed to create log file: {}", e))?;

    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = Some(file);
    }
    write_line(&format!("[logging] Writing to {}", path.display()));

    Ok(path)
}

/// Stop copying to the log file. stderr output continues.
pub fn stop_file_logging() {
    let closed = LOG_FILE
        .lock()
        .map(|mut guard| guard.take().is_some())
        .unwrap_or(false);
    if closed {
        write_line("[logging] File logging stopped");
    }
}

/// Timestamped log line to stderr, mirrored to the log file when one is open.
#[macro_export]
macro_rules! tlog {
    ($($arg:tt)*) => {
        $crate::logging::write_line(&format!($($arg)*))
    };
}
