// src/recorder.rs
//
// CSV logging of accepted telemetry records.
// Optional collaborator of the poller: attach with TelemetryPoller::add_sink.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::io::elevator::{TelemetryRecord, TelemetrySink};

pub const CSV_HEADER: &str = "timestamp,A,D,M,pos_mm,vel_mms,temp_C";

/// Default file name for a new log, e.g. `elevator_log_20260101_120000.csv`
pub fn default_csv_filename() -> String {
    Local::now()
        .format("elevator_log_%Y%m%d_%H%M%S.csv")
        .to_string()
}

/// Format one CSV row. Velocity and temperature keep one decimal, as on the wire.
pub fn format_csv_row(timestamp_us: u64, record: &TelemetryRecord) -> String {
    let timestamp = DateTime::from_timestamp_micros(timestamp_us as i64)
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%dT%H:%M:%S%.3f")
                .to_string()
        })
        .unwrap_or_default();

    format!(
        "{},{},{},{},{},{:.1},{:.1}",
        timestamp,
        record.floor(),
        record.destination(),
        record.motor().code(),
        record.position(),
        record.velocity(),
        record.temperature()
    )
}

/// Appends one row per accepted record to a CSV file.
pub struct CsvRecorder {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    rows: u64,
}

impl CsvRecorder {
    /// Create (or truncate) the file at `path` and write the header.
    pub fn create(path: &Path) -> Result<Self, String> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create CSV directory: {}", e))?;
        }

        let file = File::create(path).map_err(|e| format!("Failed to open CSV file: {}", e))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", CSV_HEADER)
            .and_then(|_| writer.flush())
            .map_err(|e| format!("Failed to write CSV header: {}", e))?;

        tlog!("[recorder] Logging to {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(writer),
            rows: 0,
        })
    }

    /// Create a log with the default file name inside `dir`.
    pub fn create_in(dir: &Path) -> Result<Self, String> {
        Self::create(&dir.join(default_csv_filename()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }
}

impl TelemetrySink for CsvRecorder {
    fn on_record(&mut self, timestamp_us: u64, record: &TelemetryRecord) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };

        let row = format_csv_row(timestamp_us, record);
        match writeln!(writer, "{}", row).and_then(|_| writer.flush()) {
            Ok(()) => self.rows += 1,
            Err(e) => {
                tlog!(
                    "[recorder] Write to {} failed, logging disabled: {}",
                    self.path.display(),
                    e
                );
                self.writer = None;
            }
        }
    }
}

impl Drop for CsvRecorder {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}
