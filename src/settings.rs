// src/settings.rs
//
// Operator settings persisted as JSON under the platform config directory.
// Line parameters (19200 8-N-1) are fixed and not configurable here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::io::serial::{default_port_prefix, DEFAULT_MAX_LINE_LENGTH};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppSettings {
    /// Port used when none is given on the command line
    #[serde(default)]
    pub default_port: Option<String>,
    /// Only list ports whose name starts with this (case-insensitive)
    #[serde(default = "default_port_prefix")]
    pub port_prefix: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_csv_dir")]
    pub csv_dir: String,
}

fn default_poll_interval_ms() -> u64 {
    50
}
fn default_refresh_interval_ms() -> u64 {
    300
}
fn default_max_line_length() -> usize {
    DEFAULT_MAX_LINE_LENGTH
}

fn documents_dir() -> PathBuf {
    dirs::document_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ElevatorLink")
}

fn default_log_dir() -> String {
    documents_dir().join("Logs").to_string_lossy().to_string()
}
fn default_csv_dir() -> String {
    documents_dir().join("Recordings").to_string_lossy().to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_port: None,
            port_prefix: default_port_prefix(),
            poll_interval_ms: default_poll_interval_ms(),
            refresh_interval_ms: default_refresh_interval_ms(),
            max_line_length: default_max_line_length(),
            log_dir: default_log_dir(),
            csv_dir: default_csv_dir(),
        }
    }
}

/// `<config_dir>/elevator-link/settings.json`
pub fn settings_path() -> Result<PathBuf, String> {
    let config_dir =
        dirs::config_dir().ok_or_else(|| "Failed to get config dir".to_string())?;
    Ok(config_dir.join("elevator-link").join("settings.json"))
}

/// Load settings from `path`. On first run the defaults are written there.
pub fn load_settings(path: &Path) -> Result<AppSettings, String> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings: {}", e))?;

        serde_json::from_str(&content).map_err(|e| format!("Failed to parse settings: {}", e))
    } else {
        let settings = AppSettings::default();
        save_settings(path, &settings)?;
        tlog!("[settings] Wrote defaults to {}", path.display());
        Ok(settings)
    }
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create settings dir: {}", e))?;
    }

    initialize_directories(settings)?;

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {}", e))?;

    std::fs::write(path, content).map_err(|e| format!("Failed to write settings: {}", e))
}

pub fn initialize_directories(settings: &AppSettings) -> Result<(), String> {
    std::fs::create_dir_all(&settings.log_dir)
        .map_err(|e| format!("Failed to create log directory: {}", e))?;

    std::fs::create_dir_all(&settings.csv_dir)
        .map_err(|e| format!("Failed to create CSV directory: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_settings(root: &Path) -> AppSettings {
        AppSettings {
            log_dir: root.join("logs").to_string_lossy().to_string(),
            csv_dir: root.join("csv").to_string_lossy().to_string(),
            ..AppSettings::default()
        }
    }

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.poll_interval_ms, 50);
        assert_eq!(settings.refresh_interval_ms, 300);
        assert_eq!(settings.max_line_length, 1024);
        assert_eq!(settings.default_port, None);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{ "default_port": "COM4", "poll_interval_ms": 20 }"#).unwrap();
        assert_eq!(settings.default_port.as_deref(), Some("COM4"));
        assert_eq!(settings.poll_interval_ms, 20);
        assert_eq!(settings.refresh_interval_ms, 300);
        assert_eq!(settings.port_prefix, default_port_prefix());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("settings.json");

        let mut settings = scratch_settings(dir.path());
        settings.default_port = Some("/dev/ttyUSB0".to_string());
        settings.port_prefix = None;
        save_settings(&path, &settings).unwrap();

        assert!(dir.path().join("logs").is_dir());
        assert!(dir.path().join("csv").is_dir());
        assert_eq!(load_settings(&path).unwrap(), settings);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load_settings(&path).unwrap_err();
        assert!(err.starts_with("Failed to parse settings"));
    }
}
