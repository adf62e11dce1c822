//! Persisted operator settings.
//!
//! Stored as pretty JSON in `<config dir>/etiketka/settings.json`. Every field
//! has a default, so files written by older versions (or hand-edited ones
//! missing keys) still load. A file that fails to parse is ignored with a
//! warning.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::coordinator::PrintMode;
use crate::document::PrintDispatch;
use crate::error::LabelError;
use crate::printer::LabelSize;
use crate::render::FontSource;
use crate::transport::SessionConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Exact advertised name of the printer to prefer during discovery
    #[serde(default)]
    pub preferred_device_name: Option<String>,

    #[serde(default)]
    pub label_size: LabelSize,

    #[serde(default)]
    pub print_mode: PrintMode,

    #[serde(default)]
    pub dispatch: PrintDispatch,

    /// Ask the PDF viewer to open its print dialog
    #[serde(default = "default_auto_print")]
    pub auto_print: bool,

    /// Where PDFs and ZPL downloads are written
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub font: FontSource,

    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,

    #[serde(default)]
    pub write_timeout_secs: Option<u64>,

    /// Sequence number of the last label printed (0 = none yet)
    #[serde(default)]
    pub last_sequence: u32,
}

fn default_auto_print() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preferred_device_name: None,
            label_size: LabelSize::default(),
            print_mode: PrintMode::default(),
            dispatch: PrintDispatch::default(),
            auto_print: default_auto_print(),
            output_dir: None,
            font: FontSource::default(),
            connect_timeout_secs: None,
            write_timeout_secs: None,
            last_sequence: 0,
        }
    }
}

impl Settings {
    /// Load from `path`. A missing or unparsable file yields defaults.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        "Failed to parse settings: {}. Using defaults.",
                        e
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Write to `path`, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<(), LabelError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LabelError::Settings(format!("Failed to serialize settings: {}", e)))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Platform config path.
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("etiketka");
        path.push("settings.json");
        path
    }

    /// Configured output directory, or `<documents>/etiketka`.
    pub fn output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => dirs::document_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("etiketka"),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
            write_timeout: self.write_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Sequence number the next session should start at.
    pub fn next_sequence(&self) -> u32 {
        self.last_sequence.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("etiketka-settings-{}", uuid::Uuid::new_v4()))
            .join("settings.json")
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.preferred_device_name, None);
        assert_eq!(settings.label_size, LabelSize::Small);
        assert_eq!(settings.print_mode, PrintMode::Document);
        assert!(settings.auto_print);
        assert_eq!(settings.next_sequence(), 1);
        assert_eq!(settings.session_config(), SessionConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{"preferred_device_name": "ZD421-A"}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.preferred_device_name.as_deref(), Some("ZD421-A"));
        assert_eq!(settings.label_size, LabelSize::Small);
        assert!(settings.auto_print);
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path();
        let settings = Settings {
            preferred_device_name: Some("Zebra ZD421".to_string()),
            label_size: LabelSize::Large,
            print_mode: PrintMode::DirectMarkup,
            connect_timeout_secs: Some(20),
            last_sequence: 17,
            ..Default::default()
        };
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.next_sequence(), 18);
        assert_eq!(
            loaded.session_config().connect_timeout,
            Some(Duration::from_secs(20))
        );

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        assert_eq!(Settings::load(&temp_path()), Settings::default());
    }

    #[test]
    fn test_garbage_file_yields_defaults() {
        let path = temp_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
