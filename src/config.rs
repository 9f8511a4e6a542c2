//! Configuration for termline.
//!
//! This module provides TOML configuration file loading from
//! `~/.termline/config.toml`.
//!
//! # Configuration File
//!
//! ```toml
//! # Wrap long lines over multiple rows instead of scrolling
//! multi_line = true
//!
//! # Echo '*' instead of typed characters
//! mask_mode = false
//!
//! # History entries kept in memory and on disk
//! history_max_len = 100
//!
//! # Override the history file location
//! history_file = "/home/user/.termline/history"
//! ```

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Editing and rendering policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Render long lines over multiple rows
    pub multi_line: bool,
    /// Show '*' instead of input (for passwords)
    pub mask_mode: bool,
    /// Maximum history entries
    pub history_max_len: usize,
    /// History file path; None means `~/.termline/history`
    pub history_file: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            multi_line: false,
            mask_mode: false,
            history_max_len: crate::history::DEFAULT_HISTORY_MAX_LEN,
            history_file: None,
        }
    }
}

impl EditorConfig {
    /// Load configuration from file, falling back to defaults.
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Ok(config) = toml::from_str(&content) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<(), String> {
        if let Some(path) = Self::config_path() {
            let content = toml::to_string_pretty(self)
                .map_err(|e| format!("Failed to serialize config: {}", e))?;
            fs::write(&path, content).map_err(|e| format!("Failed to write config: {}", e))?;
            Ok(())
        } else {
            Err("Could not determine config path".to_string())
        }
    }

    /// History file path, honoring the configured override.
    pub fn history_path(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.history_file {
            return Some(path.clone());
        }
        termline_dir().map(|dir| dir.join("history"))
    }

    fn config_path() -> Option<PathBuf> {
        termline_dir().map(|dir| dir.join("config.toml"))
    }
}

/// `~/.termline`, created on first use.
fn termline_dir() -> Option<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from)?;
    let dir = home.join(".termline");
    if !dir.exists() {
        let _ = fs::create_dir_all(&dir);
    }
    Some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = EditorConfig::default();
        assert!(!config.multi_line);
        assert!(!config.mask_mode);
        assert_eq!(config.history_max_len, 100);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: EditorConfig = toml::from_str("multi_line = true").unwrap();
        assert!(config.multi_line);
        assert!(!config.mask_mode);
        assert_eq!(config.history_max_len, 100);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("HOME", dir.path());

        let mut config = EditorConfig::default();
        config.mask_mode = true;
        config.save().unwrap();

        let loaded = EditorConfig::load();
        assert!(loaded.mask_mode);
    }

    #[test]
    fn history_file_override_wins() {
        let config: EditorConfig =
            toml::from_str("history_file = \"/tmp/custom-history\"").unwrap();
        assert_eq!(
            config.history_path().unwrap(),
            PathBuf::from("/tmp/custom-history")
        );
    }
}
