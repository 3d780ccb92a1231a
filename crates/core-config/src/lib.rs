//! Configuration loading and parsing.
//!
//! Parses `oxmodal.toml` (or an override path supplied by the host) into the
//! handful of settings the interpreter consults while executing commands:
//!
//! ```toml
//! [indent]
//! width = 4
//! expand_tab = true
//!
//! [viewport]
//! fallback_lines = 24
//! ```
//!
//! Missing files and parse errors fall back to defaults. Unknown fields are
//! ignored (TOML deserialization tolerance) so newer files keep loading.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

pub const CONFIG_FILE_NAME: &str = "oxmodal.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct IndentConfig {
    #[serde(default = "IndentConfig::default_width")]
    pub width: u8,
    #[serde(default = "IndentConfig::default_expand_tab")]
    pub expand_tab: bool,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            expand_tab: Self::default_expand_tab(),
        }
    }
}

impl IndentConfig {
    const fn default_width() -> u8 {
        4
    }
    const fn default_expand_tab() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ViewportConfig {
    /// Page size used when the host reports a zero-height viewport.
    #[serde(default = "ViewportConfig::default_fallback_lines")]
    pub fallback_lines: u16,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            fallback_lines: Self::default_fallback_lines(),
        }
    }
}

impl ViewportConfig {
    const fn default_fallback_lines() -> u16 {
        24
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub indent: IndentConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxmodal").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(
                target: "config",
                path = %path.display(),
                indent_width = file.indent.width,
                expand_tab = file.indent.expand_tab,
                fallback_lines = file.viewport.fallback_lines,
                "config_loaded"
            );
            Ok(Config {
                raw: Some(content),
                file,
            })
        }
        Err(e) => {
            info!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Text inserted (or removed) per indent level. A zero width still yields one column.
    pub fn indent_unit(&self) -> String {
        let indent = &self.file.indent;
        if indent.expand_tab {
            " ".repeat(usize::from(indent.width.max(1)))
        } else {
            "\t".to_string()
        }
    }

    /// Lines moved by a full page step given the height the host reports.
    pub fn page_lines(&self, reported: usize) -> usize {
        if reported > 0 {
            reported
        } else {
            usize::from(self.file.viewport.fallback_lines).max(1)
        }
    }

    /// Lines moved by a half page step (never zero).
    pub fn half_page_lines(&self, reported: usize) -> usize {
        (self.page_lines(reported) / 2).max(1)
    }
}
