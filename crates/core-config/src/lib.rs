//! Configuration loading and parsing.
//!
//! Parses `previewsync.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [linemap]
//! attribute = "data-line"   # element attribute carrying the source line
//! interpolate = true        # estimate positions between annotated lines
//!
//! [log]
//! file = "previewsync.log"
//! ```
//!
//! Every field is optional. Unknown fields are ignored (TOML deserialization
//! tolerance). A file that fails to parse falls back to defaults with a
//! warning rather than aborting the host.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub use core_document::DEFAULT_LINE_ATTRIBUTE;

pub const CONFIG_FILE_NAME: &str = "previewsync.toml";
pub const DEFAULT_LOG_FILE: &str = "previewsync.log";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LineMapConfig {
    #[serde(default = "LineMapConfig::default_attribute")]
    pub attribute: String,
    #[serde(default = "LineMapConfig::default_interpolate")]
    pub interpolate: bool,
}

impl Default for LineMapConfig {
    fn default() -> Self {
        Self {
            attribute: Self::default_attribute(),
            interpolate: Self::default_interpolate(),
        }
    }
}

impl LineMapConfig {
    fn default_attribute() -> String {
        DEFAULT_LINE_ATTRIBUTE.to_string()
    }
    const fn default_interpolate() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_file")]
    pub file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: Self::default_file(),
        }
    }
}

impl LogConfig {
    fn default_file() -> String {
        DEFAULT_LOG_FILE.to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub linemap: LineMapConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,         // original file string (optional)
    pub source: Option<PathBuf>,     // path the raw string came from
    pub file: ConfigFile,            // parsed (or default) data
    pub parse_error: Option<String>, // file existed but failed to parse
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    // Working directory wins over the platform config dir.
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("previewsync").join(CONFIG_FILE_NAME);
    }
    // Final fallback relative filename.
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let mut cfg = Config {
                raw: Some(content),
                source: Some(path),
                file,
                parse_error: None,
            };
            cfg.normalize();
            Ok(cfg)
        }
        Err(e) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %e,
                "config_parse_failed_using_defaults"
            );
            Ok(Config {
                source: Some(path),
                parse_error: Some(e.to_string()),
                ..Config::default()
            })
        }
    }
}

impl Config {
    /// Replace values that cannot work with their defaults.
    fn normalize(&mut self) {
        let attribute = self.file.linemap.attribute.trim();
        if attribute.is_empty() {
            info!(
                target: "config",
                fallback = DEFAULT_LINE_ATTRIBUTE,
                "linemap_attribute_empty"
            );
            self.file.linemap.attribute = DEFAULT_LINE_ATTRIBUTE.to_string();
        } else if attribute.len() != self.file.linemap.attribute.len() {
            self.file.linemap.attribute = attribute.to_string();
        }
        if self.file.log.file.trim().is_empty() {
            self.file.log.file = DEFAULT_LOG_FILE.to_string();
        }
    }

    pub fn line_attribute(&self) -> &str {
        &self.file.linemap.attribute
    }

    pub fn interpolate(&self) -> bool {
        self.file.linemap.interpolate
    }

    pub fn log_file(&self) -> &str {
        &self.file.log.file
    }
}
