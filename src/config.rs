//! Editor configuration
//!
//! Loaded from an optional YAML file and then overridden from the
//! environment:
//!
//! - `GENWEB_EDITOR_CONFIG` - path to a YAML file
//! - `GENWEB_API_URL` - base URL of the genweb server
//! - `GENWEB_MAX_TYPE_AHEAD` - suggestion cap
//! - `GENWEB_BLUR_CLEAR_DELAY_MS` - strict blur-clear delay

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_MAX_TYPE_AHEAD: usize = 50;
pub const DEFAULT_BLUR_CLEAR_DELAY_MS: u64 = 400;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Server root; `/api/v1/...` is appended
    pub api_base_url: String,
    /// Maximum suggestions shown by any type-ahead panel
    pub max_type_ahead: usize,
    /// Window between a strict blur and the clearing of a mismatched input
    pub blur_clear_delay_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            max_type_ahead: DEFAULT_MAX_TYPE_AHEAD,
            blur_clear_delay_ms: DEFAULT_BLUR_CLEAR_DELAY_MS,
        }
    }
}

impl EditorConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Build from `GENWEB_EDITOR_CONFIG` (if set) plus env overrides
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup("GENWEB_EDITOR_CONFIG") {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };

        if let Some(url) = lookup("GENWEB_API_URL") {
            config.api_base_url = url;
        }
        if let Some(max) = lookup("GENWEB_MAX_TYPE_AHEAD") {
            config.max_type_ahead = parse_number("GENWEB_MAX_TYPE_AHEAD", &max)?;
        }
        if let Some(delay) = lookup("GENWEB_BLUR_CLEAR_DELAY_MS") {
            config.blur_clear_delay_ms = parse_number("GENWEB_BLUR_CLEAR_DELAY_MS", &delay)?;
        }

        Ok(config)
    }

    pub fn blur_clear_delay(&self) -> Duration {
        Duration::from_millis(self.blur_clear_delay_ms)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| EditorError::Config(format!("{key} must be a number, got '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_editor_constants() {
        let config = EditorConfig::default();
        assert_eq!(config.max_type_ahead, 50);
        assert_eq!(config.blur_clear_delay(), Duration::from_millis(400));
    }

    #[test]
    fn yaml_fills_missing_fields_with_defaults() {
        let config = EditorConfig::from_yaml_str("api_base_url: http://genweb:9000\n").unwrap();
        assert_eq!(config.api_base_url, "http://genweb:9000");
        assert_eq!(config.max_type_ahead, DEFAULT_MAX_TYPE_AHEAD);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_type_ahead: 10\nblur_clear_delay_ms: 250").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = EditorConfig::from_lookup(lookup(&[
            ("GENWEB_EDITOR_CONFIG", path.as_str()),
            ("GENWEB_MAX_TYPE_AHEAD", "20"),
        ]))
        .unwrap();

        assert_eq!(config.max_type_ahead, 20);
        assert_eq!(config.blur_clear_delay_ms, 250);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn bad_numbers_are_config_errors() {
        let err = EditorConfig::from_lookup(lookup(&[("GENWEB_MAX_TYPE_AHEAD", "lots")]))
            .unwrap_err();
        assert!(matches!(err, EditorError::Config(_)));
    }
}
