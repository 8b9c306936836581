//! Configuration module for the grade sheet service
//!
//! The roll-number range and the semester/session the portal is queried for
//! are fixed constants. Everything about how the portal is reached and where
//! the sheet lands lives in [`Settings`], which can be loaded from YAML.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix shared by every roll number in the batch
pub const ROLL_PREFIX: &str = "21011100";

/// First sequence number appended to [`ROLL_PREFIX`]
pub const ROLL_FIRST: u32 = 22;

/// Last sequence number appended to [`ROLL_PREFIX`] (inclusive)
pub const ROLL_LAST: u32 = 81;

/// Semester id sent to the subject list lookup
pub const SEMESTER_ID: u32 = 2;

/// Session string sent to the subject list lookup
pub const SESSION: &str = "Even-(2021-22)";

pub const DEFAULT_BASE_URL: &str = "https://results.bput.ac.in";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_OUTPUT_FILE: &str = "studentGrades.xlsx";

/// Roll numbers of the batch in the order they are visited
pub fn roll_numbers() -> Vec<String> {
    (ROLL_FIRST..=ROLL_LAST)
        .map(|seq| format!("{}{:02}", ROLL_PREFIX, seq))
        .collect()
}

/// Runtime settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the results portal (e.g., "https://results.bput.ac.in")
    pub base_url: String,
    /// User-Agent header sent with every portal request
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Pause after each roll number, in milliseconds
    pub request_delay_ms: u64,
    /// Spreadsheet file name, resolved against the working directory when relative
    pub output_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
            request_delay_ms: 1000,
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .context(format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)
            .context("Failed to parse config YAML")?;

        Ok(settings)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Output file as an absolute path
    pub fn output_path(&self) -> Result<PathBuf> {
        let path = PathBuf::from(&self.output_file);
        if path.is_absolute() {
            return Ok(path);
        }
        let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
        Ok(cwd.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_numbers_cover_batch_in_order() {
        let rolls = roll_numbers();
        assert_eq!(rolls.len(), 60);
        assert_eq!(rolls.first().map(String::as_str), Some("2101110022"));
        assert_eq!(rolls.last().map(String::as_str), Some("2101110081"));

        let numeric: Vec<u64> = rolls.iter().map(|r| r.parse().unwrap()).collect();
        assert!(numeric.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_settings_partial_yaml_keeps_defaults() {
        let yaml = r#"
base_url: "http://127.0.0.1:9000"
request_delay_ms: 0
"#;

        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.base_url, "http://127.0.0.1:9000");
        assert_eq!(settings.request_delay(), Duration::ZERO);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.output_file, DEFAULT_OUTPUT_FILE);
        assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_output_path_is_absolute() {
        let settings = Settings::default();
        let path = settings.output_path().unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with(DEFAULT_OUTPUT_FILE));
    }

    #[test]
    fn test_settings_rejects_bad_yaml() {
        assert!(Settings::from_yaml("request_delay_ms: [1, 2]").is_err());
    }
}
