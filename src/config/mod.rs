//! Settings - environment variables (optionally from `.env`) with a CLI override for the folder

use crate::naming::NamingMode;
use crate::readiness::RetryPolicy;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const SCAN_FOLDER: &str = "SCAN_FOLDER";
pub const LOG_FILE_PATH: &str = "LOG_FILE_PATH";
pub const MAX_RETRIES: &str = "RENAMER_MAX_RETRIES";
pub const RETRY_DELAY_MS: &str = "RENAMER_RETRY_DELAY_MS";
pub const DEBOUNCE_MS: &str = "RENAMER_DEBOUNCE_MS";
pub const NAMING: &str = "RENAMER_NAMING";
pub const NER_ENDPOINT: &str = "RENAMER_NER_ENDPOINT";

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SCAN_FOLDER is not set and no folder was given on the command line")]
    MissingScanFolder,
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Folder to watch (not recursive)
    pub scan_folder: PathBuf,
    /// Extra log file next to stderr
    pub log_file: Option<PathBuf>,
    pub retry: RetryPolicy,
    /// Debounce window of the filesystem watcher
    pub debounce: Duration,
    pub naming: NamingMode,
    /// HTTP NER service; the built-in recognizer is used when unset
    pub ner_endpoint: Option<String>,
}

impl Settings {
    /// Read settings from the process environment; the first CLI argument overrides `SCAN_FOLDER`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(std::env::args().nth(1), |key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup
    pub fn from_lookup<F>(cli_folder: Option<String>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let scan_folder = cli_folder
            .filter(|f| !f.trim().is_empty())
            .or_else(|| get(SCAN_FOLDER))
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingScanFolder)?;

        let defaults = RetryPolicy::default();
        let max_attempts = match get(MAX_RETRIES) {
            Some(value) => parse::<u32>(MAX_RETRIES, value, "a positive integer")
                .and_then(|n| positive(MAX_RETRIES, n))?,
            None => defaults.max_attempts,
        };
        let delay = match get(RETRY_DELAY_MS) {
            Some(value) => Duration::from_millis(parse(RETRY_DELAY_MS, value, "milliseconds")?),
            None => defaults.delay,
        };
        let debounce = match get(DEBOUNCE_MS) {
            Some(value) => Duration::from_millis(parse(DEBOUNCE_MS, value, "milliseconds")?),
            None => DEFAULT_DEBOUNCE,
        };
        let naming = match get(NAMING) {
            Some(value) => parse(NAMING, value, "\"title\" or \"title-company\"")?,
            None => NamingMode::default(),
        };

        Ok(Self {
            scan_folder,
            log_file: get(LOG_FILE_PATH).map(PathBuf::from),
            retry: RetryPolicy {
                max_attempts,
                delay,
            },
            debounce,
            naming,
            ner_endpoint: get(NER_ENDPOINT),
        })
    }
}

fn parse<T: FromStr>(
    key: &'static str,
    value: String,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value,
        expected,
    })
}

fn positive(key: &'static str, n: u32) -> Result<u32, ConfigError> {
    if n == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: n.to_string(),
            expected: "a positive integer",
        });
    }
    Ok(n)
}
