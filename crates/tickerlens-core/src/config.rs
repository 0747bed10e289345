//! Runtime configuration resolved from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TICKERLENS_ALPHAVANTAGE_API_KEY` (or `ALPHAVANTAGE_API_KEY`) | unset |
//! | `TICKERLENS_HOME` | `$HOME/.tickerlens` |
//! | `TICKERLENS_MA_WINDOW` | `7` |
//! | `TICKERLENS_TIMEOUT_MS` | `5000` |
//! | `TICKERLENS_SYMBOL_TTL_SECS` | `86400` |
//! | `TICKERLENS_LOG` | `warn` |

use std::env;
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::analytics::DEFAULT_WINDOW;
use crate::directory::DEFAULT_TTL;

pub const API_KEY_VAR: &str = "TICKERLENS_ALPHAVANTAGE_API_KEY";
pub const FALLBACK_API_KEY_VAR: &str = "ALPHAVANTAGE_API_KEY";
pub const HOME_VAR: &str = "TICKERLENS_HOME";
pub const MA_WINDOW_VAR: &str = "TICKERLENS_MA_WINDOW";
pub const TIMEOUT_MS_VAR: &str = "TICKERLENS_TIMEOUT_MS";
pub const SYMBOL_TTL_VAR: &str = "TICKERLENS_SYMBOL_TTL_SECS";
pub const LOG_VAR: &str = "TICKERLENS_LOG";

pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub home: PathBuf,
    pub ma_window: usize,
    pub timeout_ms: u64,
    pub symbol_ttl: Duration,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolves configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Ok(Self {
            api_key: value(API_KEY_VAR).or_else(|| value(FALLBACK_API_KEY_VAR)),
            home: resolve_home(value(HOME_VAR), value("HOME")),
            ma_window: parse_positive(MA_WINDOW_VAR, value(MA_WINDOW_VAR), DEFAULT_WINDOW as u64)?
                as usize,
            timeout_ms: parse_positive(TIMEOUT_MS_VAR, value(TIMEOUT_MS_VAR), DEFAULT_TIMEOUT_MS)?,
            symbol_ttl: Duration::from_secs(parse_positive(
                SYMBOL_TTL_VAR,
                value(SYMBOL_TTL_VAR),
                DEFAULT_TTL.as_secs(),
            )?),
            log_filter: value(LOG_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
        })
    }

    /// Directory backing the file store.
    pub fn store_dir(&self) -> PathBuf {
        self.home.join("store")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            home: resolve_home(None, env::var("HOME").ok()),
            ma_window: DEFAULT_WINDOW,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            symbol_ttl: DEFAULT_TTL,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("home", &self.home)
            .field("ma_window", &self.ma_window)
            .field("timeout_ms", &self.timeout_ms)
            .field("symbol_ttl", &self.symbol_ttl)
            .field("log_filter", &self.log_filter)
            .finish()
    }
}

fn resolve_home(explicit: Option<String>, user_home: Option<String>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Some(home) = user_home {
        return PathBuf::from(home).join(".tickerlens");
    }

    PathBuf::from(".tickerlens")
}

fn parse_positive(
    name: &'static str,
    raw: Option<String>,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber { name, value: raw }),
    }
}
