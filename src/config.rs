//! Configuration file parser for ~/.config/hckr/config.toml.
//!
//! The config file is optional. A missing or empty file yields
//! `Config::default()`. Unknown keys are accepted but logged, and values that
//! parse but make no sense (an unknown filter name, an unknown timezone)
//! fall back to their defaults with a warning.
use crate::feed::{FetchOptions, DEFAULT_BASE_URL, DEFAULT_SITE_URL};
use crate::view::{FilterMode, SortMode};
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

/// The archive rolls over at midnight US Pacific, daylight saving included.
const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

// ============================================================================
// Configuration Struct
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme variant name ("dark" or "light").
    pub theme: String,

    /// Archive endpoint; day files live at `{base_url}/YYYYMMDD.js`.
    pub base_url: String,

    /// Site whose pages are scraped for today and yesterday.
    pub site_url: String,

    /// Number of days kept in the in-memory cache.
    pub cache_days: usize,

    /// IANA timezone of the archive's day boundary.
    pub timezone: String,

    /// Filter applied at startup (top10, top20, top50, all, homepage).
    pub default_filter: String,

    /// Sort applied at startup (points, comments, date).
    pub default_sort: String,

    /// Per-request timeout for archive fetches.
    pub request_timeout_secs: u64,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            cache_days: 14,
            timezone: DEFAULT_TIMEZONE.name().to_string(),
            default_filter: "all".to_string(),
            default_sort: "date".to_string(),
            request_timeout_secs: 30,
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 9] = [
        "theme",
        "base_url",
        "site_url",
        "cache_days",
        "timezone",
        "default_filter",
        "default_sort",
        "request_timeout_secs",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::info!(
            theme = %config.theme,
            base_url = %config.base_url,
            cache_days = config.cache_days,
            "Loaded configuration"
        );
        Ok(config)
    }

    // ========================================================================
    // Resolved values
    // ========================================================================

    pub fn filter_mode(&self) -> FilterMode {
        FilterMode::from_str_name(&self.default_filter).unwrap_or_else(|| {
            tracing::warn!(value = %self.default_filter, "Unknown default_filter, using 'all'");
            FilterMode::default()
        })
    }

    pub fn sort_mode(&self) -> SortMode {
        SortMode::from_str_name(&self.default_sort).unwrap_or_else(|| {
            tracing::warn!(value = %self.default_sort, "Unknown default_sort, using 'date'");
            SortMode::default()
        })
    }

    /// Timezone in which archive days begin and end.
    pub fn archive_timezone(&self) -> Tz {
        self.timezone.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!(
                value = %self.timezone,
                "Unknown timezone, using {}",
                DEFAULT_TIMEZONE.name()
            );
            DEFAULT_TIMEZONE
        })
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            ..FetchOptions::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
