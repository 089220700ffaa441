//! Run configuration.
//!
//! A [`FileConfig`] is what the TOML file (and the command line overrides)
//! provide; [`ScanConfig`] is the resolved value handed to a scan.

use crate::error::{ConfigError, CoreError};
use crate::types::{BoardUrls, DEFAULT_BOARDS_HOST, DEFAULT_MEDIA_HOST};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BOARD: &str = "pol";
pub const DEFAULT_API_BASE: &str = "https://a.4cdn.org";
pub const DEFAULT_USER_AGENT: &str = "chanwatch/0.1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LAST_HOURS: u64 = 2;
pub const DEFAULT_MAX_THREADS: usize = 800;
pub const DEFAULT_LIVE_OUTPUT_DIR: &str = "output_official_api";
pub const DEFAULT_ARCHIVE_OUTPUT_DIR: &str = "output_archived";

pub const DEFAULT_KEYWORDS: [&str; 9] = [
    "trump",
    "election",
    "vote",
    "biden",
    "government",
    "president",
    "policy",
    "democrat",
    "republican",
];

/// Inclusive range of Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: i64,
    end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvalidValue {
                field: "window".to_string(),
                value: format!("start {} is after end {}", start, end),
            });
        }
        Ok(Self { start, end })
    }

    pub fn unbounded() -> Self {
        Self {
            start: i64::MIN,
            end: i64::MAX,
        }
    }

    pub fn last_hours(now: DateTime<Utc>, hours: u64) -> Result<Self, ConfigError> {
        let hours = i64::try_from(hours).map_err(|_| ConfigError::InvalidValue {
            field: "window.last_hours".to_string(),
            value: hours.to_string(),
        })?;
        let start = Duration::try_hours(hours)
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "window.last_hours".to_string(),
                value: hours.to_string(),
            })?;
        Self::new(start.timestamp(), now.timestamp())
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn is_unbounded(&self) -> bool {
        self.start == i64::MIN && self.end == i64::MAX
    }

    /// Human-readable range for logs and report headers.
    pub fn describe(&self) -> String {
        if self.is_unbounded() {
            return "all time".to_string();
        }
        format!(
            "{} to {}",
            crate::types::format_timestamp(self.start),
            crate::types::format_timestamp(self.end)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowConfig {
    pub last_hours: Option<u64>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl WindowConfig {
    pub fn is_empty(&self) -> bool {
        self.last_hours.is_none() && self.start.is_none() && self.end.is_none()
    }

    /// `None` when nothing was configured, so the caller picks its own default.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<Option<TimeWindow>, ConfigError> {
        match (self.last_hours, self.start, self.end) {
            (None, None, None) => Ok(None),
            (Some(hours), None, None) => TimeWindow::last_hours(now, hours).map(Some),
            (None, Some(start), end) => {
                let end = end.unwrap_or(now);
                TimeWindow::new(start.timestamp(), end.timestamp()).map(Some)
            }
            (None, None, Some(_)) => Err(ConfigError::MissingField {
                field: "window.start".to_string(),
            }),
            (Some(hours), _, _) => Err(ConfigError::InvalidValue {
                field: "window.last_hours".to_string(),
                value: format!("{} (cannot be combined with start/end)", hours),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub api_base: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// HTTP settings for the board API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl From<&ClientConfig> for ClientSettings {
    fn from(config: &ClientConfig) -> Self {
        let defaults = ClientSettings::default();
        Self {
            api_base: config
                .api_base
                .clone()
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            user_agent: config.user_agent.clone().unwrap_or(defaults.user_agent),
            timeout_secs: config.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }
}

/// Contents of a `chanwatch.toml` file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub board: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
    pub max_threads: Option<usize>,
    pub boards_host: Option<String>,
    pub media_host: Option<String>,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl FileConfig {
    /// Reads and parses a config file. A missing file is a
    /// [`ConfigError::FileNotFound`]; other read failures stay I/O errors.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::Config(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }),
            _ => CoreError::Io(e),
        })?;
        Ok(Self::from_toml_str(&contents)?)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings::from(&self.client)
    }

    /// Resolves into a [`ScanConfig`], filling gaps with the given defaults.
    pub fn resolve(
        &self,
        now: DateTime<Utc>,
        default_window: TimeWindow,
        default_output_dir: &str,
    ) -> Result<ScanConfig, ConfigError> {
        let board = self
            .board
            .as_deref()
            .unwrap_or(DEFAULT_BOARD)
            .trim()
            .trim_matches('/')
            .to_string();
        if board.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "board".to_string(),
                value: String::new(),
            });
        }

        let keywords: Vec<String> = match &self.keywords {
            Some(list) => list
                .iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            None => DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        };
        if keywords.is_empty() {
            return Err(ConfigError::MissingField {
                field: "keywords".to_string(),
            });
        }

        let window = self.window.resolve(now)?.unwrap_or(default_window);

        Ok(ScanConfig {
            board,
            keywords,
            window,
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(default_output_dir)),
            max_threads: self.max_threads.unwrap_or(DEFAULT_MAX_THREADS),
            urls: BoardUrls::new(
                self.boards_host.as_deref().unwrap_or(DEFAULT_BOARDS_HOST),
                self.media_host.as_deref().unwrap_or(DEFAULT_MEDIA_HOST),
            ),
        })
    }
}

/// Everything a scan needs, passed explicitly into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub board: String,
    pub keywords: Vec<String>,
    pub window: TimeWindow,
    pub output_dir: PathBuf,
    pub max_threads: usize,
    pub urls: BoardUrls,
}
