use serde::{Deserialize, Serialize};

use crate::{ArcPath, ArcStr, log::LogLevel};

/// Options for path-based configuration values.
#[derive(Debug, Clone, Copy)]
pub enum PathOpt {
    /// Directory where log files are stored
    LogDir,
}

/// Options for string configuration values.
#[derive(Debug, Clone, Copy)]
pub enum StrOpt {
    /// Base URL of the catalog service, without a trailing slash
    BaseUrl,
}

/// Options for numeric configuration values.
#[derive(Debug, Clone, Copy)]
pub enum USizeOpt {
    /// Maximum age of log files in days before they are deleted, 0 keeps them
    MaxAge,
    /// Timeout for a single network request in seconds
    Timeout,
    /// How many times a rate limited or failed request is retried
    MaxRetries,
    /// Delay before the first retry in milliseconds
    InitialBackoffMs,
    /// Upper bound for a single retry delay in milliseconds, 0 means uncapped
    MaxBackoffMs,
    /// How long a notification stays visible in milliseconds
    NotificationMs,
}

/// Every configurable value, stored on disk as TOML.
///
/// Keys missing from the file take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Data {
    base_url: ArcStr,
    log_dir: ArcPath,
    log_level: LogLevel,
    max_age: usize,
    timeout: usize,
    max_retries: usize,
    initial_backoff_ms: usize,
    max_backoff_ms: usize,
    notification_ms: usize,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            base_url: ArcStr::from("https://api.jikan.moe/v4"),
            log_dir: ArcPath::from("/tmp/radar/logs"),
            log_level: LogLevel::Warning,
            max_age: 0,
            timeout: 30,
            max_retries: 3,
            initial_backoff_ms: 1000,
            max_backoff_ms: 0,
            notification_ms: 3000,
        }
    }
}

impl Data {
    pub fn path(&self, opt: PathOpt) -> ArcPath {
        match opt {
            PathOpt::LogDir => self.log_dir.clone(),
        }
    }

    pub fn set_path(&mut self, opt: PathOpt, path: ArcPath) {
        match opt {
            PathOpt::LogDir => self.log_dir = path,
        }
    }

    pub fn str(&self, opt: StrOpt) -> ArcStr {
        match opt {
            StrOpt::BaseUrl => self.base_url.clone(),
        }
    }

    pub fn set_str(&mut self, opt: StrOpt, value: ArcStr) {
        match opt {
            StrOpt::BaseUrl => self.base_url = value,
        }
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    pub fn usize(&self, opt: USizeOpt) -> usize {
        match opt {
            USizeOpt::MaxAge => self.max_age,
            USizeOpt::Timeout => self.timeout,
            USizeOpt::MaxRetries => self.max_retries,
            USizeOpt::InitialBackoffMs => self.initial_backoff_ms,
            USizeOpt::MaxBackoffMs => self.max_backoff_ms,
            USizeOpt::NotificationMs => self.notification_ms,
        }
    }

    pub fn set_usize(&mut self, opt: USizeOpt, value: usize) {
        match opt {
            USizeOpt::MaxAge => self.max_age = value,
            USizeOpt::Timeout => self.timeout = value,
            USizeOpt::MaxRetries => self.max_retries = value,
            USizeOpt::InitialBackoffMs => self.initial_backoff_ms = value,
            USizeOpt::MaxBackoffMs => self.max_backoff_ms = value,
            USizeOpt::NotificationMs => self.notification_ms = value,
        }
    }
}
