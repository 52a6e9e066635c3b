//! 日志级别启动参数
//!
//! `--log-level <name>` 与 `--log-level-file <path>` 互斥；都不给时默认 INFO。
//! 级别文件格式：
//!
//! ```json
//! { "default": "info", "loggers": { "search": "debug" } }
//! ```

use crate::kernel::services::ports::logger::{LogLevel, ParseLevelError};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--log-level and --log-level-file are mutually exclusive")]
    MutuallyExclusive,
    #[error(transparent)]
    InvalidLevel(#[from] ParseLevelError),
    #[error("failed to read log level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed log level file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct LogLevelArgs {
    /// Level applied to every logger (trace, debug, info, warn, error, fatal)
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// JSON file mapping logger names to levels
    #[arg(long = "log-level-file", value_name = "PATH")]
    pub log_level_file: Option<PathBuf>,
}

impl LogLevelArgs {
    pub fn resolve(&self) -> Result<LogLevelConfig, ConfigError> {
        match (&self.log_level, &self.log_level_file) {
            (Some(_), Some(_)) => Err(ConfigError::MutuallyExclusive),
            (Some(level), None) => Ok(LogLevelConfig::with_default(level.parse::<LogLevel>()?)),
            (None, Some(path)) => LogLevelConfig::load(path),
            (None, None) => Ok(LogLevelConfig::default()),
        }
    }
}

#[derive(Deserialize)]
struct LevelFile {
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    loggers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogLevelConfig {
    pub default: LogLevel,
    pub loggers: FxHashMap<String, LogLevel>,
}

impl LogLevelConfig {
    pub fn with_default(default: LogLevel) -> Self {
        Self {
            default,
            loggers: FxHashMap::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: LevelFile = serde_json::from_str(text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let default = match file.default {
            Some(name) => name.parse::<LogLevel>()?,
            None => LogLevel::Info,
        };
        let mut loggers: FxHashMap<String, LogLevel> = FxHashMap::default();
        for (name, level) in file.loggers {
            loggers.insert(name, level.parse::<LogLevel>()?);
        }
        Ok(Self { default, loggers })
    }

    pub fn override_for(&self, name: &str) -> Option<LogLevel> {
        self.loggers.get(name).copied()
    }

    pub fn level_for(&self, name: &str) -> LogLevel {
        self.override_for(name).unwrap_or(self.default)
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/logger/cli.rs"]
mod tests;
