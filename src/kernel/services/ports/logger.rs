use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Severity threshold of a logger. Ordered from most to least verbose;
/// the discriminant is the wire severity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "LevelRepr")]
#[repr(u8)]
pub enum LogLevel {
    Trace = 10,
    Debug = 20,
    #[default]
    Info = 30,
    Warn = 40,
    Error = 50,
    Fatal = 60,
}

pub const ALL_LEVELS: [LogLevel; 6] = [
    LogLevel::Trace,
    LogLevel::Debug,
    LogLevel::Info,
    LogLevel::Warn,
    LogLevel::Error,
    LogLevel::Fatal,
];

impl LogLevel {
    pub fn severity(self) -> u8 {
        self as u8
    }

    /// Exact severity lookup.
    pub fn try_from_severity(severity: i64) -> Option<Self> {
        ALL_LEVELS
            .into_iter()
            .find(|level| i64::from(level.severity()) == severity)
    }

    /// Severity lookup used when forwarding messages: anything outside the
    /// known values is logged at INFO.
    pub fn from_severity(severity: i64) -> Self {
        Self::try_from_severity(severity).unwrap_or(LogLevel::Info)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid log level '{0}' (expected one of trace, debug, info, warn, error, fatal)")]
pub struct ParseLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ALL_LEVELS
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> Self {
        level.severity()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LevelRepr {
    Severity(i64),
    Name(String),
}

impl TryFrom<LevelRepr> for LogLevel {
    type Error = ParseLevelError;

    fn try_from(repr: LevelRepr) -> Result<Self, ParseLevelError> {
        match repr {
            LevelRepr::Severity(n) => {
                LogLevel::try_from_severity(n).ok_or_else(|| ParseLevelError(n.to_string()))
            }
            LevelRepr::Name(name) => name.parse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogLevelChangedEvent {
    pub name: String,
    pub old_level: LogLevel,
    pub new_level: LogLevel,
}

/// Concrete logging library the registry forwards to.
pub trait LogBackend: Send + Sync {
    fn create_child(&self, name: &str, level: LogLevel) -> Box<dyn LogBackend>;
    fn log(&self, level: LogLevel, message: &str, args: &[serde_json::Value]);
    fn level(&self) -> LogLevel;
    fn set_level(&self, level: LogLevel);
}

/// Remote end that wants to hear about level changes.
pub trait LoggerClient: Send {
    fn on_log_level_changed(&self, event: &LogLevelChangedEvent);
}
