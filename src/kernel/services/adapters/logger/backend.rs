//! `tracing` 后端：把抽象日志级别映射到 tracing 事件
//!
//! tracing 没有 FATAL，按 ERROR 输出并附带 `fatal = true`。

use crate::kernel::services::ports::logger::{LogBackend, LogLevel};
use serde_json::Value;
use std::sync::atomic::{AtomicU8, Ordering};

const REMOTE_TARGET: &str = "zcode_adapters::remote";

pub struct TracingBackend {
    name: String,
    level: AtomicU8,
}

impl TracingBackend {
    pub fn new(name: impl Into<String>, level: LogLevel) -> Self {
        Self {
            name: name.into(),
            level: AtomicU8::new(level.severity()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level()
    }
}

impl LogBackend for TracingBackend {
    fn create_child(&self, name: &str, level: LogLevel) -> Box<dyn LogBackend> {
        Box::new(TracingBackend::new(name, level))
    }

    fn log(&self, level: LogLevel, message: &str, args: &[Value]) {
        if !self.enabled(level) {
            return;
        }
        let text = format_message(message, args);
        let logger = self.name.as_str();
        match level {
            LogLevel::Trace => tracing::trace!(target: REMOTE_TARGET, logger, "{}", text),
            LogLevel::Debug => tracing::debug!(target: REMOTE_TARGET, logger, "{}", text),
            LogLevel::Info => tracing::info!(target: REMOTE_TARGET, logger, "{}", text),
            LogLevel::Warn => tracing::warn!(target: REMOTE_TARGET, logger, "{}", text),
            LogLevel::Error => tracing::error!(target: REMOTE_TARGET, logger, "{}", text),
            LogLevel::Fatal => {
                tracing::error!(target: REMOTE_TARGET, logger, fatal = true, "{}", text)
            }
        }
    }

    fn level(&self) -> LogLevel {
        LogLevel::try_from_severity(i64::from(self.level.load(Ordering::Relaxed)))
            .unwrap_or_default()
    }

    fn set_level(&self, level: LogLevel) {
        self.level.store(level.severity(), Ordering::Relaxed);
    }
}

/// Message followed by its arguments, space separated; string arguments
/// are written raw, everything else as JSON.
pub fn format_message(message: &str, args: &[Value]) -> String {
    let mut out = String::from(message);
    for arg in args {
        out.push(' ');
        match arg {
            Value::String(s) => out.push_str(s),
            other => out.push_str(&other.to_string()),
        }
    }
    out
}
