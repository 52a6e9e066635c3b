//! 日志器注册表
//!
//! - 根日志器启动时创建，子日志器按需创建且不会移除
//! - 级别变化时恰好发出一次通知：先客户端，再本地 watcher

use super::cli::LogLevelConfig;
use crate::core::Service;
use crate::kernel::services::ports::logger::{
    LogBackend, LogLevel, LogLevelChangedEvent, LoggerClient,
};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;

pub const ROOT_LOGGER_NAME: &str = "root";

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoggerError {
    #[error("no such logger: '{0}'")]
    NoSuchLogger(String),
    #[error("logger name must not be empty")]
    EmptyName,
}

type ChangeListener = Box<dyn Fn(&LogLevelChangedEvent) + Send>;

/// 进程内的级别变化观察者
#[derive(Default)]
pub struct LoggerWatcher {
    listeners: Vec<ChangeListener>,
    subscribers: Vec<Sender<LogLevelChangedEvent>>,
}

impl LoggerWatcher {
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: Fn(&LogLevelChangedEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn subscribe(&mut self) -> Receiver<LogLevelChangedEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn fire(&mut self, event: &LogLevelChangedEvent) {
        for listener in &self.listeners {
            listener(event);
        }
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

struct LoggerEntry {
    level: LogLevel,
    parent: Option<String>,
    backend: Box<dyn LogBackend>,
}

pub struct LoggerRegistry {
    loggers: FxHashMap<String, LoggerEntry>,
    config: LogLevelConfig,
    client: Option<Box<dyn LoggerClient>>,
    watcher: LoggerWatcher,
}

impl LoggerRegistry {
    /// `backend` becomes the root logger; its level is the root override
    /// from `config` or the configured default.
    pub fn new(backend: Box<dyn LogBackend>, config: LogLevelConfig) -> Self {
        let root_level = config.level_for(ROOT_LOGGER_NAME);
        backend.set_level(root_level);

        let mut loggers = FxHashMap::default();
        loggers.insert(
            ROOT_LOGGER_NAME.to_string(),
            LoggerEntry {
                level: root_level,
                parent: None,
                backend,
            },
        );
        Self {
            loggers,
            config,
            client: None,
            watcher: LoggerWatcher::default(),
        }
    }

    pub fn root_name(&self) -> &'static str {
        ROOT_LOGGER_NAME
    }

    pub fn config(&self) -> &LogLevelConfig {
        &self.config
    }

    pub fn set_client(&mut self, client: Box<dyn LoggerClient>) {
        self.client = Some(client);
    }

    pub fn clear_client(&mut self) {
        self.client = None;
    }

    pub fn watcher(&mut self) -> &mut LoggerWatcher {
        &mut self.watcher
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loggers.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.loggers.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn parent(&self, name: &str) -> Result<Option<&str>> {
        self.entry(name).map(|entry| entry.parent.as_deref())
    }

    /// 已存在的名字视为成功（不重复创建）
    pub fn create(&mut self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(LoggerError::EmptyName);
        }
        if self.loggers.contains_key(name) {
            return Ok(());
        }

        let root = self.entry(ROOT_LOGGER_NAME)?;
        let level = self.config.override_for(name).unwrap_or(root.level);
        let backend = root.backend.create_child(name, level);
        tracing::debug!(logger = name, %level, "child logger created");

        self.loggers.insert(
            name.to_string(),
            LoggerEntry {
                level,
                parent: Some(ROOT_LOGGER_NAME.to_string()),
                backend,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<LogLevel> {
        self.entry(name).map(|entry| entry.level)
    }

    pub fn set(&mut self, name: &str, level: LogLevel) -> Result<()> {
        let entry = self
            .loggers
            .get_mut(name)
            .ok_or_else(|| LoggerError::NoSuchLogger(name.to_string()))?;
        let old_level = entry.level;
        if old_level == level {
            return Ok(());
        }

        entry.level = level;
        entry.backend.set_level(level);
        tracing::info!(logger = name, from = %old_level, to = %level, "log level changed");

        let event = LogLevelChangedEvent {
            name: name.to_string(),
            old_level,
            new_level: level,
        };
        if let Some(client) = &self.client {
            client.on_log_level_changed(&event);
        }
        self.watcher.fire(&event);
        Ok(())
    }

    /// Out-of-range severities are logged at INFO.
    pub fn log(&self, name: &str, severity: i64, message: &str, args: &[Value]) -> Result<()> {
        let entry = self.entry(name)?;
        entry
            .backend
            .log(LogLevel::from_severity(severity), message, args);
        Ok(())
    }

    /// 级别文件变化后重新应用：每个日志器移动到新配置的级别
    pub fn apply_config(&mut self, config: LogLevelConfig) {
        self.config = config;
        for name in self.names() {
            let level = self.config.level_for(&name);
            if let Err(e) = self.set(&name, level) {
                tracing::warn!(logger = %name, error = %e, "failed to apply log level");
            }
        }
    }

    fn entry(&self, name: &str) -> Result<&LoggerEntry> {
        self.loggers
            .get(name)
            .ok_or_else(|| LoggerError::NoSuchLogger(name.to_string()))
    }
}

impl Service for LoggerRegistry {
    fn name(&self) -> &'static str {
        "LoggerRegistry"
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/logger/registry.rs"]
mod tests;
