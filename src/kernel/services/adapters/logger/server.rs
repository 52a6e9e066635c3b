//! 日志服务主循环
//!
//! 所有输入（请求行、级别文件变化）汇入同一个通道，在单线程上依次处理。

use super::cli::{ConfigError, LogLevelConfig};
use super::protocol::{handle_line, ChannelClient};
use super::registry::LoggerRegistry;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

#[derive(Debug)]
pub enum ServerEvent {
    Request(String),
    LevelFileChanged(Result<LogLevelConfig, ConfigError>),
    Shutdown,
}

pub struct LogServer {
    registry: LoggerRegistry,
    notifications: Receiver<String>,
}

impl LogServer {
    /// Takes over the registry's client slot: level changes are written to
    /// the connected peer ahead of the response that caused them.
    pub fn new(mut registry: LoggerRegistry) -> Self {
        let (tx, rx) = mpsc::channel();
        registry.set_client(Box::new(ChannelClient::new(tx)));
        Self {
            registry,
            notifications: rx,
        }
    }

    pub fn registry(&self) -> &LoggerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut LoggerRegistry {
        &mut self.registry
    }

    pub fn handle(&mut self, event: ServerEvent) -> Vec<String> {
        let response = match event {
            ServerEvent::Request(line) => {
                let line = line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(handle_line(&mut self.registry, line))
                }
            }
            ServerEvent::LevelFileChanged(Ok(config)) => {
                tracing::info!(default = %config.default, "log level file reloaded");
                self.registry.apply_config(config);
                None
            }
            ServerEvent::LevelFileChanged(Err(e)) => {
                tracing::warn!(error = %e, "ignoring invalid log level file");
                None
            }
            ServerEvent::Shutdown => None,
        };

        let mut out: Vec<String> = self.notifications.try_iter().collect();
        out.extend(response);
        out
    }

    pub fn run<W: Write>(&mut self, events: Receiver<ServerEvent>, out: &mut W) -> io::Result<()> {
        self.run_with(events, out, || {})
    }

    /// Like `run`, calling `after_event` once each event's output is flushed.
    pub fn run_with<W, F>(
        &mut self,
        events: Receiver<ServerEvent>,
        out: &mut W,
        mut after_event: F,
    ) -> io::Result<()>
    where
        W: Write,
        F: FnMut(),
    {
        for event in events {
            let shutdown = matches!(event, ServerEvent::Shutdown);
            for line in self.handle(event) {
                writeln!(out, "{line}")?;
            }
            out.flush()?;
            after_event();
            if shutdown {
                break;
            }
        }
        tracing::info!("log server stopped");
        Ok(())
    }
}

/// 逐行读取请求；EOF 或读错误时发送 `Shutdown`
pub fn spawn_line_reader<R>(reader: R, tx: Sender<ServerEvent>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.send(ServerEvent::Request(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read request");
                    break;
                }
            }
        }
        let _ = tx.send(ServerEvent::Shutdown);
    })
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/logger/server.rs"]
mod tests;
