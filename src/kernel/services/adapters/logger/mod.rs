//! 日志级别服务
//!
//! - backend: tracing 后端
//! - cli: 启动参数与级别文件
//! - registry: 日志器注册表与级别变化通知
//! - protocol / server: JSON lines 客户端协议与主循环
//! - level_file: 级别文件热更新

pub mod backend;
pub mod cli;
pub mod level_file;
pub mod protocol;
pub mod registry;
pub mod server;

pub use backend::{format_message, TracingBackend};
pub use cli::{ConfigError, LogLevelArgs, LogLevelConfig};
pub use level_file::LevelFileWatcher;
pub use protocol::{handle_line, ChannelClient};
pub use registry::{LoggerError, LoggerRegistry, LoggerWatcher, ROOT_LOGGER_NAME};
pub use server::{spawn_line_reader, LogServer, ServerEvent};
