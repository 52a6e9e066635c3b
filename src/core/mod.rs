//! 核心框架模块
//!
//! - Service: 服务注册（显式注册代替依赖注入）
//! - Command: 命令系统
//! - Keybinding: 按键解析与键位表

pub mod command;
pub mod keybinding;
pub mod service;

pub use command::Command;
pub use keybinding::{parse_keybinding, Key, KeyCode, Keymap, Modifiers};
pub use service::{Service, ServiceError, ServiceRegistry};
