//! zcode-adapters - 编辑器集成适配器库
//!
//! 模块结构：
//! - core: 核心框架（Service, Command, Keybinding）
//! - kernel: 服务端口、适配器（日志级别、格式化规则、快速打开）与服务宿主
//! - models: 数据模型（TextBuffer）

pub mod core;
pub mod kernel;
pub mod models;
