//! 格式化规则同步
//!
//! - editorconfig: `.editorconfig` 解析器与默认规则解析服务
//! - sync: 打开/聚焦/保存时把规则应用到文本模型

pub mod editorconfig;
pub mod sync;

pub use editorconfig::{resolve_rules, EditorConfigFile, EditorConfigResolver, CONFIG_FILE_NAME};
pub use sync::{apply_properties, apply_save_rules, ensure_final_newline, trim_trailing_whitespace, FormattingSync};
