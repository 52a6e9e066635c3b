//! 命令系统：语义命令定义
//!
//! - Command: 语义命令枚举（不关心具体按键）
//! - 自定义命令以 `Custom` 扩展

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    // ==================== 快速打开 ====================
    QuickOpen,
    ToggleIgnoredFiles,
    CloseQuickOpen,

    // ==================== 扩展点 ====================
    Custom(String),
}

impl Command {
    pub fn name(&self) -> &str {
        match self {
            Command::QuickOpen => "quickOpen",
            Command::ToggleIgnoredFiles => "quickOpen.toggleIgnoredFiles",
            Command::CloseQuickOpen => "quickOpen.close",
            Command::Custom(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "quickOpen" => Command::QuickOpen,
            "quickOpen.toggleIgnoredFiles" => Command::ToggleIgnoredFiles,
            "quickOpen.close" => Command::CloseQuickOpen,
            other => Command::Custom(other.to_string()),
        }
    }
}
