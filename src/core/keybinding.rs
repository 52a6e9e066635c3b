//! 按键解析与键位表
//!
//! `"ctrl+alt+p"` 形式的字符串解析为 `Key`，再由 `Keymap` 映射到 `Command`。

use super::command::Command;
use crate::kernel::services::ports::settings::KeybindingRule;
use bitflags::bitflags;
use rustc_hash::FxHashMap;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const CTRL = 1;
        const SHIFT = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Esc,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl Key {
    pub fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }
}

pub fn parse_keybinding(value: &str) -> Option<Key> {
    let mut modifiers = Modifiers::empty();
    let mut key_part: Option<&str> = None;
    for part in value.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= Modifiers::CTRL,
            "shift" => modifiers |= Modifiers::SHIFT,
            "alt" | "option" => modifiers |= Modifiers::ALT,
            "super" | "meta" | "cmd" | "command" => modifiers |= Modifiers::SUPER,
            _ => key_part = Some(part),
        }
    }
    let mut code = parse_key_code(key_part?)?;
    if let KeyCode::Char(ch) = code {
        if ch.is_ascii_uppercase() {
            code = KeyCode::Char(ch.to_ascii_lowercase());
            modifiers |= Modifiers::SHIFT;
        }
    }
    Some(Key::new(code, modifiers))
}

fn parse_key_code(value: &str) -> Option<KeyCode> {
    let v = value.trim();
    if v.is_empty() {
        return None;
    }

    let v_lc = v.to_ascii_lowercase();
    let code = match v_lc.as_str() {
        "enter" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "esc" | "escape" => KeyCode::Esc,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        _ if v_lc.len() > 1 && v_lc.starts_with('f') => {
            let n = v_lc.strip_prefix('f')?.parse::<u8>().ok()?;
            KeyCode::F(n)
        }
        _ => {
            let mut chars = v.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(ch)
        }
    };

    Some(code)
}

const DEFAULT_BINDINGS: &[(&str, Command)] = &[
    ("ctrl+p", Command::QuickOpen),
    ("ctrl+alt+p", Command::ToggleIgnoredFiles),
    ("esc", Command::CloseQuickOpen),
];

pub struct Keymap {
    bindings: FxHashMap<Key, Command>,
}

impl Keymap {
    pub fn new() -> Self {
        let mut bindings = FxHashMap::default();
        for (key, command) in DEFAULT_BINDINGS {
            if let Some(key) = parse_keybinding(key) {
                bindings.insert(key, command.clone());
            }
        }
        Self { bindings }
    }

    /// 用户键位覆盖默认键位；无法解析的规则被忽略
    pub fn with_rules(rules: &[KeybindingRule]) -> Self {
        let mut keymap = Self::new();
        for rule in rules {
            match parse_keybinding(&rule.key) {
                Some(key) => keymap.bind(key, Command::from_name(&rule.command)),
                None => tracing::warn!(key = %rule.key, "ignoring unparsable keybinding"),
            }
        }
        keymap
    }

    pub fn bind(&mut self, key: Key, command: Command) {
        self.bindings.insert(key, command);
    }

    pub fn resolve(&self, key: &Key) -> Option<&Command> {
        self.bindings.get(key)
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/core/keybinding.rs"]
mod tests;
