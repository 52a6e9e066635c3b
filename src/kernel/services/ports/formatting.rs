//! 格式化规则契约
//!
//! - `RuleSet`: 单个文件解析后的格式化规则
//! - `TextModel`: 规则作用的文本模型（缩进选项、换行符、编辑）
//! - `RuleResolver`: 按路径解析规则的异步服务

use super::runtime::BoxFuture;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FormattingError>;

#[derive(Debug, Error)]
pub enum FormattingError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("rule resolution task failed: {0}")]
    Task(String),
}

/// A single formatting property.
///
/// `Unset` is the explicit `unset` value and must never trigger an edit;
/// `Absent` means no matching section mentioned the property at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rule<T> {
    #[default]
    Absent,
    Unset,
    Value(T),
}

impl<T> Rule<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Rule::Value(v) => Some(v),
            Rule::Absent | Rule::Unset => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Rule::Unset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Tab,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentSize {
    Columns(u32),
    /// `indent_size = tab`: follow `tab_width`.
    Tab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndOfLine {
    #[default]
    Lf,
    Crlf,
    Cr,
}

impl EndOfLine {
    pub fn as_str(self) -> &'static str {
        match self {
            EndOfLine::Lf => "\n",
            EndOfLine::Crlf => "\r\n",
            EndOfLine::Cr => "\r",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleSet {
    pub indent_style: Rule<IndentStyle>,
    pub indent_size: Rule<IndentSize>,
    pub tab_width: Rule<u32>,
    pub end_of_line: Rule<EndOfLine>,
    pub trim_trailing_whitespace: Rule<bool>,
    pub insert_final_newline: Rule<bool>,
}

impl RuleSet {
    /// Applies one `key = value` pair. Keys and values are case-insensitive;
    /// unknown keys and malformed values leave the rule set untouched.
    /// Returns whether the pair was recognised.
    pub fn set_property(&mut self, key: &str, value: &str) -> bool {
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim().to_ascii_lowercase();
        let unset = value == "unset";

        match key.as_str() {
            "indent_style" => {
                let rule = match value.as_str() {
                    _ if unset => Rule::Unset,
                    "tab" => Rule::Value(IndentStyle::Tab),
                    "space" => Rule::Value(IndentStyle::Space),
                    _ => return false,
                };
                self.indent_style = rule;
            }
            "indent_size" => {
                let rule = match value.as_str() {
                    _ if unset => Rule::Unset,
                    "tab" => Rule::Value(IndentSize::Tab),
                    other => match parse_width(other) {
                        Some(n) => Rule::Value(IndentSize::Columns(n)),
                        None => return false,
                    },
                };
                self.indent_size = rule;
            }
            "tab_width" => {
                let rule = if unset {
                    Rule::Unset
                } else {
                    match parse_width(&value) {
                        Some(n) => Rule::Value(n),
                        None => return false,
                    }
                };
                self.tab_width = rule;
            }
            "end_of_line" => {
                let rule = match value.as_str() {
                    _ if unset => Rule::Unset,
                    "lf" => Rule::Value(EndOfLine::Lf),
                    "crlf" => Rule::Value(EndOfLine::Crlf),
                    "cr" => Rule::Value(EndOfLine::Cr),
                    _ => return false,
                };
                self.end_of_line = rule;
            }
            "trim_trailing_whitespace" => match parse_flag(&value) {
                Some(rule) => self.trim_trailing_whitespace = rule,
                None => return false,
            },
            "insert_final_newline" => match parse_flag(&value) {
                Some(rule) => self.insert_final_newline = rule,
                None => return false,
            },
            _ => return false,
        }
        true
    }

    /// Tab width after editorconfig defaulting: an explicit `tab_width`
    /// wins, otherwise a numeric `indent_size` doubles as the tab width.
    pub fn effective_tab_width(&self) -> Option<u32> {
        match (&self.tab_width, &self.indent_size) {
            (Rule::Value(n), _) => Some(*n),
            (Rule::Unset, _) => None,
            (Rule::Absent, Rule::Value(IndentSize::Columns(n))) => Some(*n),
            (Rule::Absent, _) => None,
        }
    }

    pub fn trims_trailing_whitespace(&self) -> bool {
        self.trim_trailing_whitespace == Rule::Value(true)
    }

    pub fn inserts_final_newline(&self) -> bool {
        self.insert_final_newline == Rule::Value(true)
    }
}

fn parse_width(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|n| *n > 0)
}

fn parse_flag(value: &str) -> Option<Rule<bool>> {
    match value {
        "unset" => Some(Rule::Unset),
        "true" => Some(Rule::Value(true)),
        "false" => Some(Rule::Value(false)),
        _ => None,
    }
}

/// Zero-based line / character position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TextPosition {
    pub line: usize,
    pub column: usize,
}

impl TextPosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: TextPosition,
    pub end: TextPosition,
}

impl TextRange {
    pub fn new(start: TextPosition, end: TextPosition) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub text: String,
}

impl TextEdit {
    pub fn delete(range: TextRange) -> Self {
        Self {
            range,
            text: String::new(),
        }
    }

    pub fn insert(at: TextPosition, text: impl Into<String>) -> Self {
        Self {
            range: TextRange::new(at, at),
            text: text.into(),
        }
    }
}

/// Editor-side text model the formatting rules are applied to.
pub trait TextModel {
    fn line_count(&self) -> usize;
    /// Line content without its line break.
    fn line_content(&self, line: usize) -> String;
    fn eol(&self) -> EndOfLine;
    fn set_eol(&mut self, eol: EndOfLine);
    fn set_insert_spaces(&mut self, insert_spaces: bool);
    fn set_indent_size(&mut self, size: u32);
    fn set_tab_size(&mut self, size: u32);
    fn cursor(&self) -> TextPosition;
    fn set_cursor(&mut self, pos: TextPosition);
    /// Edits must not overlap; they are applied as one batch.
    fn apply_edits(&mut self, edits: Vec<TextEdit>);
}

pub trait RuleResolver: Send + Sync {
    fn resolve(&self, path: PathBuf) -> BoxFuture<'static, Result<RuleSet>>;
}
