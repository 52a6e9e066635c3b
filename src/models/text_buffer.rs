//! 文本缓冲区模型
//!
//! 职责：
//! - 文本存储（Rope）
//! - 光标位置与缩进选项
//! - 行列 ↔ 字符偏移映射，批量编辑

use crate::kernel::services::ports::formatting::{
    EndOfLine, TextEdit, TextModel, TextPosition,
};
use ropey::{Rope, RopeSlice};
use std::borrow::Cow;
use std::io::{self, Write};

/// 从 RopeSlice 获取字符串，优先零拷贝
pub fn slice_to_cow(slice: RopeSlice<'_>) -> Cow<'_, str> {
    match slice.as_str() {
        Some(s) => Cow::Borrowed(s),
        None => Cow::Owned(slice.to_string()),
    }
}

/// ropey 的 `unicode_lines` 换行集合
const LINE_BREAKS: [char; 7] = [
    '\n', '\r', '\u{0B}', '\u{0C}', '\u{85}', '\u{2028}', '\u{2029}',
];

/// 拆分行内容与行尾换行符
fn split_line_break(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        return (content, "\r\n");
    }
    match line.char_indices().next_back() {
        Some((idx, c)) if LINE_BREAKS.contains(&c) => line.split_at(idx),
        _ => (line, ""),
    }
}

fn strip_line_break(line: &str) -> &str {
    split_line_break(line).0
}

fn detect_eol(rope: &Rope) -> EndOfLine {
    for line in rope.lines() {
        let line = slice_to_cow(line);
        if line.ends_with("\r\n") {
            return EndOfLine::Crlf;
        }
        if line.ends_with('\n') {
            return EndOfLine::Lf;
        }
        if line.ends_with('\r') {
            return EndOfLine::Cr;
        }
    }
    EndOfLine::Lf
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentOptions {
    pub insert_spaces: bool,
    pub indent_size: u32,
    pub tab_size: u32,
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self {
            insert_spaces: true,
            indent_size: 4,
            tab_size: 4,
        }
    }
}

#[derive(Clone)]
pub struct TextBuffer {
    rope: Rope,
    cursor: TextPosition,
    eol: EndOfLine,
    indent: IndentOptions,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            cursor: TextPosition::default(),
            eol: EndOfLine::Lf,
            indent: IndentOptions::default(),
        }
    }

    pub fn from_text(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let eol = detect_eol(&rope);
        Self {
            rope,
            cursor: TextPosition::default(),
            eol,
            indent: IndentOptions::default(),
        }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// 流式写入到 Writer，避免大文件 OOM
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for chunk in self.rope.chunks() {
            writer.write_all(chunk.as_bytes())?;
        }
        Ok(())
    }

    pub fn indent_options(&self) -> IndentOptions {
        self.indent
    }

    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// 行内容的字符数（不含换行符）
    pub fn line_len(&self, row: usize) -> usize {
        if row >= self.rope.len_lines() {
            return 0;
        }
        let line = slice_to_cow(self.rope.line(row));
        strip_line_break(&line).chars().count()
    }

    pub fn pos_to_char(&self, pos: TextPosition) -> usize {
        let last = self.rope.len_lines().saturating_sub(1);
        let row = pos.line.min(last);
        self.rope.line_to_char(row) + pos.column.min(self.line_len(row))
    }

    fn clamp(&self, pos: TextPosition) -> TextPosition {
        let last = self.rope.len_lines().saturating_sub(1);
        let line = pos.line.min(last);
        TextPosition::new(line, pos.column.min(self.line_len(line)))
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextModel for TextBuffer {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_content(&self, line: usize) -> String {
        if line >= self.rope.len_lines() {
            return String::new();
        }
        let slice = slice_to_cow(self.rope.line(line));
        strip_line_break(&slice).to_string()
    }

    fn eol(&self) -> EndOfLine {
        self.eol
    }

    /// 统一整个缓冲区的换行符，行列位置保持不变
    fn set_eol(&mut self, eol: EndOfLine) {
        self.eol = eol;
        let line_count = self.rope.len_lines();
        let mut normalized = String::with_capacity(self.rope.len_bytes());
        for (row, line) in self.rope.lines().enumerate() {
            let line = slice_to_cow(line);
            let (content, line_break) = split_line_break(&line);
            normalized.push_str(content);
            if row + 1 >= line_count || line_break.is_empty() {
                continue;
            }
            // 只统一 CR/LF，其他 Unicode 换行保持原样
            match line_break {
                "\n" | "\r" | "\r\n" => normalized.push_str(eol.as_str()),
                other => normalized.push_str(other),
            }
        }
        self.rope = Rope::from_str(&normalized);
        self.cursor = self.clamp(self.cursor);
    }

    fn set_insert_spaces(&mut self, insert_spaces: bool) {
        self.indent.insert_spaces = insert_spaces;
    }

    fn set_indent_size(&mut self, size: u32) {
        self.indent.indent_size = size;
    }

    fn set_tab_size(&mut self, size: u32) {
        self.indent.tab_size = size;
    }

    fn cursor(&self) -> TextPosition {
        self.cursor
    }

    fn set_cursor(&mut self, pos: TextPosition) {
        self.cursor = self.clamp(pos);
    }

    fn apply_edits(&mut self, mut edits: Vec<TextEdit>) {
        // 从后往前应用，前面的偏移不受影响
        let mut resolved: Vec<(usize, usize, String)> = edits
            .drain(..)
            .map(|edit| {
                let start = self.pos_to_char(edit.range.start);
                let end = self.pos_to_char(edit.range.end).max(start);
                (start, end, edit.text)
            })
            .collect();
        resolved.sort_by(|a, b| b.0.cmp(&a.0));

        for (start, end, text) in resolved {
            if end > start {
                self.rope.remove(start..end);
            }
            if !text.is_empty() {
                self.rope.insert(start, &text);
            }
        }
        self.cursor = self.clamp(self.cursor);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/text_buffer.rs"]
mod tests;
