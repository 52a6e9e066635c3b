//! 编辑器格式化规则同步
//!
//! 打开文件时解析规则并立即应用缩进和换行符；保存前只根据缓存的规则
//! 重新执行去除行尾空白和补全末尾换行。

use crate::core::Service;
use crate::kernel::services::ports::formatting::{
    IndentSize, IndentStyle, Rule, RuleResolver, RuleSet, TextEdit, TextModel, TextPosition,
    TextRange,
};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct FormattingSync {
    resolver: Arc<dyn RuleResolver>,
    cache: FxHashMap<PathBuf, RuleSet>,
}

impl FormattingSync {
    pub fn new(resolver: Arc<dyn RuleResolver>) -> Self {
        Self {
            resolver,
            cache: FxHashMap::default(),
        }
    }

    pub fn cached(&self, path: &Path) -> Option<&RuleSet> {
        self.cache.get(path)
    }

    /// Always re-resolves; the fresh rule set replaces the cached one.
    pub async fn on_open(&mut self, path: &Path, model: Option<&mut dyn TextModel>) {
        let Some(model) = model else {
            tracing::debug!(path = %path.display(), "no text model, formatting sync skipped");
            return;
        };

        match self.resolver.resolve(path.to_path_buf()).await {
            Ok(rules) => {
                apply_properties(&rules, model);
                self.cache.insert(path.to_path_buf(), rules);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to resolve formatting rules");
            }
        }
    }

    pub async fn on_focus(&mut self, path: &Path, model: Option<&mut dyn TextModel>) {
        let Some(model) = model else {
            return;
        };
        if let Some(rules) = self.cache.get(path) {
            tracing::debug!(path = %path.display(), "applying cached formatting rules");
            apply_properties(rules, model);
            return;
        }
        self.on_open(path, Some(model)).await;
    }

    pub fn on_will_save(&self, path: &Path, model: Option<&mut dyn TextModel>) {
        let (Some(model), Some(rules)) = (model, self.cache.get(path)) else {
            return;
        };
        apply_save_rules(rules, model);
    }

    pub fn on_close(&mut self, path: &Path) {
        self.cache.remove(path);
    }
}

impl Service for FormattingSync {
    fn name(&self) -> &'static str {
        "FormattingSync"
    }
}

/// 打开时应用：缩进风格、缩进宽度、tab 宽度、换行符
pub fn apply_properties(rules: &RuleSet, model: &mut dyn TextModel) {
    if let Rule::Value(style) = rules.indent_style {
        model.set_insert_spaces(style == IndentStyle::Space);
    }

    match rules.indent_size {
        Rule::Value(IndentSize::Columns(n)) => model.set_indent_size(n),
        Rule::Value(IndentSize::Tab) => {
            if let Rule::Value(width) = rules.tab_width {
                model.set_indent_size(width);
            }
        }
        Rule::Absent | Rule::Unset => {}
    }

    if let Some(width) = rules.effective_tab_width() {
        model.set_tab_size(width);
    }

    if let Rule::Value(eol) = rules.end_of_line {
        if model.eol() != eol {
            model.set_eol(eol);
        }
    }
}

/// 保存前应用：去除行尾空白、补全末尾换行
pub fn apply_save_rules(rules: &RuleSet, model: &mut dyn TextModel) {
    let trim = rules.trims_trailing_whitespace();
    if trim {
        trim_trailing_whitespace(model);
    }
    if rules.inserts_final_newline() {
        ensure_final_newline(model, trim);
    }
}

fn trailing_whitespace(model: &dyn TextModel, line: usize) -> Option<(TextRange, String)> {
    let content = model.line_content(line);
    let total = content.chars().count();
    let kept_text = content.trim_end_matches([' ', '\t']);
    let kept = kept_text.chars().count();
    (kept < total).then(|| {
        (
            TextRange::new(TextPosition::new(line, kept), TextPosition::new(line, total)),
            kept_text.to_string(),
        )
    })
}

pub fn trim_trailing_whitespace(model: &mut dyn TextModel) {
    let edits: Vec<TextEdit> = (0..model.line_count())
        .filter_map(|line| trailing_whitespace(&*model, line))
        .map(|(range, _)| TextEdit::delete(range))
        .collect();
    if edits.is_empty() {
        return;
    }
    let cursor = model.cursor();
    model.apply_edits(edits);
    model.set_cursor(cursor);
}

/// Appends the model's line ending when the last line is non-empty. With
/// `trim_last_line` the last line's trailing whitespace goes first, in the
/// same edit.
pub fn ensure_final_newline(model: &mut dyn TextModel, trim_last_line: bool) {
    let last = model.line_count().saturating_sub(1);
    let eol = model.eol().as_str();

    let edit = match trailing_whitespace(model, last).filter(|_| trim_last_line) {
        Some((range, kept)) if kept.is_empty() => TextEdit::delete(range),
        Some((range, _)) => TextEdit {
            range,
            text: eol.to_string(),
        },
        None => {
            let content = model.line_content(last);
            if content.is_empty() {
                return;
            }
            TextEdit::insert(TextPosition::new(last, content.chars().count()), eol)
        }
    };

    let cursor = model.cursor();
    model.apply_edits(vec![edit]);
    model.set_cursor(cursor);
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/formatting/sync.rs"]
mod tests;
