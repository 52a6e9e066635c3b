//! `.editorconfig` 解析与规则合并
//!
//! - 从文件所在目录向上查找，遇到 `root = true` 停止
//! - 远处的文件先应用，近处覆盖远处；同一文件内后面的节覆盖前面的节
//! - glob 语法：`*` `**` `?` `[abc]` `[!abc]` `{a,b}` `{n..m}`

use crate::kernel::services::ports::formatting::{
    FormattingError, Result, RuleResolver, RuleSet,
};
use crate::kernel::services::ports::runtime::BoxFuture;
use regex::Regex;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".editorconfig";

struct Glob {
    regex: Regex,
    ranges: Vec<(i64, i64)>,
}

impl Glob {
    fn new(pattern: &str, dir: &str) -> Option<Self> {
        let (prefix, body) = if pattern.contains('/') {
            ("", pattern.strip_prefix('/').unwrap_or(pattern))
        } else {
            ("(?:.*/)?", pattern)
        };

        let mut re = String::from("^");
        re.push_str(&regex::escape(dir.trim_end_matches('/')));
        re.push('/');
        re.push_str(prefix);
        let mut ranges = Vec::new();
        translate(body, &mut re, &mut ranges);
        re.push('$');

        match Regex::new(&re) {
            Ok(regex) => Some(Self { regex, ranges }),
            Err(e) => {
                tracing::debug!(pattern, error = %e, "skipping unsupported editorconfig glob");
                None
            }
        }
    }

    fn is_match(&self, path: &str) -> bool {
        let Some(caps) = self.regex.captures(path) else {
            return false;
        };
        self.ranges.iter().enumerate().all(|(i, (lo, hi))| {
            caps.get(i + 1)
                .and_then(|m| m.as_str().parse::<i64>().ok())
                .is_some_and(|n| n >= *lo && n <= *hi)
        })
    }
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

fn find_closing_brace(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn split_alternatives(inner: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

fn parse_range(inner: &str) -> Option<(i64, i64)> {
    let (lo, hi) = inner.split_once("..")?;
    let lo = lo.trim().parse::<i64>().ok()?;
    let hi = hi.trim().parse::<i64>().ok()?;
    Some((lo.min(hi), lo.max(hi)))
}

fn translate(glob: &str, out: &mut String, ranges: &mut Vec<(i64, i64)>) {
    let chars: Vec<char> = glob.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                push_literal(out, chars[i + 1]);
                i += 2;
                continue;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                out.push_str(".*");
                i += 2;
                continue;
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => {
                let close = chars[i + 1..].iter().position(|c| *c == ']').map(|p| p + i + 1);
                match close {
                    Some(j) if j > i + 1 && !chars[i + 1..j].contains(&'/') => {
                        let mut class = &chars[i + 1..j];
                        out.push('[');
                        if class.first() == Some(&'!') {
                            out.push('^');
                            class = &class[1..];
                        }
                        for &c in class {
                            if matches!(c, '\\' | '[' | ']' | '^' | '&' | '~') {
                                out.push('\\');
                            }
                            out.push(c);
                        }
                        out.push(']');
                        i = j + 1;
                        continue;
                    }
                    _ => push_literal(out, '['),
                }
            }
            '{' => match find_closing_brace(&chars, i) {
                Some(j) => {
                    let inner: String = chars[i + 1..j].iter().collect();
                    if let Some(range) = parse_range(&inner) {
                        out.push_str("([+-]?[0-9]+)");
                        ranges.push(range);
                    } else {
                        let alternatives = split_alternatives(&inner);
                        if alternatives.len() > 1 {
                            out.push_str("(?:");
                            for (k, alt) in alternatives.iter().enumerate() {
                                if k > 0 {
                                    out.push('|');
                                }
                                translate(alt, out, ranges);
                            }
                            out.push(')');
                        } else {
                            out.push_str("\\{");
                            translate(&inner, out, ranges);
                            out.push_str("\\}");
                        }
                    }
                    i = j + 1;
                    continue;
                }
                None => push_literal(out, '{'),
            },
            c => push_literal(out, c),
        }
        i += 1;
    }
}

struct Section {
    glob: Option<Glob>,
    properties: Vec<(String, String)>,
}

pub struct EditorConfigFile {
    root: bool,
    sections: Vec<Section>,
}

impl EditorConfigFile {
    /// `dir` is the directory holding the file; section globs are anchored
    /// there.
    pub fn parse(text: &str, dir: &Path) -> Self {
        let dir = normalize(dir);
        let mut root = false;
        let mut sections: Vec<Section> = Vec::new();

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                sections.push(Section {
                    glob: Glob::new(header, &dir),
                    properties: Vec::new(),
                });
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            match sections.last_mut() {
                Some(section) => section.properties.push((key, value)),
                None if key == "root" => root = value.eq_ignore_ascii_case("true"),
                None => {}
            }
        }

        Self { root, sections }
    }

    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Applies every section whose glob matches `path`, in file order.
    pub fn apply(&self, path: &str, rules: &mut RuleSet) {
        for section in &self.sections {
            let Some(glob) = &section.glob else { continue };
            if !glob.is_match(path) {
                continue;
            }
            for (key, value) in &section.properties {
                rules.set_property(key, value);
            }
        }
    }
}

fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// 同步解析：读取所有相关的 `.editorconfig` 并合并
pub fn resolve_rules(path: &Path) -> Result<RuleSet> {
    let path = absolute(path);
    let mut files = Vec::new();

    let mut dir = path.parent();
    while let Some(current) = dir {
        let candidate = current.join(CONFIG_FILE_NAME);
        match std::fs::read_to_string(&candidate) {
            Ok(text) => {
                let file = EditorConfigFile::parse(&text, current);
                let is_root = file.is_root();
                files.push(file);
                if is_root {
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(FormattingError::Io {
                    path: candidate,
                    source,
                })
            }
        }
        dir = current.parent();
    }

    let target = normalize(&path);
    let mut rules = RuleSet::default();
    for file in files.iter().rev() {
        file.apply(&target, &mut rules);
    }
    Ok(rules)
}

/// 基于磁盘 `.editorconfig` 的规则解析器，在阻塞线程池上读取文件
#[derive(Debug, Clone, Copy, Default)]
pub struct EditorConfigResolver;

impl RuleResolver for EditorConfigResolver {
    fn resolve(&self, path: PathBuf) -> BoxFuture<'static, Result<RuleSet>> {
        Box::pin(async move {
            tokio::task::spawn_blocking(move || resolve_rules(&path))
                .await
                .map_err(|e| FormattingError::Task(e.to_string()))?
        })
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/formatting/editorconfig.rs"]
mod tests;
