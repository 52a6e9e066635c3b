//! 工作区文件搜索（快速打开的默认数据源）
//!
//! 在阻塞线程上遍历工作区，按模糊/子串分数排序；每处理一个条目都检查取消标志。

use super::fuzzy::{fuzzy_score, substring_score};
use crate::kernel::services::ports::runtime::BoxFuture;
use crate::kernel::services::ports::search::{
    CancellationToken, FileSearch, FileSearchOptions, Result, SearchError,
};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, Copy)]
pub struct WorkspaceFileSearch;

impl FileSearch for WorkspaceFileSearch {
    fn find(
        &self,
        query: String,
        options: FileSearchOptions,
        token: CancellationToken,
    ) -> BoxFuture<'static, Result<Vec<PathBuf>>> {
        Box::pin(async move {
            tokio::task::spawn_blocking(move || walk_and_rank(&query, &options, &token))
                .await
                .map_err(|e| SearchError::Task(e.to_string()))?
        })
    }
}

fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let key = rel.to_string_lossy().replace('\\', "/");
    (!key.is_empty()).then_some(key)
}

pub fn walk_and_rank(
    query: &str,
    options: &FileSearchOptions,
    token: &CancellationToken,
) -> Result<Vec<PathBuf>> {
    // Dot-files stay hidden either way; the toggle only covers ignore files.
    let respect_ignores = options.use_git_ignore;
    let walker = WalkBuilder::new(&options.root)
        .hidden(true)
        .git_ignore(respect_ignores)
        .git_global(respect_ignores)
        .git_exclude(respect_ignores)
        .ignore(respect_ignores)
        .parents(respect_ignores)
        .require_git(false)
        .filter_entry(|entry| entry.file_name() != ".git")
        .build();

    let mut ranked: Vec<(u32, String, PathBuf)> = Vec::new();
    for entry in walker {
        if token.is_cancelled() {
            return Err(SearchError::Cancelled(token.id()));
        }
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Some(key) = relative_key(&options.root, entry.path()) else {
            continue;
        };
        let score = if options.fuzzy_match {
            fuzzy_score(query, &key)
        } else {
            substring_score(query, &key)
        };
        if let Some(score) = score {
            ranked.push((score, key, entry.into_path()));
        }
    }

    if token.is_cancelled() {
        return Err(SearchError::Cancelled(token.id()));
    }

    ranked.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then_with(|| a.1.len().cmp(&b.1.len()))
            .then_with(|| a.1.cmp(&b.1))
    });
    ranked.truncate(options.limit);

    tracing::debug!(query, results = ranked.len(), "file search finished");
    Ok(ranked.into_iter().map(|(_, _, path)| path).collect())
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/file_search.rs"]
mod tests;
