//! 快速打开：把文件搜索结果送进选择列表
//!
//! 每次输入先同步取消上一轮的 token，再发起新搜索；结果到达时再检查一次
//! token，被取消的批次直接丢弃，不会覆盖更新的结果。

use crate::core::{Command, Key, Keymap, Service};
use crate::kernel::services::ports::runtime::AsyncExecutor;
use crate::kernel::services::ports::search::{
    CancellationToken, FileSearch, FileSearchOptions, SearchError,
};
use crate::kernel::services::ports::settings::QuickOpenSettings;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickOpenItem {
    pub label: String,
    pub icon: &'static str,
    /// Parent directory relative to the workspace root.
    pub description: String,
    pub tooltip: String,
    pub uri: String,
    pub path: PathBuf,
}

impl QuickOpenItem {
    pub fn from_path(root: &Path, path: PathBuf) -> Self {
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let description = path
            .parent()
            .and_then(|parent| parent.strip_prefix(root).ok())
            .map(|rel| rel.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default();
        Self {
            icon: file_icon(&path),
            tooltip: path.display().to_string(),
            uri: format!("file://{}", path.display()),
            label,
            description,
            path,
        }
    }
}

fn file_icon(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("rs") => "rust",
        Some("md" | "markdown") => "markdown",
        Some("json") => "json",
        Some("toml" | "yaml" | "yml" | "ini") => "config",
        Some("js" | "ts" | "jsx" | "tsx") => "javascript",
        _ => "file",
    }
}

/// Receives one batch of items per finished search.
pub trait QuickOpenAcceptor: Send + Sync {
    fn accept(&self, items: Vec<QuickOpenItem>);
}

impl<F> QuickOpenAcceptor for F
where
    F: Fn(Vec<QuickOpenItem>) + Send + Sync,
{
    fn accept(&self, items: Vec<QuickOpenItem>) {
        self(items)
    }
}

/// The picker widget.
pub trait QuickOpenUi {
    fn open(&mut self);
    /// Re-runs the last query without re-reading input.
    fn refresh(&mut self);
    fn close(&mut self);
}

pub trait FileOpener {
    fn open_file(&self, path: &Path);
}

pub struct QuickOpenProvider {
    search: Arc<dyn FileSearch>,
    executor: Arc<dyn AsyncExecutor>,
    root: Option<PathBuf>,
    limit: usize,
    fuzzy_match: bool,
    show_ignored: bool,
    current: Option<CancellationToken>,
    /// Held while a batch is delivered and while a session is cancelled.
    delivery: Arc<Mutex<()>>,
    keymap: Keymap,
}

impl QuickOpenProvider {
    pub fn new(
        search: Arc<dyn FileSearch>,
        executor: Arc<dyn AsyncExecutor>,
        settings: &QuickOpenSettings,
    ) -> Self {
        Self {
            search,
            executor,
            root: None,
            limit: settings.limit,
            fuzzy_match: settings.fuzzy_match,
            show_ignored: settings.show_ignored_files,
            current: None,
            delivery: Arc::default(),
            keymap: Keymap::new(),
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn set_root(&mut self, root: Option<PathBuf>) {
        self.cancel();
        self.root = root;
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn show_ignored(&self) -> bool {
        self.show_ignored
    }

    pub fn current_token(&self) -> Option<&CancellationToken> {
        self.current.as_ref()
    }

    pub fn on_type(
        &mut self,
        query: &str,
        acceptor: Arc<dyn QuickOpenAcceptor>,
    ) -> CancellationToken {
        self.cancel();
        let token = CancellationToken::new();
        self.current = Some(token.clone());

        let query = query.trim();
        let Some(root) = self.root.clone().filter(|_| !query.is_empty()) else {
            acceptor.accept(Vec::new());
            return token;
        };

        let options = FileSearchOptions {
            root: root.clone(),
            fuzzy_match: self.fuzzy_match,
            limit: self.limit,
            use_git_ignore: !self.show_ignored,
        };
        let pending = self
            .search
            .find(query.to_string(), options, token.clone());
        let session = token.clone();
        let delivery = Arc::clone(&self.delivery);

        self.executor.spawn(Box::pin(async move {
            match pending.await {
                Ok(paths) => {
                    let items = to_items(&root, paths);
                    deliver(&delivery, &session, acceptor.as_ref(), items);
                }
                Err(SearchError::Cancelled(id)) => {
                    tracing::debug!(search = id, "search cancelled");
                }
                Err(e) => {
                    tracing::warn!(search = session.id(), error = %e, "quick open search failed");
                }
            }
        }));

        token
    }

    pub fn toggle_ignored_files(&mut self, ui: &mut dyn QuickOpenUi) {
        self.show_ignored = !self.show_ignored;
        tracing::debug!(show_ignored = self.show_ignored, "toggled ignored files");
        ui.refresh();
    }

    pub fn open(&self, item: &QuickOpenItem, opener: &dyn FileOpener) {
        opener.open_file(&item.path);
    }

    /// Blocks while a batch is being delivered, so nothing from the
    /// cancelled session reaches the acceptor afterwards.
    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            let _guard = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
            token.cancel();
        }
    }

    /// Returns false for commands the picker does not handle.
    pub fn handle_command(&mut self, command: &Command, ui: &mut dyn QuickOpenUi) -> bool {
        match command {
            Command::QuickOpen => ui.open(),
            Command::ToggleIgnoredFiles => self.toggle_ignored_files(ui),
            Command::CloseQuickOpen => {
                self.cancel();
                ui.close();
            }
            Command::Custom(_) => return false,
        }
        true
    }

    pub fn handle_key(&mut self, key: &Key, ui: &mut dyn QuickOpenUi) -> bool {
        match self.keymap.resolve(key).cloned() {
            Some(command) => self.handle_command(&command, ui),
            None => false,
        }
    }
}

/// Checks the token and hands the batch over under the delivery lock.
/// Acceptors must not call back into the provider.
fn deliver(
    delivery: &Mutex<()>,
    session: &CancellationToken,
    acceptor: &dyn QuickOpenAcceptor,
    items: Vec<QuickOpenItem>,
) {
    let _guard = delivery.lock().unwrap_or_else(PoisonError::into_inner);
    if session.is_cancelled() {
        tracing::debug!(search = session.id(), "dropping results of cancelled search");
        return;
    }
    acceptor.accept(items);
}

fn to_items(root: &Path, paths: Vec<PathBuf>) -> Vec<QuickOpenItem> {
    let mut seen = FxHashSet::default();
    paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .map(|path| QuickOpenItem::from_path(root, path))
        .collect()
}

impl Service for QuickOpenProvider {
    fn name(&self) -> &'static str {
        "QuickOpenProvider"
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/quick_open.rs"]
mod tests;
