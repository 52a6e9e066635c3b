use super::runtime::BoxFuture;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("search {0} was cancelled")]
    Cancelled(u64),
    #[error("search task failed: {0}")]
    Task(String),
}

static SEARCH_ID: AtomicU64 = AtomicU64::new(0);

fn next_search_id() -> u64 {
    SEARCH_ID.fetch_add(1, Ordering::Relaxed)
}

/// Invalidates one in-flight search. Clones share the same flag.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            id: next_search_id(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSearchOptions {
    pub root: PathBuf,
    pub fuzzy_match: bool,
    pub limit: usize,
    pub use_git_ignore: bool,
}

/// File index collaborator: paths under `options.root` matching `query`.
pub trait FileSearch: Send + Sync {
    fn find(
        &self,
        query: String,
        options: FileSearchOptions,
        token: CancellationToken,
    ) -> BoxFuture<'static, Result<Vec<PathBuf>>>;
}
