//! 快速打开使用的文件搜索

pub mod file_search;
pub mod fuzzy;

pub use file_search::{walk_and_rank, WorkspaceFileSearch};
pub use fuzzy::{fuzzy_score, substring_score};
