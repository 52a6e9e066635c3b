//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod formatting;
pub mod logger;
pub mod quick_open;
pub mod search;
pub mod settings;

pub use formatting::{EditorConfigResolver, FormattingSync};
pub use logger::{LogLevelArgs, LogLevelConfig, LogServer, LoggerRegistry, TracingBackend};
pub use quick_open::{FileOpener, QuickOpenAcceptor, QuickOpenItem, QuickOpenProvider, QuickOpenUi};
pub use search::WorkspaceFileSearch;
pub use settings::{
    ensure_log_dir, ensure_settings_file, get_log_dir, get_settings_path, load_settings,
    load_settings_from,
};
