//! Service ports: traits + data contracts.

pub mod formatting;
pub mod logger;
pub mod runtime;
pub mod search;
pub mod settings;

pub use formatting::{
    EndOfLine, FormattingError, IndentSize, IndentStyle, Rule, RuleResolver, RuleSet, TextEdit,
    TextModel, TextPosition, TextRange,
};
pub use logger::{
    LogBackend, LogLevel, LogLevelChangedEvent, LoggerClient, ParseLevelError, ALL_LEVELS,
};
pub use runtime::{AsyncExecutor, BoxFuture};
pub use search::{CancellationToken, FileSearch, FileSearchOptions, SearchError};
pub use settings::{KeybindingRule, LoggingSettings, QuickOpenSettings, Settings};
