use super::cli::{ConfigError, LogLevelConfig};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;

const WATCHER_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Re-reads the level file whenever it changes on disk. Watches the parent
/// directory, so replacing the file through a rename is still seen.
pub struct LevelFileWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl LevelFileWatcher {
    pub fn spawn<F>(path: &Path, on_reload: F) -> Result<Self, notify::Error>
    where
        F: Fn(Result<LogLevelConfig, ConfigError>) + Send + 'static,
    {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let target = path.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                let Ok(event) = res else { return };
                if touches_level_file(&event, &target) {
                    on_reload(LogLevelConfig::load(&target));
                }
            },
            Config::default().with_poll_interval(WATCHER_POLL_INTERVAL),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %path.display(), "watching log level file");

        Ok(Self {
            _watcher: watcher,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn touches_level_file(event: &Event, target: &Path) -> bool {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return false;
    }
    event.paths.iter().any(|p| {
        p == target
            || p
                .canonicalize()
                .map(|canonical| canonical == target)
                .unwrap_or(false)
    })
}
