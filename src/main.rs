use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use zcode_adapters::kernel::services::adapters::logger::{
    spawn_line_reader, LevelFileWatcher, LogLevelArgs, LogServer, LoggerRegistry, ServerEvent,
    TracingBackend, ROOT_LOGGER_NAME,
};
use zcode_adapters::kernel::services::adapters::{load_settings, load_settings_from};
use zcode_adapters::kernel::KernelServiceHost;

mod logging;

/// Log level server speaking JSON lines over stdin/stdout.
#[derive(Debug, Parser)]
#[command(name = "zcode-log-server", version)]
struct Cli {
    #[command(flatten)]
    levels: LogLevelArgs,

    /// Settings file (defaults to <cache>/.zcode/adapters.json)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli
        .levels
        .resolve()
        .context("invalid log level configuration")?;

    let settings = match &cli.settings {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    };
    let logging = logging::init(&settings);
    if logging.is_none() {
        eprintln!("zcode-log-server: file logging unavailable");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let mut host = KernelServiceHost::new(Arc::new(runtime.handle().clone()));

    let root_level = config.level_for(ROOT_LOGGER_NAME);
    let mut registry = LoggerRegistry::new(
        Box::new(TracingBackend::new(ROOT_LOGGER_NAME, root_level)),
        config,
    );
    host.context().wire_logger_watcher(&mut registry);
    let mut server = LogServer::new(registry);

    let (tx, rx) = mpsc::channel();
    let _level_file = cli.levels.log_level_file.as_deref().and_then(|path| {
        let tx = tx.clone();
        LevelFileWatcher::spawn(path, move |reloaded| {
            let _ = tx.send(ServerEvent::LevelFileChanged(reloaded));
        })
        .map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "log level file will not be reloaded");
        })
        .ok()
    });
    let _reader = spawn_line_reader(BufReader::new(io::stdin()), tx);

    tracing::info!(
        root = %root_level,
        log_dir = ?logging.as_ref().map(|guard| guard.log_dir()),
        "log server started"
    );
    let stdout = io::stdout();
    let mut out = stdout.lock();
    server
        .run_with(rx, &mut out, || {
            host.pump();
        })
        .context("failed to write response")?;
    Ok(())
}
