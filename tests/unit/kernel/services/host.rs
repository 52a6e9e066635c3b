use super::*;
use crate::core::ServiceError;
use crate::kernel::services::adapters::logger::{LogLevelConfig, TracingBackend};
use crate::kernel::services::ports::logger::{LogLevel, LogLevelChangedEvent};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Runs every task to completion on a throwaway runtime.
#[derive(Default)]
struct BlockingExecutor {
    spawned: AtomicUsize,
}

impl AsyncExecutor for BlockingExecutor {
    fn spawn(&self, task: BoxFuture<'static>) {
        self.spawned.fetch_add(1, Ordering::SeqCst);
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(task);
    }
}

fn registry() -> LoggerRegistry {
    LoggerRegistry::new(
        Box::new(TracingBackend::new("root", LogLevel::Info)),
        LogLevelConfig::default(),
    )
}

#[test]
fn test_logger_changes_reach_bus() {
    let mut host = KernelServiceHost::new(Arc::new(BlockingExecutor::default()));
    host.register(registry()).unwrap();
    host.wire_registered_logger().unwrap();

    let logger = host.get_mut::<LoggerRegistry>().unwrap();
    logger.create("search").unwrap();
    logger.set("search", LogLevel::Debug).unwrap();
    logger.set("search", LogLevel::Debug).unwrap();

    assert_eq!(
        host.try_recv().unwrap(),
        KernelMessage::LogLevelChanged(LogLevelChangedEvent {
            name: "search".to_string(),
            old_level: LogLevel::Info,
            new_level: LogLevel::Debug,
        })
    );
    assert!(host.try_recv().is_err());
}

#[test]
fn test_wire_without_registry_fails() {
    let mut host = KernelServiceHost::new(Arc::new(BlockingExecutor::default()));
    assert!(matches!(
        host.wire_registered_logger(),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn test_file_opener_and_pump() {
    let mut host = KernelServiceHost::new(Arc::new(BlockingExecutor::default()));
    let opener = host.context().file_opener();
    opener.open_file(Path::new("/ws/a.rs"));
    opener.open_file(Path::new("/ws/b.rs"));

    assert_eq!(
        host.try_recv().unwrap(),
        KernelMessage::OpenFile(PathBuf::from("/ws/a.rs"))
    );
    assert_eq!(host.pump(), 1);
    assert_eq!(host.pump(), 0);
}

#[test]
fn test_context_spawns_on_executor() {
    let executor = Arc::new(BlockingExecutor::default());
    let host = KernelServiceHost::new(executor.clone());
    let context = host.context();
    let ran = Arc::new(AtomicUsize::new(0));

    let counter = ran.clone();
    context.spawn_future(async move {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let sender = context.clone();
    context.spawn(Box::pin(async move {
        sender.send(KernelMessage::OpenFile(PathBuf::from("/x")));
    }));

    assert_eq!(ran.load(Ordering::SeqCst), 1);
    assert_eq!(executor.spawned.load(Ordering::SeqCst), 2);
    drop(context);
    let mut host = host;
    assert_eq!(host.pump(), 1);
}
