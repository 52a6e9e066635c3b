use super::*;
use crate::kernel::services::adapters::search::WorkspaceFileSearch;
use crate::kernel::services::ports::runtime::BoxFuture;
use crate::kernel::services::ports::search::Result as SearchResult;
use std::fs;
use std::sync::Mutex;

fn create_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Queues spawned tasks so a test decides when each search completes.
#[derive(Default)]
struct ManualExecutor {
    tasks: Mutex<Vec<BoxFuture<'static>>>,
}

impl ManualExecutor {
    fn pending(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    /// Runs queued tasks, oldest first.
    fn run_all(&self, rt: &tokio::runtime::Runtime) {
        let tasks: Vec<_> = self.tasks.lock().unwrap().drain(..).collect();
        for task in tasks {
            rt.block_on(task);
        }
    }
}

impl AsyncExecutor for ManualExecutor {
    fn spawn(&self, task: BoxFuture<'static>) {
        self.tasks.lock().unwrap().push(task);
    }
}

/// Answers every query with `<root>/<query>.rs` twice, recording the options.
#[derive(Default)]
struct EchoSearch {
    requests: Mutex<Vec<(String, FileSearchOptions)>>,
}

impl FileSearch for EchoSearch {
    fn find(
        &self,
        query: String,
        options: FileSearchOptions,
        _token: CancellationToken,
    ) -> BoxFuture<'static, SearchResult<Vec<PathBuf>>> {
        let path = options.root.join(format!("{query}.rs"));
        self.requests.lock().unwrap().push((query, options));
        Box::pin(async move { Ok(vec![path.clone(), path]) })
    }
}

struct FailingSearch(SearchError);

impl FileSearch for FailingSearch {
    fn find(
        &self,
        _query: String,
        _options: FileSearchOptions,
        token: CancellationToken,
    ) -> BoxFuture<'static, SearchResult<Vec<PathBuf>>> {
        let err = match &self.0 {
            SearchError::Cancelled(_) => SearchError::Cancelled(token.id()),
            other => SearchError::Task(other.to_string()),
        };
        Box::pin(async move { Err(err) })
    }
}

type Batches = Arc<Mutex<Vec<Vec<QuickOpenItem>>>>;

fn recording_acceptor() -> (Arc<dyn QuickOpenAcceptor>, Batches) {
    let batches: Batches = Arc::default();
    let sink = batches.clone();
    let acceptor: Arc<dyn QuickOpenAcceptor> = Arc::new(move |items: Vec<QuickOpenItem>| {
        sink.lock().unwrap().push(items);
    });
    (acceptor, batches)
}

#[derive(Default)]
struct RecordingUi {
    calls: Vec<&'static str>,
}

impl QuickOpenUi for RecordingUi {
    fn open(&mut self) {
        self.calls.push("open");
    }
    fn refresh(&mut self) {
        self.calls.push("refresh");
    }
    fn close(&mut self) {
        self.calls.push("close");
    }
}

#[derive(Default)]
struct RecordingOpener {
    opened: Mutex<Vec<PathBuf>>,
}

impl FileOpener for RecordingOpener {
    fn open_file(&self, path: &Path) {
        self.opened.lock().unwrap().push(path.to_path_buf());
    }
}

fn provider(search: Arc<dyn FileSearch>, executor: Arc<ManualExecutor>) -> QuickOpenProvider {
    QuickOpenProvider::new(search, executor, &QuickOpenSettings::default()).with_root("/ws")
}

#[test]
fn test_results_are_deduped_into_items() {
    let rt = create_runtime();
    let executor = Arc::new(ManualExecutor::default());
    let mut quick_open = provider(Arc::new(EchoSearch::default()), executor.clone());
    let (acceptor, batches) = recording_acceptor();

    quick_open.on_type("main", acceptor);
    assert!(batches.lock().unwrap().is_empty());
    executor.run_all(&rt);

    let batches = batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);
    let item = &batches[0][0];
    assert_eq!(item.label, "main.rs");
    assert_eq!(item.icon, "rust");
    assert_eq!(item.description, "");
    assert_eq!(item.tooltip, "/ws/main.rs");
    assert_eq!(item.uri, "file:///ws/main.rs");
}

#[test]
fn test_cancelled_session_never_reaches_acceptor() {
    let rt = create_runtime();
    let executor = Arc::new(ManualExecutor::default());
    let mut quick_open = provider(Arc::new(EchoSearch::default()), executor.clone());
    let (acceptor, batches) = recording_acceptor();

    let first = quick_open.on_type("ma", acceptor.clone());
    let second = quick_open.on_type("main", acceptor);
    assert!(first.is_cancelled());
    assert!(!second.is_cancelled());
    assert_eq!(executor.pending(), 2);

    executor.run_all(&rt);

    let batches = batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].label, "main.rs");
}

#[test]
fn test_empty_query_or_missing_root_delivers_empty_list() {
    let executor = Arc::new(ManualExecutor::default());
    let search = Arc::new(EchoSearch::default());
    let (acceptor, batches) = recording_acceptor();

    let mut quick_open = provider(search.clone(), executor.clone());
    quick_open.on_type("   ", acceptor.clone());

    let mut rootless =
        QuickOpenProvider::new(search.clone(), executor.clone(), &QuickOpenSettings::default());
    rootless.on_type("main", acceptor);

    assert_eq!(executor.pending(), 0);
    assert!(search.requests.lock().unwrap().is_empty());
    assert_eq!(*batches.lock().unwrap(), vec![Vec::new(), Vec::new()]);
}

#[test]
fn test_toggle_ignored_files_flips_git_ignore_and_refreshes() {
    let executor = Arc::new(ManualExecutor::default());
    let search = Arc::new(EchoSearch::default());
    let mut quick_open = provider(search.clone(), executor);
    let mut ui = RecordingUi::default();
    let (acceptor, _) = recording_acceptor();

    quick_open.on_type("a", acceptor.clone());
    assert!(quick_open.handle_command(&Command::ToggleIgnoredFiles, &mut ui));
    assert!(quick_open.show_ignored());
    quick_open.on_type("a", acceptor);

    assert_eq!(ui.calls, vec!["refresh"]);
    let requests = search.requests.lock().unwrap();
    assert!(requests[0].1.use_git_ignore);
    assert!(!requests[1].1.use_git_ignore);
    assert_eq!(requests[1].1.limit, 200);
    assert!(requests[1].1.fuzzy_match);
}

#[test]
fn test_close_command_cancels_in_flight_search() {
    let rt = create_runtime();
    let executor = Arc::new(ManualExecutor::default());
    let mut quick_open = provider(Arc::new(EchoSearch::default()), executor.clone());
    let mut ui = RecordingUi::default();
    let (acceptor, batches) = recording_acceptor();

    assert!(quick_open.handle_command(&Command::QuickOpen, &mut ui));
    let token = quick_open.on_type("main", acceptor);
    assert!(quick_open.handle_command(&Command::CloseQuickOpen, &mut ui));
    assert!(!quick_open.handle_command(&Command::Custom("x".into()), &mut ui));

    executor.run_all(&rt);

    assert!(token.is_cancelled());
    assert!(quick_open.current_token().is_none());
    assert!(batches.lock().unwrap().is_empty());
    assert_eq!(ui.calls, vec!["open", "close"]);
}

#[test]
fn test_search_errors_are_swallowed() {
    let rt = create_runtime();
    for err in [SearchError::Cancelled(0), SearchError::Task("disk".into())] {
        let executor = Arc::new(ManualExecutor::default());
        let mut quick_open = provider(Arc::new(FailingSearch(err)), executor.clone());
        let (acceptor, batches) = recording_acceptor();

        quick_open.on_type("main", acceptor);
        executor.run_all(&rt);

        assert!(batches.lock().unwrap().is_empty());
    }
}

#[test]
fn test_open_hands_path_to_opener() {
    let quick_open = provider(
        Arc::new(EchoSearch::default()),
        Arc::new(ManualExecutor::default()),
    );
    let item = QuickOpenItem::from_path(Path::new("/ws"), PathBuf::from("/ws/src/lib.rs"));
    assert_eq!(item.description, "src");

    let opener = RecordingOpener::default();
    quick_open.open(&item, &opener);
    assert_eq!(*opener.opened.lock().unwrap(), vec![PathBuf::from("/ws/src/lib.rs")]);
}

#[test]
fn test_workspace_search_end_to_end() {
    let rt = create_runtime();
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
    fs::write(dir.path().join("Cargo.toml"), "").unwrap();

    let executor = Arc::new(ManualExecutor::default());
    let mut quick_open = QuickOpenProvider::new(
        Arc::new(WorkspaceFileSearch),
        executor.clone(),
        &QuickOpenSettings::default(),
    )
    .with_root(dir.path());
    let (acceptor, batches) = recording_acceptor();

    quick_open.on_type("main", acceptor);
    executor.run_all(&rt);

    let batches = batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);
    assert_eq!(batches[0][0].label, "main.rs");
    assert_eq!(batches[0][0].description, "src");
}

#[test]
fn test_ctrl_alt_p_toggles_ignored_files() {
    let mut quick_open = provider(
        Arc::new(EchoSearch::default()),
        Arc::new(ManualExecutor::default()),
    );
    let mut ui = RecordingUi::default();

    let toggle = crate::core::parse_keybinding("ctrl+alt+p").unwrap();
    assert!(quick_open.handle_key(&toggle, &mut ui));
    assert!(quick_open.show_ignored());

    let unbound = crate::core::parse_keybinding("ctrl+q").unwrap();
    assert!(!quick_open.handle_key(&unbound, &mut ui));
    assert_eq!(ui.calls, vec!["refresh"]);
}

#[test]
fn test_new_session_waits_for_in_flight_delivery() {
    let executor = Arc::new(ManualExecutor::default());
    let mut quick_open = provider(Arc::new(EchoSearch::default()), executor.clone());
    let events: Arc<Mutex<Vec<&'static str>>> = Arc::default();
    let (entered_tx, entered_rx) = std::sync::mpsc::channel::<()>();
    let entered_tx = Mutex::new(entered_tx);

    let log = events.clone();
    let slow: Arc<dyn QuickOpenAcceptor> = Arc::new(move |_items: Vec<QuickOpenItem>| {
        let _ = entered_tx.lock().unwrap().send(());
        std::thread::sleep(std::time::Duration::from_millis(100));
        log.lock().unwrap().push("delivered");
    });
    let first = quick_open.on_type("main", slow);

    let tasks: Vec<_> = executor.tasks.lock().unwrap().drain(..).collect();
    let worker = std::thread::spawn(move || {
        let rt = create_runtime();
        for task in tasks {
            rt.block_on(task);
        }
    });

    entered_rx.recv().unwrap();
    let (acceptor, _) = recording_acceptor();
    quick_open.on_type("x", acceptor);
    events.lock().unwrap().push("typed");
    worker.join().unwrap();

    assert!(first.is_cancelled());
    assert_eq!(*events.lock().unwrap(), vec!["delivered", "typed"]);
}

#[test]
fn test_batch_checked_against_token_under_delivery_lock() {
    let rt = create_runtime();
    let executor = Arc::new(ManualExecutor::default());
    let mut quick_open = provider(Arc::new(EchoSearch::default()), executor.clone());
    let (acceptor, batches) = recording_acceptor();

    let stale = quick_open.on_type("main", acceptor.clone());
    quick_open.on_type("", acceptor);
    assert!(stale.is_cancelled());
    executor.run_all(&rt);

    assert_eq!(*batches.lock().unwrap(), vec![Vec::new()]);
}
