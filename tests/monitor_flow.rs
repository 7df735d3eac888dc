use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use studylock::{
    ForegroundWindow, LabelFileWindow, LogTrigger, Monitor, PublishedState, SearchEngine,
    SearchSettings, StatePublisher, StudylockOptions, read_published, run_everything,
};

use crate::util::{TestDirs, TestStudy, init_logging};

mod util;

/// A viewer whose foreground patient is set by the test.
#[derive(Clone, Default)]
struct FakeViewer(Arc<Mutex<String>>);

impl FakeViewer {
    fn show(&self, label: &str) {
        *self.0.lock().unwrap() = label.to_string();
    }

    fn close(&self) {
        self.show("")
    }
}

impl ForegroundWindow for FakeViewer {
    fn patient_label(&mut self) -> String {
        self.0.lock().unwrap().clone()
    }
}

fn monitor(dirs: &TestDirs, viewer: FakeViewer) -> Monitor<FakeViewer> {
    init_logging();
    let settings = SearchSettings {
        cache_dir: dirs.cache_dir.clone(),
        timeout: Duration::from_secs(120),
        cache_size: NonZeroUsize::new(5).unwrap(),
        max_scan_folders: NonZeroUsize::new(50).unwrap(),
    };
    Monitor::new(
        viewer,
        LogTrigger::new(&dirs.log_path),
        SearchEngine::new(settings, StatePublisher::new(&dirs.data_dir)),
        None,
    )
}

fn published_accession(dirs: &TestDirs) -> Option<String> {
    read_published(dirs.state_path()).and_then(|s| s.accession)
}

#[test]
fn test_dictated_study_is_locked() {
    let dirs = TestDirs::new();
    dirs.add_study("1.2.840.1", &TestStudy::new("RAD-100-CT_1", "DOE^JOHN"));
    let viewer = FakeViewer::default();
    let mut m = monitor(&dirs, viewer.clone());

    viewer.show("DOE^JOHN");
    dirs.dictate("2025-01-15 10:00:00 OpenReport SingleAccession RAD-100-CT_1");
    assert!(m.tick().is_continue());
    assert_eq!(published_accession(&dirs).as_deref(), Some("RAD-100-CT_1"));
    assert_eq!(m.engine().locked().map(|a| a.as_str()), Some("RAD-100-CT"));
}

#[test]
fn test_no_trigger_without_patient_window() {
    let dirs = TestDirs::new();
    dirs.add_study("1.2.840.1", &TestStudy::new("RAD-100-CT", "DOE^JOHN"));
    let viewer = FakeViewer::default();
    let mut m = monitor(&dirs, viewer.clone());

    dirs.dictate("x SingleAccession RAD-100-CT");
    m.tick();
    assert!(!m.engine().is_active());
    assert_eq!(m.engine().locked(), None);

    // the log was not consumed, so it is picked up once the window opens
    viewer.show("DOE^JOHN");
    m.tick();
    m.tick();
    assert_eq!(published_accession(&dirs).as_deref(), Some("RAD-100-CT"));
}

#[test]
fn test_window_closed_resets() {
    let dirs = TestDirs::new();
    dirs.add_study("1.2.840.1", &TestStudy::new("RAD-100-CT", "DOE^JOHN"));
    let viewer = FakeViewer::default();
    let mut m = monitor(&dirs, viewer.clone());
    viewer.show("DOE^JOHN");
    m.tick();
    dirs.dictate("x SingleAccession RAD-100-CT");
    m.on_log_changed();
    m.tick();
    assert!(published_accession(&dirs).is_some());

    viewer.close();
    m.tick();
    assert_eq!(read_published(dirs.state_path()), Some(PublishedState::empty()));
    assert_eq!(m.engine().locked(), None);
}

#[test]
fn test_patient_change_prevents_lock_in_same_tick() {
    let dirs = TestDirs::new();
    dirs.add_study("1.2.840.1", &TestStudy::new("RAD-100-CT", "DOE^JOHN"));
    let viewer = FakeViewer::default();
    let mut m = monitor(&dirs, viewer.clone());
    viewer.show("DOE^JOHN");
    m.tick();
    dirs.dictate("x SingleAccession RAD-100-CT");
    m.on_log_changed();
    assert!(m.engine().is_active());

    // the viewer switched patients before the next tick
    viewer.show("SMITH^ANNA");
    m.tick();
    assert_eq!(m.engine().locked(), None);
    assert_eq!(read_published(dirs.state_path()), Some(PublishedState::empty()));
}

#[test]
fn test_shutdown_publishes_empty() {
    let dirs = TestDirs::new();
    dirs.add_study("1.2.840.1", &TestStudy::new("RAD-100-CT", "DOE^JOHN"));
    let viewer = FakeViewer::default();
    let mut m = monitor(&dirs, viewer.clone());
    viewer.show("DOE^JOHN");
    dirs.dictate("x SingleAccession RAD-100-CT");
    m.tick();
    m.tick();
    assert!(published_accession(&dirs).is_some());
    m.shutdown();
    assert_eq!(read_published(dirs.state_path()), Some(PublishedState::empty()));
}

fn options(dirs: &TestDirs) -> StudylockOptions {
    StudylockOptions {
        cache_dir: dirs.cache_dir.clone(),
        log_path: dirs.log_path.clone(),
        data_dir: dirs.data_dir.clone(),
        search_timeout: Duration::from_secs(120),
        cache_size: NonZeroUsize::new(5).unwrap(),
        max_scan_folders: NonZeroUsize::new(50).unwrap(),
        tick_interval: Duration::from_millis(10),
        window_label_file: None,
        heartbeat: None,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_everything_locks_then_clears_on_exit() {
    init_logging();
    let dirs = TestDirs::new();
    dirs.add_study("1.2.840.1", &TestStudy::new("RAD-100-CT", "DOE^JOHN"));
    dirs.dictate("x SingleAccession RAD-100-CT");
    let label_path = dirs.root.join("label.txt");
    fs_err::write(&label_path, "DOE^JOHN\n").unwrap();

    let server = run_everything(options(&dirs), LabelFileWindow::new(&label_path), Some(200));
    let server_handle = tokio::spawn(server);

    let state_path = dirs.state_path();
    let locked = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let Some(accession) = read_published(&state_path).and_then(|s| s.accession) {
                break accession;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(locked, "RAD-100-CT");

    server_handle.await.unwrap().unwrap();
    assert_eq!(read_published(&state_path), Some(PublishedState::empty()));
}
