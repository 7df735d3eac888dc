use std::ffi::OsStr;
use std::sync::mpsc as std_mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::event::MonitorEvent;

/// How often the watcher thread checks whether the run loop is still listening.
const POLL_RECEIVER: Duration = Duration::from_millis(250);

/// Start watching the dictation log in a blocking task.
///
/// Returns [None] when the log's directory does not exist, in which case changes are
/// only noticed by the per-tick fallback. The task ends once `tx` is closed.
pub(crate) fn spawn_log_watcher(
    log_path: &Utf8Path,
    tx: UnboundedSender<MonitorEvent>,
) -> Option<JoinHandle<()>> {
    let dir = log_dir(log_path);
    if !dir.is_dir() {
        tracing::warn!(
            dir = dir.as_str(),
            "log directory does not exist, relying on polling alone"
        );
        return None;
    }
    let Some(file_name) = log_path.file_name().map(|s| s.to_string()) else {
        tracing::warn!(path = log_path.as_str(), "log path has no file name, relying on polling alone");
        return None;
    };
    let handle = tokio::task::spawn_blocking(move || {
        if let Err(e) = watch_log(&dir, &file_name, tx) {
            tracing::error!(error = e.to_string(), "log watcher stopped, relying on polling alone");
        }
    });
    Some(handle)
}

fn log_dir(log_path: &Utf8Path) -> Utf8PathBuf {
    match log_path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
        _ => Utf8PathBuf::from("."),
    }
}

fn watch_log(
    dir: &Utf8Path,
    file_name: &str,
    tx: UnboundedSender<MonitorEvent>,
) -> notify::Result<()> {
    let (watch_tx, watch_rx) = std_mpsc::channel();
    let mut watcher = RecommendedWatcher::new(watch_tx, notify::Config::default())?;
    watcher.watch(dir.as_std_path(), RecursiveMode::NonRecursive)?;
    tracing::debug!(dir = dir.as_str(), file_name, "watching log");
    loop {
        if tx.is_closed() {
            break;
        }
        match watch_rx.recv_timeout(POLL_RECEIVER) {
            Ok(Ok(event)) => {
                if is_log_change(&event, file_name) && tx.send(MonitorEvent::LogChanged).is_err() {
                    break;
                }
            }
            Ok(Err(e)) => tracing::warn!(error = e.to_string(), "log watcher error"),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(())
}

/// Whether `event` is a write to the file called `file_name`. Other files in the same
/// directory are ignored.
fn is_log_change(event: &Event, file_name: &str) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(OsStr::new(file_name)))
}
