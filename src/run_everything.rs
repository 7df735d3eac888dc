use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::error::HandleLoopError;
use crate::get_config;
use crate::heartbeat::Heartbeat;
use crate::monitor::Monitor;
use crate::search::{SearchEngine, SearchSettings};
use crate::settings::{HeartbeatOptions, StudylockOptions};
use crate::state_file::StatePublisher;
use crate::trigger::LogTrigger;
use crate::watcher::spawn_log_watcher;
use crate::window::{ForegroundWindow, LabelFileWindow, NoWindow};

/// Calls [run_everything] using configuration from `studylock.toml` and environment
/// variables.
///
/// The patient label is read from `window_label_file` if one is configured.
///
/// `finite_ticks`: shut down after the given number of scheduler ticks.
pub async fn run_everything_from_env(finite_ticks: Option<usize>) -> anyhow::Result<()> {
    let config = get_config();
    let options: StudylockOptions = config.extract()?;
    match options.window_label_file.clone() {
        Some(path) => run_everything(options, LabelFileWindow::new(path), finite_ticks).await,
        None => {
            tracing::warn!("no window label source configured, searches will never start");
            run_everything(options, NoWindow, finite_ticks).await
        }
    }
}

/// Runs the monitor until interrupted:
///
/// 1. A file watcher which notifies the run loop of dictation log changes
/// 2. A scheduler tick which checks the window, polls the log, and advances the search
///
/// The published document is cleared before returning.
pub async fn run_everything<W: ForegroundWindow>(
    StudylockOptions {
        cache_dir,
        log_path,
        data_dir,
        search_timeout,
        cache_size,
        max_scan_folders,
        tick_interval,
        window_label_file: _,
        heartbeat,
    }: StudylockOptions,
    window: W,
    finite_ticks: Option<usize>,
) -> anyhow::Result<()> {
    let publisher = StatePublisher::new(&data_dir);
    let settings = SearchSettings {
        cache_dir,
        timeout: search_timeout,
        cache_size,
        max_scan_folders,
    };
    let heartbeat = heartbeat.map(|HeartbeatOptions { path, stale, grace }| {
        Heartbeat::new(path, stale, grace)
    });
    let mut monitor = Monitor::new(
        window,
        LogTrigger::new(&log_path),
        SearchEngine::new(settings, publisher),
        heartbeat,
    );

    let (tx_events, mut rx_events) = mpsc::unbounded_channel();
    let watcher_handle = spawn_log_watcher(&log_path, tx_events);

    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut listen_ctrl_c = true;

    tracing::info!(
        log_path = log_path.as_str(),
        data_dir = data_dir.as_str(),
        "monitoring started"
    );
    let mut ticks = 0;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if monitor.tick().is_break() {
                    break;
                }
                ticks += 1;
                if finite_ticks.is_some_and(|n| ticks >= n) {
                    break;
                }
            }
            Some(event) = rx_events.recv() => monitor.handle_event(event),
            r = &mut ctrl_c, if listen_ctrl_c => match r {
                Ok(()) => {
                    tracing::info!("interrupted");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = e.to_string(), "cannot listen for Ctrl-C");
                    listen_ctrl_c = false;
                }
            }
        }
    }

    monitor.shutdown();
    drop(rx_events);
    if let Some(handle) = watcher_handle {
        handle
            .await
            .map_err(|_| HandleLoopError("log watcher panicked"))?;
    }
    tracing::info!("monitoring stopped");
    Ok(())
}
