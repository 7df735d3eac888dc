//! Studylock settings, which are configurable using a TOML file and environment variables.
use camino::Utf8PathBuf;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct StudylockOptions {
    /// Directory of the viewer's study cache, one UID-named folder per study.
    pub cache_dir: Utf8PathBuf,
    /// The dictation tool's log.
    pub log_path: Utf8PathBuf,
    /// Where `current_study.json` is published.
    pub data_dir: Utf8PathBuf,
    #[serde(with = "humantime_serde", default = "default_search_timeout")]
    pub search_timeout: Duration,
    #[serde(default = "default_cache_size")]
    pub cache_size: NonZeroUsize,
    #[serde(default = "default_max_scan_folders")]
    pub max_scan_folders: NonZeroUsize,
    #[serde(with = "humantime_serde", default = "default_tick_interval")]
    pub tick_interval: Duration,
    /// Text file holding the foreground patient label. Without it, no patient window is
    /// ever known to be open.
    #[serde(default)]
    pub window_label_file: Option<Utf8PathBuf>,
    #[serde(default)]
    pub heartbeat: Option<HeartbeatOptions>,
}

/// Host application heartbeat, see [crate::Heartbeat].
#[derive(Debug, Deserialize)]
pub struct HeartbeatOptions {
    pub path: Utf8PathBuf,
    #[serde(with = "humantime_serde", default = "default_heartbeat_stale")]
    pub stale: Duration,
    #[serde(with = "humantime_serde", default = "default_heartbeat_grace")]
    pub grace: Duration,
}

fn default_search_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_cache_size() -> NonZeroUsize {
    NonZeroUsize::new(5).unwrap()
}

fn default_max_scan_folders() -> NonZeroUsize {
    NonZeroUsize::new(50).unwrap()
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_heartbeat_stale() -> Duration {
    Duration::from_secs(30)
}

fn default_heartbeat_grace() -> Duration {
    Duration::from_secs(120)
}
