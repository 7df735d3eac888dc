use std::io::ErrorKind;
use std::time::{Duration, Instant, SystemTime};

use camino::{Utf8Path, Utf8PathBuf};

/// What was seen of the heartbeat file on one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Beat {
    /// The file exists and was last touched this long ago.
    Age(Duration),
    /// The file does not exist.
    Missing,
    /// The file could not be inspected.
    Unknown,
}

/// Health of the host application, judged from its heartbeat file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStatus {
    Alive,
    /// Stale or missing, but not for long enough to give up.
    Doubtful,
    Gone,
}

/// Watches a file which the host application touches periodically.
///
/// A file older than `stale` starts a timer, and the host is considered gone once the
/// file is still stale after another `stale`. A missing file is given `grace` instead,
/// so that the host has time to start.
#[derive(Debug)]
pub struct Heartbeat {
    path: Utf8PathBuf,
    stale: Duration,
    grace: Duration,
    unhealthy_since: Option<Instant>,
}

impl Heartbeat {
    pub fn new<P: AsRef<Utf8Path>>(path: P, stale: Duration, grace: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            stale,
            grace,
            unhealthy_since: None,
        }
    }

    pub fn check(&mut self) -> HostStatus {
        let beat = self.observe();
        self.check_at(Instant::now(), beat)
    }

    fn observe(&self) -> Beat {
        match fs_err::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(mtime) => Beat::Age(SystemTime::now().duration_since(mtime).unwrap_or_default()),
            Err(e) if e.kind() == ErrorKind::NotFound => Beat::Missing,
            Err(e) => {
                tracing::debug!(error = e.to_string(), "could not inspect heartbeat");
                Beat::Unknown
            }
        }
    }

    pub fn check_at(&mut self, now: Instant, beat: Beat) -> HostStatus {
        let patience = match beat {
            Beat::Age(age) if age <= self.stale => {
                self.unhealthy_since = None;
                return HostStatus::Alive;
            }
            Beat::Age(_) => self.stale,
            Beat::Missing => self.grace,
            Beat::Unknown => return HostStatus::Doubtful,
        };
        let since = *self.unhealthy_since.get_or_insert(now);
        if now.saturating_duration_since(since) > patience {
            tracing::info!(
                path = self.path.as_str(),
                beat = format!("{beat:?}"),
                "host heartbeat lost"
            );
            HostStatus::Gone
        } else {
            HostStatus::Doubtful
        }
    }
}
