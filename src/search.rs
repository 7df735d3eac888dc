//! The accession search state machine.
//!
//! A search is started by [SearchEngine::trigger] and advanced by
//! [SearchEngine::continue_search] once per tick until it either locks onto a study,
//! times out, or is cancelled by [SearchEngine::safety_reset].

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;

use crate::accession::{last_name, names_match, normalize};
use crate::folder_scan::recent_study_folders;
use crate::metadata::extract_from_folder;
use crate::recency_cache::RecencyCache;
use crate::state_file::StatePublisher;
use crate::types::{Accession, PublishedState, StudyFields};

/// Tunables of a [SearchEngine].
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Directory containing one UID-named folder per cached study.
    pub cache_dir: Utf8PathBuf,
    /// Give up on a target after this long.
    pub timeout: Duration,
    /// Number of studies remembered by the recency cache.
    pub cache_size: NonZeroUsize,
    /// Number of most recently modified study folders inspected per tick.
    pub max_scan_folders: NonZeroUsize,
}

/// Why all search state was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    WindowClosed,
    PatientChanged,
    Shutdown,
}

impl ResetReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WindowClosed => "window_closed",
            Self::PatientChanged => "patient_changed",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Where a candidate study came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Cache,
    RecentFolders,
}

/// Result of one [SearchEngine::continue_search] tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// No search in progress.
    Idle,
    /// No study with the target accession was found yet.
    Pending,
    /// A study was found but belongs to a different patient than the one on screen.
    NameMismatch,
    /// A study was found, checked, and published.
    Locked(MatchSource),
    /// The search ran out of time.
    TimedOut,
}

#[derive(Debug, Clone)]
struct ActiveSearch {
    target: Accession,
    started_at: Instant,
}

/// Owns the search lifecycle, the recency cache, and the published document.
pub struct SearchEngine {
    settings: SearchSettings,
    cache: RecencyCache<Accession, StudyFields>,
    publisher: StatePublisher,
    active: Option<ActiveSearch>,
    locked: Option<Accession>,
}

impl SearchEngine {
    pub fn new(settings: SearchSettings, publisher: StatePublisher) -> Self {
        Self {
            cache: RecencyCache::new(settings.cache_size),
            settings,
            publisher,
            active: None,
            locked: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Accession currently being searched for.
    pub fn target(&self) -> Option<&Accession> {
        self.active.as_ref().map(|search| &search.target)
    }

    /// Accession of the study currently published.
    pub fn locked(&self) -> Option<&Accession> {
        self.locked.as_ref()
    }

    /// Whether `accession` is already being searched for or is already locked.
    pub fn is_current(&self, accession: &Accession) -> bool {
        self.target() == Some(accession) || self.locked() == Some(accession)
    }

    /// Start searching for `accession`, see [SearchEngine::trigger_at].
    pub fn trigger(&mut self, accession: Accession) -> bool {
        self.trigger_at(Instant::now(), accession)
    }

    /// Start searching for `accession`, replacing any search in progress.
    ///
    /// The published document is cleared so that stale demographics are never shown
    /// while the new study is being looked for. Empty accessions and accessions which
    /// are already being searched for or locked are ignored. Returns whether a search
    /// was started.
    pub fn trigger_at(&mut self, now: Instant, accession: Accession) -> bool {
        let accession = normalize(accession.as_str());
        if accession.as_str().is_empty() || self.is_current(&accession) {
            return false;
        }
        if let Some(previous) = self.target() {
            tracing::info!(
                previous = previous.as_str(),
                accession = accession.as_str(),
                "abandoning search"
            );
        }
        tracing::info!(accession = accession.as_str(), "starting search");
        self.locked = None;
        self.active = Some(ActiveSearch {
            target: accession,
            started_at: now,
        });
        self.publish(&PublishedState::empty());
        true
    }

    /// Advance the current search, see [SearchEngine::continue_search_at].
    pub fn continue_search(&mut self, window_label: &str) -> SearchOutcome {
        self.continue_search_at(Instant::now(), window_label)
    }

    /// Advance the current search by one tick.
    ///
    /// `window_label` is the patient label last seen in the viewer. A found study is
    /// only published when its patient name agrees with the label. An empty label
    /// skips the check.
    pub fn continue_search_at(&mut self, now: Instant, window_label: &str) -> SearchOutcome {
        let Some(search) = self.active.clone() else {
            return SearchOutcome::Idle;
        };
        let elapsed = now.saturating_duration_since(search.started_at);
        if elapsed > self.settings.timeout {
            tracing::warn!(
                accession = search.target.as_str(),
                elapsed = format!("{elapsed:.1?}"),
                "search timed out"
            );
            self.active = None;
            return SearchOutcome::TimedOut;
        }
        let Some((fields, source)) = self.find_candidate(&search.target) else {
            return SearchOutcome::Pending;
        };
        if !names_match(window_label, &fields.patient_name) {
            tracing::warn!(
                accession = search.target.as_str(),
                study_last_name = last_name(&fields.patient_name),
                window_last_name = last_name(window_label),
                "accession matched but patient name does not"
            );
            return SearchOutcome::NameMismatch;
        }
        tracing::info!(
            accession = search.target.as_str(),
            elapsed = format!("{elapsed:.1?}"),
            source = format!("{source:?}"),
            "locked study"
        );
        self.active = None;
        self.locked = Some(search.target);
        self.publish(&PublishedState::from(&fields));
        SearchOutcome::Locked(source)
    }

    /// Forget the current search and lock, and publish the empty document.
    ///
    /// May be called in any state. The recency cache is kept.
    pub fn safety_reset(&mut self, reason: ResetReason) {
        let had_state = self.active.is_some() || self.locked.is_some();
        self.active = None;
        self.locked = None;
        self.publish(&PublishedState::empty());
        if had_state {
            tracing::info!(reason = reason.as_str(), "state reset");
        }
    }

    /// Look for the target in the cache, then in the most recent study folders. A study
    /// found on disk is cached right away, whether or not it passes the name check.
    fn find_candidate(&mut self, target: &Accession) -> Option<(StudyFields, MatchSource)> {
        if let Some(fields) = self.cache.get(target) {
            tracing::debug!(accession = target.as_str(), "cache hit");
            return Some((fields.clone(), MatchSource::Cache));
        }
        let fields = self.scan_recent_folders(target)?;
        self.cache.put(target.clone(), fields.clone());
        tracing::debug!(
            accession = target.as_str(),
            cache_size = self.cache.len(),
            "cached"
        );
        Some((fields, MatchSource::RecentFolders))
    }

    fn scan_recent_folders(&self, target: &Accession) -> Option<StudyFields> {
        recent_study_folders(
            &self.settings.cache_dir,
            self.settings.max_scan_folders.get(),
        )
        .into_iter()
        .filter_map(|folder| extract_from_folder(&folder))
        .filter(|fields| !fields.patient_name.is_empty())
        .find(|fields| normalize(&fields.accession) == *target)
    }

    fn publish(&self, state: &PublishedState) {
        if let Err(e) = self.publisher.publish(state) {
            tracing::error!(
                path = self.publisher.path().as_str(),
                error = e.to_string(),
                "could not publish state"
            );
        }
    }
}
