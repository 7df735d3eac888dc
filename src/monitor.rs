use std::ops::ControlFlow;

use crate::event::MonitorEvent;
use crate::heartbeat::{Heartbeat, HostStatus};
use crate::search::{ResetReason, SearchEngine, SearchOutcome};
use crate::trigger::LogTrigger;
use crate::window::{ForegroundWindow, SafetyMonitor};

/// Ties the window, the dictation log and the search together.
///
/// All state changes go through `&mut self`, so the run loop is the only place where
/// ticks and log notifications are serialized.
pub struct Monitor<W> {
    window: W,
    safety: SafetyMonitor,
    trigger: LogTrigger,
    engine: SearchEngine,
    heartbeat: Option<Heartbeat>,
}

impl<W: ForegroundWindow> Monitor<W> {
    pub fn new(
        window: W,
        trigger: LogTrigger,
        engine: SearchEngine,
        heartbeat: Option<Heartbeat>,
    ) -> Self {
        Self {
            window,
            safety: SafetyMonitor::new(),
            trigger,
            engine,
            heartbeat,
        }
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// One scheduler tick.
    ///
    /// The safety check runs first so that a search invalidated by a closed or changed
    /// window cannot be locked in the same tick. Breaks when the host application is gone.
    pub fn tick(&mut self) -> ControlFlow<()> {
        self.check_patient_safety();
        self.on_log_changed();
        let outcome = self.engine.continue_search(self.safety.last_label());
        if outcome != SearchOutcome::Idle {
            tracing::trace!(outcome = format!("{outcome:?}"), "tick");
        }
        match self.heartbeat.as_mut().map(Heartbeat::check) {
            Some(HostStatus::Gone) => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }

    pub(crate) fn handle_event(&mut self, event: MonitorEvent) {
        match event {
            MonitorEvent::LogChanged => self.on_log_changed(),
        }
    }

    /// Reset the search if the patient on screen went away or changed.
    pub fn check_patient_safety(&mut self) {
        let label = self.window.patient_label();
        if let Some(reason) = self.safety.check(label) {
            self.reset(reason);
        }
    }

    /// Start a search for the newest accession in the dictation log, if it changed and
    /// a patient window is open.
    pub fn on_log_changed(&mut self) {
        if !self.safety.window_open() {
            return;
        }
        if let Some(accession) = self.trigger.poll() {
            self.engine.trigger(accession);
        }
    }

    /// Discard the search and the lock. The next log check re-reads the log.
    pub fn reset(&mut self, reason: ResetReason) {
        self.engine.safety_reset(reason);
        self.trigger.forget();
    }

    pub fn shutdown(&mut self) {
        self.reset(ResetReason::Shutdown);
    }
}
