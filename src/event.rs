/// Events delivered to the run loop between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MonitorEvent {
    /// The dictation log was created or modified.
    LogChanged,
}
