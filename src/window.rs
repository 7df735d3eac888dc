//! Knowledge about the patient currently displayed in the image viewer.

use camino::{Utf8Path, Utf8PathBuf};

use crate::accession::last_name;
use crate::search::ResetReason;

/// Source of the patient label of the viewer's foreground window.
///
/// The label is a DICOM-style person name (`LAST^FIRST`), or the empty string when
/// no patient window is open.
pub trait ForegroundWindow: Send {
    fn patient_label(&mut self) -> String;
}

impl<F: FnMut() -> String + Send> ForegroundWindow for F {
    fn patient_label(&mut self) -> String {
        self()
    }
}

/// No viewer integration: a patient window is never known to be open.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWindow;

impl ForegroundWindow for NoWindow {
    fn patient_label(&mut self) -> String {
        String::new()
    }
}

/// Reads the label from the first line of a text file maintained by another process.
///
/// A missing file means no patient window is open.
#[derive(Debug, Clone)]
pub struct LabelFileWindow {
    path: Utf8PathBuf,
}

impl LabelFileWindow {
    pub fn new<P: AsRef<Utf8Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ForegroundWindow for LabelFileWindow {
    fn patient_label(&mut self) -> String {
        fs_err::read_to_string(&self.path)
            .ok()
            .and_then(|s| s.lines().next().map(|line| line.trim().to_string()))
            .unwrap_or_default()
    }
}

/// Pick the patient label out of a list of visible window titles.
///
/// Patient viewer titles look like `DOE^JOHN - 12345 - CT CHEST`. The search tool
/// window also carries names and is ignored.
pub fn patient_label_from_titles<'a, I>(titles: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    titles
        .into_iter()
        .find(|title| title.contains('^') && title.contains(" - ") && !title.contains("Search Tool"))
        .and_then(|title| title.split(" - ").next())
        .map(|label| label.trim().to_string())
        .unwrap_or_default()
}

/// Detects when the patient on screen goes away or changes.
#[derive(Debug, Default)]
pub struct SafetyMonitor {
    last_label: String,
}

impl SafetyMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label seen on the previous check.
    pub fn last_label(&self) -> &str {
        &self.last_label
    }

    /// Whether a patient window was open on the previous check.
    pub fn window_open(&self) -> bool {
        !self.last_label.is_empty()
    }

    /// Compare `current` with the previous label. Returns the reason to reset, if any.
    pub fn check(&mut self, current: String) -> Option<ResetReason> {
        let previous = std::mem::replace(&mut self.last_label, current);
        if previous.is_empty() {
            return None;
        }
        if self.last_label.is_empty() {
            tracing::info!("patient window closed");
            return Some(ResetReason::WindowClosed);
        }
        let (old, new) = (last_name(&previous), last_name(&self.last_label));
        if old != new {
            tracing::info!("patient changed");
            return Some(ResetReason::PatientChanged);
        }
        None
    }
}
