use std::sync::OnceLock;
use std::time::SystemTime;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;

use crate::accession::normalize;
use crate::types::Accession;

/// Token preceding an explicit accession in the dictation log.
const SINGLE_ACCESSION_MARKER: &str = "SingleAccession";

/// Placeholder written by the dictation tool when no accession is open.
const PLACEHOLDER: &str = "-";

static ACCESSION_SHAPE_RE: OnceLock<Regex> = OnceLock::new();

fn accession_shape_re() -> &'static Regex {
    ACCESSION_SHAPE_RE.get_or_init(|| Regex::new(r"^[A-Z]{2,3}-\d+-[A-Z]{2}$").unwrap())
}

/// Find the most recent accession mentioned in the dictation log.
///
/// Lines are read newest first. On each line a token following the
/// `SingleAccession` marker wins, otherwise any token shaped like an accession.
/// The result is normalized.
pub fn parse_log(contents: &str) -> Option<Accession> {
    contents.lines().rev().find_map(accession_in_line)
}

fn accession_in_line(line: &str) -> Option<Accession> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let marked = tokens
        .windows(2)
        .find(|pair| pair[0] == SINGLE_ACCESSION_MARKER)
        .map(|pair| pair[1]);
    if let Some(raw) = marked.filter(|raw| *raw != PLACEHOLDER) {
        let accession = normalize(raw);
        tracing::debug!(accession = accession.as_str(), raw, "marked accession in log");
        return Some(accession);
    }
    let raw = tokens.into_iter().find(|t| accession_shape_re().is_match(t))?;
    let accession = normalize(raw);
    tracing::debug!(accession = accession.as_str(), "accession-shaped token in log");
    Some(accession)
}

/// Watches the dictation log for accessions.
///
/// The log is only re-read when its modification time changes.
pub struct LogTrigger {
    path: Utf8PathBuf,
    last_mtime: Option<SystemTime>,
}

impl LogTrigger {
    pub fn new<P: AsRef<Utf8Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            last_mtime: None,
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Read the newest accession from the log if the log changed since the last poll.
    ///
    /// A missing or unreadable log produces [None] and is retried on the next poll.
    pub fn poll(&mut self) -> Option<Accession> {
        let mtime = fs_err::metadata(&self.path)
            .and_then(|m| m.modified())
            .ok()?;
        if self.last_mtime == Some(mtime) {
            return None;
        }
        self.last_mtime = Some(mtime);
        let data = match fs_err::read(&self.path) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(error = e.to_string(), "could not read log");
                return None;
            }
        };
        parse_log(&String::from_utf8_lossy(&data)).filter(|a| !a.as_str().is_empty())
    }

    /// Forget the last seen modification time, so the next poll re-reads the log.
    pub fn forget(&mut self) {
        self.last_mtime = None;
    }
}
