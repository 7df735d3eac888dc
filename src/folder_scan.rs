use camino::{Utf8Path, Utf8PathBuf};
use std::time::SystemTime;

/// Whether a folder name looks like a DICOM UID (e.g. `1.2.840.113619...`).
///
/// The viewer names study folders after their UIDs. Named folders such as spool or
/// temp directories never match.
pub(crate) fn looks_like_uid(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_digit()) && name.contains('.')
}

/// The `limit` most recently modified UID-named folders directly under `cache_dir`,
/// newest first.
///
/// An unreadable cache directory yields no candidates. Entries whose metadata cannot
/// be read are skipped.
pub(crate) fn recent_study_folders(cache_dir: &Utf8Path, limit: usize) -> Vec<Utf8PathBuf> {
    let entries = match fs_err::read_dir(cache_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(error = e.to_string(), "cache directory not readable");
            return Vec::new();
        }
    };
    let mut folders: Vec<(SystemTime, Utf8PathBuf)> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_str().is_some_and(looks_like_uid))
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            if !metadata.is_dir() {
                return None;
            }
            let path = Utf8PathBuf::from_path_buf(entry.path()).ok()?;
            Some((metadata.modified().ok()?, path))
        })
        .collect();
    folders.sort_by(|a, b| b.0.cmp(&a.0));
    folders
        .into_iter()
        .take(limit)
        .map(|(_, path)| path)
        .collect()
}
