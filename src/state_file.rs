use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::NamedTempFile;

use crate::error::PublishError;
use crate::types::PublishedState;

/// File name of the published document inside the data directory.
pub const STATE_FILE_NAME: &str = "current_study.json";

/// Writes the [PublishedState] document for downstream consumers.
///
/// Every write goes to a temporary file in the data directory which is then renamed
/// over the document, so readers see either the old or the new document, never a
/// partial one.
pub struct StatePublisher {
    data_dir: Utf8PathBuf,
    path: Utf8PathBuf,
}

impl StatePublisher {
    pub fn new<P: AsRef<Utf8Path>>(data_dir: P) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        let path = data_dir.join(STATE_FILE_NAME);
        Self { data_dir, path }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Replace the published document with `state`.
    pub fn publish(&self, state: &PublishedState) -> Result<(), PublishError> {
        let mut staging = self.staging_file()?;
        serde_json::to_writer(&mut staging, state)?;
        staging.flush()?;
        staging.as_file().sync_all()?;
        staging
            .persist(&self.path)
            .map_err(|source| PublishError::Persist {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(path = self.path.as_str(), empty = state.is_empty(), "published");
        Ok(())
    }

    /// A new temporary file next to the document, removed on drop unless persisted.
    pub(crate) fn staging_file(&self) -> std::io::Result<NamedTempFile> {
        fs_err::create_dir_all(&self.data_dir)?;
        tempfile::Builder::new()
            .prefix(".current_study")
            .suffix(".tmp")
            .tempfile_in(&self.data_dir)
    }
}

/// Read a published document the way a downstream consumer does.
///
/// A missing or malformed document is reported as [None].
pub fn read_published<P: AsRef<Utf8Path>>(path: P) -> Option<PublishedState> {
    let data = fs_err::read(path.as_ref()).ok()?;
    serde_json::from_slice(&data).ok()
}
