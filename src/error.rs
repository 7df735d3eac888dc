use camino::Utf8PathBuf;

/// Failure to read demographics from a single study file.
#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Read(#[from] dicom::object::ReadError),

    #[error("file is too small to be a study file ({0} bytes)")]
    TooSmall(u64),
}

/// Failure to publish the state document. The previously published document is left
/// untouched when this happens.
#[derive(thiserror::Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("could not replace {path}: {source}")]
    Persist {
        path: Utf8PathBuf,
        source: tempfile::PersistError,
    },
}

#[derive(thiserror::Error, Debug)]
#[error("{0}")]
pub struct HandleLoopError(pub &'static str);
