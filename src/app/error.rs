use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("root {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("invalid glob pattern `{pattern}`")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to write {path}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path} while archiving")]
    ArchiveInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archive {0} already exists")]
    ArchiveExists(PathBuf),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, BundleError>;
