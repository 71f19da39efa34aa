use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that stop a run before any file is touched.
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("invalid rewrite rule '{legacy}': {reason}")]
    InvalidRule { legacy: String, reason: String },

    #[error("invalid pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
