use std::path::PathBuf;

use digimv_engine::MasterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    /// File cannot be parsed as tabular data. Aborts that file only.
    #[error("{file}: cannot read as a table: {reason}")]
    MalformedFile { file: String, reason: String },

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write workbook: {0}")]
    Write(String),

    #[error(transparent)]
    Master(#[from] MasterError),
}

impl IoError {
    pub(crate) fn malformed(file: &str, reason: impl std::fmt::Display) -> Self {
        Self::MalformedFile {
            file: file.to_string(),
            reason: reason.to_string(),
        }
    }
}
