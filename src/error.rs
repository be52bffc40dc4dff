use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures loading or validating a classifier artifact.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model declares {columns} columns but {coefficients} coefficients")]
    ShapeMismatch { columns: usize, coefficients: usize },

    #[error("model declares no feature columns")]
    NoColumns,

    #[error("duplicate feature column: {0}")]
    DuplicateColumn(String),

    #[error("non-finite weight for {0}")]
    NonFiniteWeight(String),
}
