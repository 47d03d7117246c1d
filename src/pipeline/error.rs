use std::path::PathBuf;
use thiserror::Error;

/// Errors that end one file's run. Per-identifier problems never get here.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("{path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("template {0} has no header row")]
    EmptyTemplate(PathBuf),

    #[error("{0} contains no product identifiers")]
    EmptyInput(PathBuf),

    #[error("no products could be imported from {0}")]
    NoRowsImported(PathBuf),

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Setup(#[from] anyhow::Error),
}
