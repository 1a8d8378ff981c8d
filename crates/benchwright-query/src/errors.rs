use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by the query engine.
///
/// Structural problems (arity, unknown function, missing files or path
/// segments) fail the whole evaluation; the dispatcher wraps them in
/// [`QueryError::Call`] so template authors can locate the offending
/// placeholder.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("{function} expects {expected} argument(s), got {actual}")]
    Arity {
        function: &'static str,
        expected: &'static str,
        actual: usize,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Component(#[from] benchwright_core::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("xml error: {0}")]
    Xml(String),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("in {call}: {source}")]
    Call {
        call: String,
        #[source]
        source: Box<QueryError>,
    },
}
