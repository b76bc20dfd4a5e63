use std::path::PathBuf;

use crate::db::RepoError;

/// A single source row that could not be imported. The run carries on.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("column 6 (station payload) is missing or blank")]
    MissingPayload,

    #[error("invalid station payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("column {column}: {value:?} is not a valid count")]
    Count { column: usize, value: String },

    #[error("unreadable record: {0}")]
    Record(#[from] csv::Error),

    #[error(transparent)]
    Store(#[from] RepoError),
}

/// Row passed decoding but carries no usable station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("empty station code")]
    MissingCode,

    #[error("latitude is 0")]
    MissingLatitude,

    #[error("longitude is 0")]
    MissingLongitude,
}

/// The source as a whole could not be read; nothing was imported.
#[derive(Debug, thiserror::Error)]
pub enum IngestSourceError {
    #[error("cannot read ingestion source {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("ingestion source unreadable: {0}")]
    Csv(#[from] csv::Error),

    #[error("store unavailable: {0}")]
    Store(#[from] RepoError),
}
