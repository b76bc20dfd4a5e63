//! One-shot import of the station catalog from the tabular export.
//!
//! The import only runs against an empty store. Rows are independent: a bad
//! row is counted and skipped, it never aborts the run. Only the first
//! [`MAX_DIAGNOSTICS`] failures are logged and kept in the report.

pub mod error;
pub mod row;

use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use tracing::{debug, error, info, instrument, warn};

use crate::config::IngestConfig;
use crate::stations::repo::StationRepository;

pub use error::{IngestSourceError, RowError};
use row::{parse_row, RowOutcome};

pub const MAX_DIAGNOSTICS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDiagnostic {
    /// Zero-based record index in the source.
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub imported: u64,
    pub errors: u64,
    pub skipped: u64,
    pub diagnostics: Vec<RowDiagnostic>,
}

impl IngestReport {
    fn fail(&mut self, row: usize, err: RowError) {
        self.errors += 1;
        if self.diagnostics.len() < MAX_DIAGNOSTICS {
            warn!(row, error = %err, "row rejected");
            self.diagnostics.push(RowDiagnostic {
                row,
                message: err.to_string(),
            });
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The store already held `existing` stations; nothing was read.
    AlreadyPopulated { existing: i64 },
    Completed(IngestReport),
}

impl IngestOutcome {
    pub fn imported(&self) -> u64 {
        match self {
            IngestOutcome::AlreadyPopulated { .. } => 0,
            IngestOutcome::Completed(report) => report.imported,
        }
    }
}

/// Imports `path` unless the store already has stations.
#[instrument(skip(path, stations), fields(path = %path.display()))]
pub async fn ingest_path(
    path: &Path,
    delimiter: u8,
    stations: &dyn StationRepository,
) -> Result<IngestOutcome, IngestSourceError> {
    let existing = stations.count().await?;
    if existing > 0 {
        return Ok(IngestOutcome::AlreadyPopulated { existing });
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| IngestSourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(IngestOutcome::Completed(
        load(bytes.as_slice(), delimiter, stations).await?,
    ))
}

/// Same as [`ingest_path`] over any byte source.
pub async fn ingest_reader<R: std::io::Read>(
    source: R,
    delimiter: u8,
    stations: &dyn StationRepository,
) -> Result<IngestOutcome, IngestSourceError> {
    let existing = stations.count().await?;
    if existing > 0 {
        return Ok(IngestOutcome::AlreadyPopulated { existing });
    }
    Ok(IngestOutcome::Completed(
        load(source, delimiter, stations).await?,
    ))
}

/// Streams records into an empty store; callers check the store first.
async fn load<R: std::io::Read>(
    source: R,
    delimiter: u8,
    stations: &dyn StationRepository,
) -> Result<IngestReport, IngestSourceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(source);

    let mut report = IngestReport::default();
    let mut record = ByteRecord::new();
    let mut index = 0usize;
    loop {
        match reader.read_byte_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                report.fail(index, RowError::Record(e));
                index += 1;
                continue;
            }
        }

        match parse_row(&record) {
            Ok(RowOutcome::Station(station)) => match stations.insert(station).await {
                Ok(_) => report.imported += 1,
                Err(e) => report.fail(index, e.into()),
            },
            Ok(RowOutcome::Skipped(reason)) => {
                debug!(row = index, %reason, "row skipped");
                report.skipped += 1;
            }
            Err(e) => report.fail(index, e),
        }
        index += 1;
    }

    info!(
        rows = index,
        imported = report.imported,
        errors = report.errors,
        skipped = report.skipped,
        "ingestion finished"
    );
    Ok(report)
}

/// Startup hook: imports the configured source and never fails the process.
pub async fn run_at_startup(config: &IngestConfig, stations: &dyn StationRepository) {
    match ingest_path(&config.source, config.delimiter, stations).await {
        Ok(IngestOutcome::AlreadyPopulated { existing }) => {
            info!(existing, "stations already imported; skipping ingestion");
        }
        Ok(outcome) => {
            if let IngestOutcome::Completed(report) = &outcome {
                if report.errors > 0 {
                    warn!(
                        imported = outcome.imported(),
                        errors = report.errors,
                        "some rows were ignored (invalid data)"
                    );
                }
            }
        }
        Err(e) => {
            error!(error = %e, "ingestion failed; starting with an empty store");
        }
    }
}
