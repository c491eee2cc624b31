//! MASTER file transformer
//!
//! Streams the MASTER file row by row through a [`RecordNormalizer`] and
//! collects the records that pass. Bad rows are tallied, never fatal.

use std::fmt;
use std::io::Read;
use std::path::Path;

use tport_common::schema::UnifiedRecord;
use tracing::{debug, info};

use crate::error::{EtlError, Result};
use crate::normalize::{RecordNormalizer, RejectReason, RejectionStats};

/// A progress line is logged after this many rows
pub const PROGRESS_INTERVAL: usize = 10_000;

/// Counters for one transformation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Data rows read, header excluded
    pub rows_read: usize,
    pub transformed: usize,
    pub rejections: RejectionStats,
}

impl TransformStats {
    pub fn rejected(&self) -> usize {
        self.rejections.total()
    }
}

impl fmt::Display for TransformStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows read, {} transformed, {} rejected",
            self.rows_read,
            self.transformed,
            self.rejected()
        )?;
        for (reason, count) in self.rejections.iter() {
            write!(f, ", {}={}", reason, count)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct TransformOutput {
    pub records: Vec<UnifiedRecord>,
    pub stats: TransformStats,
}

pub struct FaaTransformer<N> {
    normalizer: N,
}

impl<N: RecordNormalizer> FaaTransformer<N> {
    pub fn new(normalizer: N) -> Self {
        Self { normalizer }
    }

    /// Transform a MASTER file, stopping after `limit` data rows when given
    pub fn transform_file(&self, path: &Path, limit: Option<usize>) -> Result<TransformOutput> {
        if !path.exists() {
            return Err(EtlError::SourceFileMissing(path.display().to_string()));
        }

        info!(
            source = %self.normalizer.source(),
            path = %path.display(),
            limit = ?limit,
            "Transforming master file"
        );

        let file = std::fs::File::open(path)?;
        let output = self.transform_reader(file, limit)?;

        info!(source = %self.normalizer.source(), "Transformation finished: {}", output.stats);
        Ok(output)
    }

    /// Transform rows from any reader; the first row is the header
    pub fn transform_reader<R: Read>(&self, reader: R, limit: Option<usize>) -> Result<TransformOutput> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        let mut stats = TransformStats::default();
        let mut raw = csv::ByteRecord::new();

        loop {
            if limit.is_some_and(|limit| stats.rows_read >= limit) {
                debug!("Reached row limit of {}", stats.rows_read);
                break;
            }

            match csv_reader.read_byte_record(&mut raw) {
                Ok(false) => break,
                Ok(true) => {
                    stats.rows_read += 1;

                    let columns: Vec<String> = raw
                        .iter()
                        .map(|field| String::from_utf8_lossy(field).into_owned())
                        .collect();
                    let row: Vec<&str> = columns.iter().map(String::as_str).collect();

                    match self.normalizer.normalize(&row) {
                        Ok(record) => {
                            records.push(record);
                            stats.transformed += 1;
                        },
                        Err(rejected) => {
                            debug!(row = stats.rows_read, "Rejected row: {}", rejected);
                            stats.rejections.record(rejected.reason);
                        },
                    }
                },
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    stats.rows_read += 1;
                    debug!(row = stats.rows_read, error = %e, "Unreadable row");
                    stats.rejections.record(RejectReason::Unreadable);
                },
            }

            if stats.rows_read > 0 && stats.rows_read % PROGRESS_INTERVAL == 0 {
                info!(
                    rows = stats.rows_read,
                    transformed = stats.transformed,
                    rejected = stats.rejected(),
                    "Transformation progress"
                );
            }
        }

        Ok(TransformOutput { records, stats })
    }
}
