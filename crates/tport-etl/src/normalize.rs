//! Record normalization seam
//!
//! A normalizer turns one raw source row into a validated
//! [`UnifiedRecord`] or a typed [`Rejected`]. It holds no state across rows
//! and never aborts the run on bad input.

use std::collections::BTreeMap;
use std::fmt;

use tport_common::schema::{DataSource, UnifiedRecord, ValidationError};

/// Why a row produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RejectReason {
    /// Fewer columns than the source layout requires
    TooFewColumns,
    /// The row repeats the file header
    HeaderRow,
    /// Natural key column is blank
    MissingKey,
    /// Field values failed schema validation
    Validation,
    /// The reader could not decode the row
    Unreadable,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::TooFewColumns => "too_few_columns",
            RejectReason::HeaderRow => "header_row",
            RejectReason::MissingKey => "missing_key",
            RejectReason::Validation => "validation",
            RejectReason::Unreadable => "unreadable",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub reason: RejectReason,
    pub detail: String,
}

impl Rejected {
    pub fn new(reason: RejectReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reason, self.detail)
    }
}

impl From<ValidationError> for Rejected {
    fn from(err: ValidationError) -> Self {
        Self::new(RejectReason::Validation, err.to_string())
    }
}

/// Maps raw rows of one provider to unified records
pub trait RecordNormalizer {
    /// Provider whose rows this normalizer understands
    fn source(&self) -> DataSource;

    fn normalize(&self, row: &[&str]) -> Result<UnifiedRecord, Rejected>;
}

/// Rejection counts keyed by reason
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectionStats {
    counts: BTreeMap<RejectReason, usize>,
}

impl RejectionStats {
    pub fn record(&mut self, reason: RejectReason) {
        *self.counts.entry(reason).or_insert(0) += 1;
    }

    pub fn count(&self, reason: RejectReason) -> usize {
        self.counts.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RejectReason, usize)> + '_ {
        self.counts.iter().map(|(reason, count)| (*reason, *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_stats() {
        let mut stats = RejectionStats::default();
        stats.record(RejectReason::TooFewColumns);
        stats.record(RejectReason::TooFewColumns);
        stats.record(RejectReason::Validation);

        assert_eq!(stats.count(RejectReason::TooFewColumns), 2);
        assert_eq!(stats.count(RejectReason::HeaderRow), 0);
        assert_eq!(stats.total(), 3);
        assert_eq!(stats.iter().count(), 2);
    }

    #[test]
    fn test_validation_error_becomes_rejection() {
        let rejected: Rejected = ValidationError::Missing("plane_data.n_number").into();
        assert_eq!(rejected.reason, RejectReason::Validation);
        assert!(rejected.to_string().starts_with("validation: "));
    }
}
