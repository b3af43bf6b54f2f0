//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// The range spans more months than a trend report covers.
    #[error("Range spans {months} months; at most {max} are supported")]
    RangeTooLong {
        /// Months in the requested range.
        months: usize,
        /// Supported maximum.
        max: usize,
    },
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::RangeTooLong { .. } => "RANGE_TOO_LONG",
        }
    }

    /// Returns the taxonomy kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDateRange { .. } | Self::RangeTooLong { .. } => ErrorKind::Validation,
        }
    }
}
