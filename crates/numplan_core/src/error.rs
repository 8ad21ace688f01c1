//! Error types for numplan core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that abort a unit of work.
///
/// Advisory findings (unknown numbers, unresolved regions, cardinality
/// mismatches under the default policy) are not errors; they are collected
/// in a [`crate::BuildReport`] instead.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A digit string has the wrong width or contains non-digit characters.
    #[error("malformed {field}: {value:?} ({reason})")]
    MalformedInput {
        /// Name of the offending field.
        field: &'static str,
        /// The value as supplied.
        value: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The number layout itself is unusable.
    #[error("invalid layout: prefix width {prefix_width}, number width {number_width}")]
    InvalidLayout {
        /// Requested prefix width.
        prefix_width: usize,
        /// Requested full number width.
        number_width: usize,
    },

    /// Two rows with the same prefix cover intersecting ranges.
    #[error("overlapping ranges under prefix {prefix}: [{first_low}, {first_high}] and [{second_low}, {second_high}]")]
    OverlappingRanges {
        /// Shared prefix.
        prefix: String,
        /// Low bound of the earlier row.
        first_low: String,
        /// High bound of the earlier row.
        first_high: String,
        /// Low bound of the later row.
        second_low: String,
        /// High bound of the later row.
        second_high: String,
    },

    /// The cardinality self-check failed and the policy treats it as fatal.
    #[error("compaction mismatch for {prefix}[{low}, {high}]: capacity {capacity}, implied {implied}")]
    CompactionMismatch {
        /// Row prefix.
        prefix: String,
        /// Row low bound.
        low: String,
        /// Row high bound.
        high: String,
        /// Declared capacity.
        capacity: u64,
        /// Cardinality implied by the compacted prefixes.
        implied: u64,
    },

    /// A worker thread panicked during a parallel build.
    #[error("worker failed: {message}")]
    WorkerFailed {
        /// Description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Creates a malformed input error.
    pub fn malformed(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedInput {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Creates a worker failure error.
    pub fn worker_failed(message: impl Into<String>) -> Self {
        Self::WorkerFailed {
            message: message.into(),
        }
    }

    /// Returns true for errors that only affect a single row.
    ///
    /// The planner skips such rows and records them in its report instead of
    /// aborting the whole build.
    #[must_use]
    pub fn is_row_local(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_message_names_field() {
        let err = CoreError::malformed("low", "12a4", "non-digit character");
        let msg = err.to_string();
        assert!(msg.contains("low"));
        assert!(msg.contains("12a4"));
        assert!(err.is_row_local());
    }

    #[test]
    fn mismatch_is_not_row_local() {
        let err = CoreError::CompactionMismatch {
            prefix: "901".into(),
            low: "0000000".into(),
            high: "0000009".into(),
            capacity: 11,
            implied: 10,
        };
        assert!(!err.is_row_local());
        assert!(err.to_string().contains("capacity 11"));
    }
}
