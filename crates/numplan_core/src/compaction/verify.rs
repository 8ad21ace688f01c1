//! Exactness check for compacted prefixes.
//!
//! The Stage D cardinality check telescopes and cannot see gaps or
//! overlaps. [`verify_exact`] expands every prefix to the interval of full
//! numbers it denotes and walks them in order.

use crate::digits::pow10;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Why a prefix set does not denote exactly the expected range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageDefect {
    /// The set is empty.
    Empty,
    /// A prefix is longer than a full number or not made of digits.
    InvalidPrefix(String),
    /// Numbers between two prefixes are not covered.
    Gap {
        /// First uncovered number.
        from: u64,
        /// Last uncovered number.
        to: u64,
    },
    /// Two prefixes denote intersecting sets.
    Overlap {
        /// First number covered twice.
        at: u64,
    },
    /// The covered interval does not start or end where the range does.
    Bounds {
        /// First number covered.
        first: u64,
        /// Last number covered.
        last: u64,
    },
}

impl fmt::Display for CoverageDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no prefixes"),
            Self::InvalidPrefix(p) => write!(f, "invalid prefix {p:?}"),
            Self::Gap { from, to } => write!(f, "numbers {from}..={to} not covered"),
            Self::Overlap { at } => write!(f, "number {at} covered twice"),
            Self::Bounds { first, last } => write!(f, "covers {first}..={last}"),
        }
    }
}

/// Full numbers denoted by `prefix` at `number_width`.
///
/// Returns `None` for prefixes longer than `number_width` or containing
/// non-digits.
#[must_use]
pub fn expand(prefix: &str, number_width: usize) -> Option<RangeInclusive<u64>> {
    if prefix.len() > number_width || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u64 = if prefix.is_empty() {
        0
    } else {
        prefix.parse().ok()?
    };
    let scale = pow10(number_width - prefix.len());
    let first = value * scale;
    Some(first..=first + scale - 1)
}

/// Checks that `prefixes` denote exactly `range` with no overlaps.
///
/// # Errors
///
/// Returns the first [`CoverageDefect`] found, in ascending number order.
pub fn verify_exact<S: AsRef<str>>(
    prefixes: &[S],
    range: RangeInclusive<u64>,
    number_width: usize,
) -> Result<(), CoverageDefect> {
    let mut spans = Vec::with_capacity(prefixes.len());
    for prefix in prefixes {
        let prefix = prefix.as_ref();
        spans.push(
            expand(prefix, number_width)
                .ok_or_else(|| CoverageDefect::InvalidPrefix(prefix.to_string()))?,
        );
    }
    spans.sort_by_key(|s| *s.start());

    let (Some(head), Some(tail)) = (spans.first(), spans.last()) else {
        return Err(CoverageDefect::Empty);
    };
    let max_end = spans.iter().map(|s| *s.end()).max().unwrap_or(*tail.end());
    if *head.start() != *range.start() || max_end != *range.end() {
        return Err(CoverageDefect::Bounds {
            first: *head.start(),
            last: max_end,
        });
    }

    for pair in spans.windows(2) {
        let (prev_end, next_start) = (*pair[0].end(), *pair[1].start());
        if next_start <= prev_end {
            return Err(CoverageDefect::Overlap { at: next_start });
        }
        if next_start > prev_end + 1 {
            return Err(CoverageDefect::Gap {
                from: prev_end + 1,
                to: next_start - 1,
            });
        }
    }
    Ok(())
}
