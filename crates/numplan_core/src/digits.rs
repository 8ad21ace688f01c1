//! Fixed-width digit strings.
//!
//! Every number in a numbering plan has the same total width, split into a
//! leading prefix and a trailing sub-range. Digit strings are compared as
//! equal-width strings, never as integers, so leading zeros survive.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Largest total width for which every number fits in a `u64`.
pub const MAX_NUMBER_WIDTH: usize = 18;

/// Digit widths shared by every row of a reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberLayout {
    prefix_width: usize,
    number_width: usize,
}

impl Default for NumberLayout {
    fn default() -> Self {
        Self {
            prefix_width: 3,
            number_width: 10,
        }
    }
}

impl NumberLayout {
    /// Creates a layout.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidLayout`] unless
    /// `0 < prefix_width < number_width <= MAX_NUMBER_WIDTH`.
    pub fn new(prefix_width: usize, number_width: usize) -> CoreResult<Self> {
        if prefix_width == 0 || prefix_width >= number_width || number_width > MAX_NUMBER_WIDTH {
            return Err(CoreError::InvalidLayout {
                prefix_width,
                number_width,
            });
        }
        Ok(Self {
            prefix_width,
            number_width,
        })
    }

    /// Width of the row prefix.
    #[must_use]
    pub const fn prefix_width(&self) -> usize {
        self.prefix_width
    }

    /// Width of a full number.
    #[must_use]
    pub const fn number_width(&self) -> usize {
        self.number_width
    }

    /// Width of the trailing sub-range (`low`/`high`).
    #[must_use]
    pub const fn tail_width(&self) -> usize {
        self.number_width - self.prefix_width
    }

    /// Validates a full number and splits it into `(prefix, tail)`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedInput`] if `number` is not exactly
    /// `number_width` ASCII digits.
    pub fn split<'a>(&self, number: &'a str) -> CoreResult<(&'a str, &'a str)> {
        validate_digits("number", number, self.number_width)?;
        Ok(number.split_at(self.prefix_width))
    }
}

/// Checks that `value` is exactly `width` ASCII digits.
///
/// # Errors
///
/// Returns [`CoreError::MalformedInput`] naming `field` otherwise.
pub fn validate_digits(field: &'static str, value: &str, width: usize) -> CoreResult<()> {
    if value.len() != width {
        return Err(CoreError::malformed(
            field,
            value,
            format!("expected {} digits, got {}", width, value.len()),
        ));
    }
    if let Some(c) = value.chars().find(|c| !c.is_ascii_digit()) {
        return Err(CoreError::malformed(
            field,
            value,
            format!("non-digit character {c:?}"),
        ));
    }
    Ok(())
}

/// Left-pads an all-digit string with zeros up to `width`.
///
/// Longer strings and strings with non-digits are returned unchanged so the
/// subsequent validation reports them.
#[must_use]
pub fn zero_pad(value: &str, width: usize) -> String {
    if value.len() >= width || !value.bytes().all(|b| b.is_ascii_digit()) {
        return value.to_string();
    }
    format!("{value:0>width$}")
}

/// Parses an all-digit string. Empty strings parse as zero.
///
/// Callers validate content first; anything else is reported as malformed.
pub(crate) fn parse_digits(field: &'static str, value: &str) -> CoreResult<u64> {
    if value.is_empty() {
        return Ok(0);
    }
    if value.len() > MAX_NUMBER_WIDTH || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::malformed(field, value, "not a digit string"));
    }
    value
        .parse::<u64>()
        .map_err(|e| CoreError::malformed(field, value, e.to_string()))
}

/// Renders `value` as exactly `width` digits.
///
/// A zero width renders the empty prefix.
#[must_use]
pub fn render(value: u64, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    format!("{value:0width$}")
}

/// `10^exp` for exponents up to [`MAX_NUMBER_WIDTH`].
#[must_use]
pub const fn pow10(exp: usize) -> u64 {
    10u64.pow(exp as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let layout = NumberLayout::default();
        assert_eq!(layout.prefix_width(), 3);
        assert_eq!(layout.tail_width(), 7);
    }

    #[test]
    fn rejects_degenerate_layouts() {
        assert!(NumberLayout::new(0, 10).is_err());
        assert!(NumberLayout::new(10, 10).is_err());
        assert!(NumberLayout::new(3, 19).is_err());
        assert!(NumberLayout::new(4, 11).is_ok());
    }

    #[test]
    fn split_number() {
        let layout = NumberLayout::default();
        let (prefix, tail) = layout.split("9505998693").unwrap();
        assert_eq!(prefix, "950");
        assert_eq!(tail, "5998693");
    }

    #[test]
    fn split_rejects_bad_numbers() {
        let layout = NumberLayout::default();
        assert!(layout.split("950599869").is_err());
        assert!(layout.split("95059986931").is_err());
        assert!(layout.split("95059x8693").is_err());
        assert!(layout.split("").is_err());
    }

    #[test]
    fn zero_pad_keeps_leading_zeros() {
        assert_eq!(zero_pad("42", 7), "0000042");
        assert_eq!(zero_pad("0000042", 7), "0000042");
        assert_eq!(zero_pad("12345678", 7), "12345678");
        assert_eq!(zero_pad("4x", 7), "4x");
    }

    #[test]
    fn render_pads() {
        assert_eq!(render(42, 5), "00042");
        assert_eq!(render(0, 0), "");
        assert_eq!(pow10(3), 1000);
    }

    #[test]
    fn parse_empty_is_zero() {
        assert_eq!(parse_digits("low", "").unwrap(), 0);
        assert_eq!(parse_digits("low", "0099").unwrap(), 99);
        assert!(parse_digits("low", "9a").is_err());
    }
}
