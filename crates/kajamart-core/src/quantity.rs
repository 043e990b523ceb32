//! # Quantity Rules
//!
//! Clamped increment/decrement and the single validated parse for quantity
//! fields.
//!
//! ## Bounds Per Line Kind
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Line kind            min    max                                        │
//! │  ───────────────────  ─────  ─────────────────────────────────────      │
//! │  Returned item        0      quantity bought in the original sale       │
//! │  Replacement item     1      stock on hand, or unbounded if untracked   │
//! │  Write-off line       1      stock on hand                              │
//! │                                                                         │
//! │  Out-of-range input is never an error: it snaps to the nearest bound.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};

// =============================================================================
// Bounds
// =============================================================================

/// Inclusive range a quantity is clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityBounds {
    pub min: i64,
    /// `None` means no upper bound.
    pub max: Option<i64>,
}

impl QuantityBounds {
    /// Bounds for a returned line: `[0, original_quantity]`.
    pub const fn returned(original_quantity: i64) -> Self {
        QuantityBounds {
            min: 0,
            max: Some(original_quantity),
        }
    }

    /// Bounds for a replacement line: `[1, stock]`, unbounded without stock.
    ///
    /// Removing a replacement is its own operation, so decrement stops at 1.
    pub const fn replacement(stock: Option<i64>) -> Self {
        QuantityBounds { min: 1, max: stock }
    }

    /// Clamps a value into the bounds.
    ///
    /// A `max` below `min` collapses to `min`.
    pub fn clamp(&self, value: i64) -> i64 {
        let value = value.max(self.min);
        match self.max {
            Some(max) => value.min(max.max(self.min)),
            None => value,
        }
    }
}

// =============================================================================
// Adjustment
// =============================================================================

/// Applies `delta` to `current` and clamps the result into `bounds`.
///
/// ## User Workflow
/// ```text
/// Bought 3, marked 3 for return, user taps "+"
///      │
///      ▼
/// adjust_quantity(3, +1, [0, 3]) ← THIS FUNCTION
///      │
///      ▼
/// 3 (unchanged, no error)
/// ```
///
/// ## Example
/// ```rust
/// use kajamart_core::quantity::{adjust_quantity, QuantityBounds};
///
/// assert_eq!(adjust_quantity(3, 1, QuantityBounds::returned(3)), 3);
/// assert_eq!(adjust_quantity(0, -1, QuantityBounds::returned(3)), 0);
/// assert_eq!(adjust_quantity(1, -1, QuantityBounds::replacement(None)), 1);
/// ```
pub fn adjust_quantity(current: i64, delta: i64, bounds: QuantityBounds) -> i64 {
    bounds.clamp(current.saturating_add(delta))
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses a quantity typed into a text field.
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - Only ASCII digits are accepted: no sign, no decimal point, no separators
/// - Values beyond `i64::MAX` are rejected
///
/// The result is not clamped; callers feed it through the line's bounds.
///
/// ## Example
/// ```rust
/// use kajamart_core::quantity::parse_quantity;
///
/// assert_eq!(parse_quantity(" 12 ").unwrap(), 12);
/// assert!(parse_quantity("-1").is_err());
/// assert!(parse_quantity("1.5").is_err());
/// assert!(parse_quantity("").is_err());
/// ```
pub fn parse_quantity(input: &str) -> ValidationResult<i64> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::Required {
            field: "quantity".to_string(),
        });
    }

    if !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: "must be a whole number without signs or separators".to_string(),
        });
    }

    input.parse::<i64>().map_err(|_| ValidationError::OutOfRange {
        field: "quantity".to_string(),
        min: 0,
        max: i64::MAX,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_within_bounds() {
        let bounds = QuantityBounds::returned(5);
        assert_eq!(adjust_quantity(2, 1, bounds), 3);
        assert_eq!(adjust_quantity(2, -1, bounds), 1);
        assert_eq!(adjust_quantity(2, 0, bounds), 2);
    }

    #[test]
    fn test_adjust_at_max_stays_at_max() {
        // original_quantity = 3, already returning 3
        assert_eq!(adjust_quantity(3, 1, QuantityBounds::returned(3)), 3);
    }

    #[test]
    fn test_adjust_at_min_stays_at_min() {
        assert_eq!(adjust_quantity(0, -1, QuantityBounds::returned(3)), 0);
        assert_eq!(adjust_quantity(1, -1, QuantityBounds::replacement(Some(9))), 1);
    }

    #[test]
    fn test_large_deltas_clamp() {
        let bounds = QuantityBounds::returned(4);
        assert_eq!(adjust_quantity(1, 100, bounds), 4);
        assert_eq!(adjust_quantity(1, -100, bounds), 0);
        assert_eq!(adjust_quantity(i64::MAX, i64::MAX, bounds), 4);
        assert_eq!(adjust_quantity(i64::MIN, -1, bounds), 0);
    }

    #[test]
    fn test_replacement_unbounded_without_stock() {
        let bounds = QuantityBounds::replacement(None);
        assert_eq!(adjust_quantity(1, 500, bounds), 501);
        assert_eq!(adjust_quantity(i64::MAX, 1, bounds), i64::MAX);
    }

    #[test]
    fn test_replacement_bounded_by_stock() {
        let bounds = QuantityBounds::replacement(Some(2));
        assert_eq!(adjust_quantity(2, 1, bounds), 2);
    }

    #[test]
    fn test_inverted_bounds_collapse_to_min() {
        let bounds = QuantityBounds::replacement(Some(0));
        assert_eq!(bounds.clamp(5), 1);
        assert_eq!(bounds.clamp(-5), 1);
    }

    #[test]
    fn test_parse_quantity_accepts_digits() {
        assert_eq!(parse_quantity("0").unwrap(), 0);
        assert_eq!(parse_quantity("007").unwrap(), 7);
        assert_eq!(parse_quantity("\t42\n").unwrap(), 42);
    }

    #[test]
    fn test_parse_quantity_rejects_malformed() {
        assert!(matches!(
            parse_quantity(""),
            Err(ValidationError::Required { .. })
        ));
        for bad in ["+3", "-3", "3.0", "1,000", "1 000", "tres", "٣", "3e2"] {
            assert!(
                matches!(parse_quantity(bad), Err(ValidationError::InvalidFormat { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_quantity_overflow() {
        assert!(matches!(
            parse_quantity("99999999999999999999"),
            Err(ValidationError::OutOfRange { .. })
        ));
    }
}
