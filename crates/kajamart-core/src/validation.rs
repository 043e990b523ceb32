//! # Validation Module
//!
//! Input validation for the returns screens.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Free-text input (search boxes, quantity fields)              │
//! │  ├── validate_search_term, quantity::parse_quantity                    │
//! │  └── One typed result per field, no ad hoc regex stripping             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Backend records entering the workflow                        │
//! │  ├── SaleRecord::validate, validate_unit_price                         │
//! │  └── Preconditions the settlement calculator relies on                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Workflow rules (workflow.rs)                                 │
//! │  └── Phase checks, confirmation precondition                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::MAX_SEARCH_TERM_LEN;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a sale or product search term.
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - Must not be empty (an empty lookup would fetch everything)
/// - At most 100 characters
///
/// ## Returns
/// The trimmed term.
///
/// ## Example
/// ```rust
/// use kajamart_core::validation::validate_search_term;
///
/// assert_eq!(validate_search_term("  Ana Gómez ").unwrap(), "Ana Gómez");
/// assert!(validate_search_term("   ").is_err());
/// ```
pub fn validate_search_term(term: &str) -> ValidationResult<String> {
    let term = term.trim();

    if term.is_empty() {
        return Err(ValidationError::Required {
            field: "search term".to_string(),
        });
    }

    if term.chars().count() > MAX_SEARCH_TERM_LEN {
        return Err(ValidationError::TooLong {
            field: "search term".to_string(),
            max: MAX_SEARCH_TERM_LEN,
        });
    }

    Ok(term.to_string())
}

/// Validates a free-text note attached to a return or write-off.
///
/// Blank notes collapse to `None`.
pub fn normalize_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    match notes.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.chars().count() > 500 => Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: 500,
        }),
        Some(text) => Ok(Some(text.to_string())),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (promotional items)
///
/// ## Example
/// ```rust
/// use kajamart_core::money::Money;
/// use kajamart_core::validation::validate_unit_price;
///
/// assert!(validate_unit_price(Money::from_minor(35500)).is_ok());
/// assert!(validate_unit_price(Money::zero()).is_ok());
/// assert!(validate_unit_price(Money::from_minor(-1)).is_err());
/// ```
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "unit price".to_string(),
        });
    }

    Ok(())
}

/// Validates a quantity for a line that must hold at least one unit.
pub fn validate_positive_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
