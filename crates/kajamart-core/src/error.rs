//! # Error Types
//!
//! Domain-specific error types for kajamart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kajamart-core errors (this file)                                      │
//! │  ├── CoreError        - Workflow and business rule violations          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kajamart-client errors (separate crate)                               │
//! │  ├── ClientError      - REST boundary / config failures                │
//! │  └── UserNotice       - What the screen shows (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → UserNotice          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantities outside their bounds are never an error here: they are clamped
//! by [`crate::quantity::adjust_quantity`].

use thiserror::Error;

use crate::workflow::{ActionKind, WorkflowPhase};

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the return workflow and write-offs.
///
/// Every variant is recoverable: the caller keeps its previous state and
/// shows the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Confirmation attempted with nothing returned and nothing requested.
    ///
    /// ## User Workflow
    /// ```text
    /// Sale #1042 selected, all return quantities at 0, no replacements
    ///      │
    ///      ▼
    /// Confirm ──► NothingToConfirm ──► "Select at least one product"
    ///      │
    ///      ▼
    /// Workflow stays where it was
    /// ```
    #[error("Nothing to confirm: select at least one product to return or exchange")]
    NothingToConfirm,

    /// The action is not valid in the current workflow phase.
    #[error("Cannot {action} while {phase}")]
    ActionNotAllowed {
        action: ActionKind,
        phase: WorkflowPhase,
    },

    /// The workflow already reached Confirmed or Cancelled.
    #[error("Return session is already {0}")]
    SessionClosed(WorkflowPhase),

    /// Replacements were chosen but no unit is being returned.
    ///
    /// An all-zero return is not a return; the exchange needs at least one
    /// unit coming back.
    #[error("Mark at least one unit to return before confirming")]
    NoUnitsReturned,

    /// The product is inactive and cannot be handed out.
    #[error("Product {0} is not available")]
    ProductUnavailable(String),

    /// A line referenced by product id is not part of the transaction.
    #[error("Product {0} is not part of this transaction")]
    ItemNotFound(String),

    /// Not enough stock on hand to cover the request.
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business logic runs, mostly for free-text input and
/// records arriving from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., letters in a quantity field).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., the same product twice on one sale).
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
