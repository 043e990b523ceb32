//! # kajamart-core: Returns Business Logic for Kajamart
//!
//! Pure logic behind the return/exchange and write-off screens. No I/O, no
//! logging, no clock reads: everything here is a deterministic function of
//! its inputs.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kajamart Returns                                 │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    SPA Front End                                │   │
//! │  │    Sale search ──► Return quantities ──► Exchange ──► Review    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 kajamart-client                                 │   │
//! │  │    ReturnSession, WriteOffSession, HttpBackend, config          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kajamart-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌────────────┐ ┌──────────────┐    │   │
//! │  │   │  money   │ │ quantity │ │ settlement │ │   workflow   │    │   │
//! │  │   │  Money   │ │  clamp   │ │ refund vs  │ │   reducer    │    │   │
//! │  │   │  format  │ │  parse   │ │  collect   │ │   phases     │    │   │
//! │  │   └──────────┘ └──────────┘ └────────────┘ └──────────────┘    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer money and the currency formatter
//! - [`types`] - Sale/product records and return line items
//! - [`quantity`] - Clamped quantity adjustment and validated parsing
//! - [`settlement`] - Line totals and the refund/collect calculation
//! - [`workflow`] - Return screen state machine as a reducer
//! - [`writeoff`] - Damaged/expired stock write-off drafts
//! - [`validation`] - Field and record validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use kajamart_core::money::Money;
//! use kajamart_core::settlement::settle;
//!
//! // Returned 1 × $ 10.000, took 1 × $ 65.000
//! let result = settle(Money::from_minor(10000), Money::from_minor(65000));
//! assert_eq!(result.amount_to_collect.minor(), 55000);
//! assert!(result.amount_to_refund.is_zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod quantity;
pub mod settlement;
pub mod types;
pub mod validation;
pub mod workflow;
pub mod writeoff;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{CurrencyFormat, Money, MAX_DECIMALS};
pub use settlement::{compute_settlement, line_total, SettlementOutcome, SettlementResult};
pub use types::*;
pub use workflow::{reduce, ReturnAction, ReturnState, WorkflowPhase};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Longest accepted sale/product search term, in characters.
pub const MAX_SEARCH_TERM_LEN: usize = 100;
