//! # Settlement Calculator
//!
//! Decides who owes whom when a customer returns goods and optionally takes
//! other goods in exchange.
//!
//! ## Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  returned_total    = Σ unit_price × return_quantity                     │
//! │  replacement_total = Σ unit_price × requested_quantity                  │
//! │  delta             = returned_total − replacement_total                 │
//! │                                                                         │
//! │  delta >= 0 ──► refund  delta   collect 0                               │
//! │  delta <  0 ──► refund  0       collect −delta                          │
//! │                                                                         │
//! │  Never both positive. Both zero only for an even exchange.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{ReplacementLineItem, ReturnedLineItem};

// =============================================================================
// Line Total
// =============================================================================

/// `unit_price × quantity`, in integer minor units.
///
/// ```rust
/// use kajamart_core::money::Money;
/// use kajamart_core::settlement::line_total;
///
/// assert_eq!(line_total(Money::from_minor(22999), 2).minor(), 45998);
/// assert!(line_total(Money::from_minor(22999), 0).is_zero());
/// ```
#[inline]
pub fn line_total(unit_price: Money, quantity: i64) -> Money {
    unit_price.multiply_quantity(quantity)
}

// =============================================================================
// Settlement Result
// =============================================================================

/// Totals of both sides and the resulting balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SettlementResult {
    pub returned_total: Money,
    pub replacement_total: Money,
    /// Owed to the customer.
    pub amount_to_refund: Money,
    /// Owed by the customer.
    pub amount_to_collect: Money,
}

/// Which way money moves, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
#[ts(export)]
pub enum SettlementOutcome {
    /// Store pays the customer back.
    Refund(Money),
    /// Customer pays the difference.
    Collect(Money),
    /// Even exchange, nothing changes hands.
    Even,
}

impl SettlementResult {
    /// Classifies the result.
    pub fn outcome(&self) -> SettlementOutcome {
        if self.amount_to_refund.is_positive() {
            SettlementOutcome::Refund(self.amount_to_refund)
        } else if self.amount_to_collect.is_positive() {
            SettlementOutcome::Collect(self.amount_to_collect)
        } else {
            SettlementOutcome::Even
        }
    }

    /// Signed balance from the store's point of view: positive = refund.
    pub fn net(&self) -> Money {
        self.returned_total - self.replacement_total
    }
}

// =============================================================================
// Calculation
// =============================================================================

/// Settles two already-summed totals.
///
/// Swapping the arguments swaps refund and collect.
pub fn settle(returned_total: Money, replacement_total: Money) -> SettlementResult {
    let delta = returned_total - replacement_total;

    SettlementResult {
        returned_total,
        replacement_total,
        amount_to_refund: delta.positive_part(),
        amount_to_collect: (-delta).positive_part(),
    }
}

/// Computes the settlement for a return transaction.
///
/// Lines with `return_quantity == 0` contribute nothing, so they may stay in
/// the slice. Empty slices are valid. Pure and infallible: negative prices or
/// quantities are a caller precondition, see [`crate::validation`].
///
/// ## User Workflow
/// ```text
/// Returned: 1 × $ 10.000        Replacement: 1 × $ 65.000
///      │                              │
///      └──────────┬───────────────────┘
///                 ▼
///     compute_settlement ← THIS FUNCTION
///                 │
///                 ▼
///     "Cobrar al cliente: $ 55.000"
/// ```
///
/// ## Example
/// ```rust
/// use kajamart_core::settlement::compute_settlement;
///
/// let result = compute_settlement(&[], &[]);
/// assert!(result.amount_to_refund.is_zero());
/// assert!(result.amount_to_collect.is_zero());
/// ```
pub fn compute_settlement(
    returned_items: &[ReturnedLineItem],
    replacement_items: &[ReplacementLineItem],
) -> SettlementResult {
    let returned_total: Money = returned_items.iter().map(ReturnedLineItem::line_total).sum();
    let replacement_total: Money = replacement_items
        .iter()
        .map(ReplacementLineItem::line_total)
        .sum();

    settle(returned_total, replacement_total)
}

// =============================================================================
// Unit Tests
// =============================================================================
