//! # Domain Types
//!
//! Records fetched from the backend and the line items a return works on.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  From the backend                 Working set of one return             │
//! │  ────────────────                 ─────────────────────────             │
//! │  ┌─────────────────┐              ┌──────────────────────┐              │
//! │  │   SaleRecord    │──lines──────►│  ReturnedLineItem    │              │
//! │  │   SaleLine      │              │  return_quantity     │              │
//! │  └─────────────────┘              └──────────────────────┘              │
//! │  ┌─────────────────┐              ┌──────────────────────┐              │
//! │  │  ProductRecord  │─────────────►│ ReplacementLineItem  │              │
//! │  │  price, stock   │              │ requested_quantity   │              │
//! │  └─────────────────┘              └──────────────────────┘              │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                                   ReturnSubmission (sent on confirm)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Line items copy name and unit price at the moment they enter the return,
//! so a price edit on the backend never changes a settlement mid-session.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::settlement::{line_total, SettlementResult};
use crate::validation::validate_unit_price;

// =============================================================================
// Sale Record
// =============================================================================

/// One line of a previously completed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLine {
    pub product_id: String,
    pub name: String,
    /// Unit price charged at time of sale.
    pub unit_price: Money,
    /// Quantity the customer bought.
    pub quantity: i64,
}

/// A completed sale located by id or customer name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleRecord {
    pub id: String,
    pub customer_name: Option<String>,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
    pub lines: Vec<SaleLine>,
}

impl SaleRecord {
    /// Checks the record before it seeds a return.
    ///
    /// ## Rules
    /// - Product ids are unique within the sale
    /// - Unit prices are non-negative
    /// - Purchased quantities are non-negative
    pub fn validate(&self) -> ValidationResult<()> {
        let mut seen = HashSet::with_capacity(self.lines.len());

        for line in &self.lines {
            if !seen.insert(line.product_id.as_str()) {
                return Err(ValidationError::Duplicate {
                    field: "product".to_string(),
                    value: line.product_id.clone(),
                });
            }

            validate_unit_price(line.unit_price)?;

            if line.quantity < 0 {
                return Err(ValidationError::Negative {
                    field: "purchased quantity".to_string(),
                });
            }
        }

        Ok(())
    }
}

// =============================================================================
// Product Record
// =============================================================================

/// A product returned by a name/barcode search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub barcode: Option<String>,
    /// Current selling price.
    pub price: Money,
    /// Units on hand, when the backend tracks inventory for this product.
    pub stock: Option<i64>,
    /// Inactive products cannot be handed out as replacements.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

// =============================================================================
// Returned Line Item
// =============================================================================

/// A line of the original sale with the quantity the customer brings back.
///
/// ## Invariant
/// `0 <= return_quantity <= original_quantity`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReturnedLineItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    /// Quantity bought in the originating sale (upper clamp bound).
    pub original_quantity: i64,
    pub return_quantity: i64,
}

impl ReturnedLineItem {
    /// Seeds a returned line from a sale line with nothing marked yet.
    pub fn from_sale_line(line: &SaleLine) -> Self {
        ReturnedLineItem {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            unit_price: line.unit_price,
            original_quantity: line.quantity,
            return_quantity: 0,
        }
    }

    /// Value of the units being returned.
    #[inline]
    pub fn line_total(&self) -> Money {
        line_total(self.unit_price, self.return_quantity)
    }
}

// =============================================================================
// Replacement Line Item
// =============================================================================

/// A product the customer takes in exchange.
///
/// ## Invariant
/// `requested_quantity >= 1`; removal is a separate operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReplacementLineItem {
    pub product_id: String,
    pub name: String,
    /// Price frozen when the product was added.
    pub unit_price: Money,
    pub requested_quantity: i64,
    /// Stock known when the product was added, if tracked.
    pub available_stock: Option<i64>,
}

impl ReplacementLineItem {
    /// Creates a replacement line from a searched product.
    pub fn from_product(product: &ProductRecord, quantity: i64) -> Self {
        ReplacementLineItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            requested_quantity: quantity,
            available_stock: product.stock,
        }
    }

    /// Value of the requested units.
    #[inline]
    pub fn line_total(&self) -> Money {
        line_total(self.unit_price, self.requested_quantity)
    }
}

// =============================================================================
// Return Submission
// =============================================================================

/// Payload handed to the "submit return" endpoint on confirmation.
///
/// Only returned lines with a non-zero quantity are included; the settlement
/// is the one the user reviewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReturnSubmission {
    pub sale_id: String,
    pub returned_items: Vec<ReturnedLineItem>,
    pub replacement_items: Vec<ReplacementLineItem>,
    pub settlement: SettlementResult,
}

impl ReturnSubmission {
    /// Total units coming back to the store.
    pub fn returned_units(&self) -> i64 {
        self.returned_items.iter().map(|i| i.return_quantity).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
