//! # Return Workflow
//!
//! The return/exchange screen as an explicit reducer:
//! `(state, action) → new state`. Every accepted action recomputes the
//! settlement from the new line items; nothing is recalculated behind the
//! caller's back.
//!
//! ## Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Return Workflow                                 │
//! │                                                                         │
//! │  ┌──────────────┐ SelectSale ┌────────────────────┐ AddReplacement      │
//! │  │ SelectingSale│───────────►│ AdjustingReturn    │──────────┐          │
//! │  └──────────────┘            │ Quantities         │          ▼          │
//! │                              └─────────┬──────────┘  ┌──────────────┐   │
//! │                                        │ Review      │ Adding       │   │
//! │                                        ▼             │ Replacements │   │
//! │                              ┌────────────────────┐  └──────┬───────┘   │
//! │                              │ ReviewingSettlement│◄────────┘ Review    │
//! │                              └─────────┬──────────┘                     │
//! │                                        │                                │
//! │           Confirm / Cancel from any phase after SelectingSale           │
//! │                                        ▼                                │
//! │                          ┌───────────┐   ┌───────────┐                  │
//! │                          │ Confirmed │   │ Cancelled │  (terminal,      │
//! │                          └───────────┘   └───────────┘   state cleared) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected action returns `Err` and leaves the caller's state exactly as
//! it was.
//!
//! ## Example
//! ```rust
//! use chrono::Utc;
//! use kajamart_core::money::Money;
//! use kajamart_core::types::{SaleLine, SaleRecord};
//! use kajamart_core::workflow::{ReturnAction, ReturnState, WorkflowPhase};
//!
//! let sale = SaleRecord {
//!     id: "1042".into(),
//!     customer_name: None,
//!     sold_at: Utc::now(),
//!     lines: vec![SaleLine {
//!         product_id: "7".into(),
//!         name: "Arroz 5kg".into(),
//!         unit_price: Money::from_minor(22999),
//!         quantity: 2,
//!     }],
//! };
//!
//! let mut state = ReturnState::new();
//! state.apply(ReturnAction::SelectSale(sale)).unwrap();
//! state.apply(ReturnAction::SetReturnQuantity { product_id: "7".into(), quantity: 2 }).unwrap();
//! assert_eq!(state.settlement.amount_to_refund.minor(), 45998);
//!
//! state.apply(ReturnAction::Confirm).unwrap();
//! assert_eq!(state.phase, WorkflowPhase::Confirmed);
//! assert!(state.returned_items.is_empty());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::quantity::{adjust_quantity, QuantityBounds};
use crate::settlement::{compute_settlement, SettlementResult};
use crate::types::{
    ProductRecord, ReplacementLineItem, ReturnSubmission, ReturnedLineItem, SaleRecord,
};
use crate::validation::{validate_positive_quantity, validate_unit_price};

// =============================================================================
// Phase
// =============================================================================

/// Where the user is in the return flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum WorkflowPhase {
    /// Looking up the sale the goods came from.
    #[default]
    SelectingSale,
    /// Marking how many units of each line come back.
    AdjustingReturnQuantities,
    /// Picking products to take in exchange.
    AddingReplacements,
    /// Looking at the refund/collect figure before confirming.
    ReviewingSettlement,
    /// Submitted. Terminal.
    Confirmed,
    /// Abandoned. Terminal.
    Cancelled,
}

impl WorkflowPhase {
    /// Confirmed and Cancelled accept no further actions.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, WorkflowPhase::Confirmed | WorkflowPhase::Cancelled)
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WorkflowPhase::SelectingSale => "selecting a sale",
            WorkflowPhase::AdjustingReturnQuantities => "adjusting return quantities",
            WorkflowPhase::AddingReplacements => "adding replacements",
            WorkflowPhase::ReviewingSettlement => "reviewing the settlement",
            WorkflowPhase::Confirmed => "confirmed",
            WorkflowPhase::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Everything the user can do on the return screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum ReturnAction {
    /// Start a return against a located sale.
    SelectSale(SaleRecord),
    /// Step a returned line up or down.
    AdjustReturn { product_id: String, delta: i64 },
    /// Overwrite a returned line's quantity (clamped).
    SetReturnQuantity { product_id: String, quantity: i64 },
    /// Add a product to take in exchange, merging with an existing line.
    AddReplacement { product: ProductRecord, quantity: i64 },
    /// Step a replacement line up or down (never below 1).
    AdjustReplacement { product_id: String, delta: i64 },
    /// Overwrite a replacement line's quantity (clamped).
    SetReplacementQuantity { product_id: String, quantity: i64 },
    /// Drop one replacement line.
    RemoveReplacement { product_id: String },
    /// Drop every replacement line.
    ClearReplacements,
    /// Move to the settlement review.
    Review,
    /// Finish the transaction.
    Confirm,
    /// Abandon the transaction.
    Cancel,
}

/// Payload-free discriminant of [`ReturnAction`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    SelectSale,
    AdjustReturn,
    SetReturnQuantity,
    AddReplacement,
    AdjustReplacement,
    SetReplacementQuantity,
    RemoveReplacement,
    ClearReplacements,
    Review,
    Confirm,
    Cancel,
}

impl ReturnAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            ReturnAction::SelectSale(_) => ActionKind::SelectSale,
            ReturnAction::AdjustReturn { .. } => ActionKind::AdjustReturn,
            ReturnAction::SetReturnQuantity { .. } => ActionKind::SetReturnQuantity,
            ReturnAction::AddReplacement { .. } => ActionKind::AddReplacement,
            ReturnAction::AdjustReplacement { .. } => ActionKind::AdjustReplacement,
            ReturnAction::SetReplacementQuantity { .. } => ActionKind::SetReplacementQuantity,
            ReturnAction::RemoveReplacement { .. } => ActionKind::RemoveReplacement,
            ReturnAction::ClearReplacements => ActionKind::ClearReplacements,
            ReturnAction::Review => ActionKind::Review,
            ReturnAction::Confirm => ActionKind::Confirm,
            ReturnAction::Cancel => ActionKind::Cancel,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ActionKind::SelectSale => "select a sale",
            ActionKind::AdjustReturn | ActionKind::SetReturnQuantity => {
                "change a return quantity"
            }
            ActionKind::AddReplacement => "add a replacement",
            ActionKind::AdjustReplacement | ActionKind::SetReplacementQuantity => {
                "change a replacement quantity"
            }
            ActionKind::RemoveReplacement => "remove a replacement",
            ActionKind::ClearReplacements => "clear replacements",
            ActionKind::Review => "review the settlement",
            ActionKind::Confirm => "confirm the return",
            ActionKind::Cancel => "cancel the return",
        };
        f.write_str(text)
    }
}

// =============================================================================
// State
// =============================================================================

/// Working state of one return session.
///
/// ## Invariants
/// - `settlement == compute_settlement(returned_items, replacement_items)`
/// - `returned_items` is empty until a sale is selected
/// - terminal phases hold no items
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReturnState {
    pub phase: WorkflowPhase,
    pub sale_id: Option<String>,
    pub customer_name: Option<String>,
    pub returned_items: Vec<ReturnedLineItem>,
    pub replacement_items: Vec<ReplacementLineItem>,
    /// Derived; recomputed on every accepted action.
    pub settlement: SettlementResult,
}

impl ReturnState {
    /// Creates an empty state waiting for a sale.
    pub fn new() -> Self {
        ReturnState::default()
    }

    /// Applies an action in place. On error `self` is unchanged.
    pub fn apply(&mut self, action: ReturnAction) -> CoreResult<()> {
        *self = reduce(self, action)?;
        Ok(())
    }

    /// Units marked for return across all lines.
    pub fn total_returned_units(&self) -> i64 {
        self.returned_items.iter().map(|i| i.return_quantity).sum()
    }

    /// Whether the session still accepts actions.
    pub fn is_open(&self) -> bool {
        !self.phase.is_terminal()
    }

    pub fn returned_item(&self, product_id: &str) -> Option<&ReturnedLineItem> {
        self.returned_items.iter().find(|i| i.product_id == product_id)
    }

    pub fn replacement_item(&self, product_id: &str) -> Option<&ReplacementLineItem> {
        self.replacement_items
            .iter()
            .find(|i| i.product_id == product_id)
    }

    /// Runs the confirmation precondition without changing anything.
    ///
    /// ## Rules
    /// - Nothing returned and nothing requested → `NothingToConfirm`
    /// - Replacements requested but nothing returned → `NoUnitsReturned`
    pub fn check_confirmable(&self) -> CoreResult<()> {
        let returned_units = self.total_returned_units();

        if returned_units == 0 && self.replacement_items.is_empty() {
            return Err(CoreError::NothingToConfirm);
        }

        if returned_units == 0 {
            return Err(CoreError::NoUnitsReturned);
        }

        Ok(())
    }

    /// Packages the current selection for the "submit return" endpoint.
    ///
    /// Applies the same checks as `Confirm` but leaves the state intact, so a
    /// failed submission can be retried as is.
    pub fn submission(&self) -> CoreResult<ReturnSubmission> {
        self.require_open()?;
        self.require_sale(ActionKind::Confirm)?;
        self.check_confirmable()?;

        let sale_id = self
            .sale_id
            .clone()
            .ok_or(CoreError::ActionNotAllowed {
                action: ActionKind::Confirm,
                phase: self.phase,
            })?;

        Ok(ReturnSubmission {
            sale_id,
            returned_items: self
                .returned_items
                .iter()
                .filter(|i| i.return_quantity > 0)
                .cloned()
                .collect(),
            replacement_items: self.replacement_items.clone(),
            settlement: self.settlement,
        })
    }

    fn require_open(&self) -> CoreResult<()> {
        if self.phase.is_terminal() {
            return Err(CoreError::SessionClosed(self.phase));
        }
        Ok(())
    }

    fn require_sale(&self, action: ActionKind) -> CoreResult<()> {
        if self.phase == WorkflowPhase::SelectingSale {
            return Err(CoreError::ActionNotAllowed {
                action,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn returned_mut(&mut self, product_id: &str) -> CoreResult<&mut ReturnedLineItem> {
        self.returned_items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::ItemNotFound(product_id.to_string()))
    }

    fn replacement_mut(&mut self, product_id: &str) -> CoreResult<&mut ReplacementLineItem> {
        self.replacement_items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::ItemNotFound(product_id.to_string()))
    }

    fn closed(phase: WorkflowPhase) -> Self {
        ReturnState {
            phase,
            ..ReturnState::default()
        }
    }
}

// =============================================================================
// Reducer
// =============================================================================

/// Computes the state that follows `action`.
///
/// ## Errors
/// - `SessionClosed` once Confirmed or Cancelled
/// - `ActionNotAllowed` for line edits, review, confirm or cancel before a
///   sale is selected, and for selecting a second sale
/// - `ItemNotFound` for an unknown product id
/// - `NothingToConfirm` / `NoUnitsReturned` from `Confirm`
/// - `Validation`, `ProductUnavailable`, `InsufficientStock` from
///   `SelectSale` / `AddReplacement`
pub fn reduce(state: &ReturnState, action: ReturnAction) -> CoreResult<ReturnState> {
    state.require_open()?;
    let kind = action.kind();

    let mut next = state.clone();

    match action {
        ReturnAction::SelectSale(sale) => {
            if state.phase != WorkflowPhase::SelectingSale {
                return Err(CoreError::ActionNotAllowed {
                    action: kind,
                    phase: state.phase,
                });
            }
            sale.validate()?;

            next.sale_id = Some(sale.id.clone());
            next.customer_name = sale.customer_name.clone();
            next.returned_items = sale
                .lines
                .iter()
                .map(ReturnedLineItem::from_sale_line)
                .collect();
            next.replacement_items.clear();
            next.phase = WorkflowPhase::AdjustingReturnQuantities;
        }

        ReturnAction::AdjustReturn { product_id, delta } => {
            next.require_sale(kind)?;
            let item = next.returned_mut(&product_id)?;
            item.return_quantity = adjust_quantity(
                item.return_quantity,
                delta,
                QuantityBounds::returned(item.original_quantity),
            );
        }

        ReturnAction::SetReturnQuantity {
            product_id,
            quantity,
        } => {
            next.require_sale(kind)?;
            let item = next.returned_mut(&product_id)?;
            item.return_quantity = QuantityBounds::returned(item.original_quantity).clamp(quantity);
        }

        ReturnAction::AddReplacement { product, quantity } => {
            next.require_sale(kind)?;
            add_replacement(&mut next, &product, quantity)?;
            if next.phase == WorkflowPhase::AdjustingReturnQuantities {
                next.phase = WorkflowPhase::AddingReplacements;
            }
        }

        ReturnAction::AdjustReplacement { product_id, delta } => {
            next.require_sale(kind)?;
            let item = next.replacement_mut(&product_id)?;
            item.requested_quantity = adjust_quantity(
                item.requested_quantity,
                delta,
                QuantityBounds::replacement(item.available_stock),
            );
        }

        ReturnAction::SetReplacementQuantity {
            product_id,
            quantity,
        } => {
            next.require_sale(kind)?;
            let item = next.replacement_mut(&product_id)?;
            item.requested_quantity =
                QuantityBounds::replacement(item.available_stock).clamp(quantity);
        }

        ReturnAction::RemoveReplacement { product_id } => {
            next.require_sale(kind)?;
            let before = next.replacement_items.len();
            next.replacement_items.retain(|i| i.product_id != product_id);
            if next.replacement_items.len() == before {
                return Err(CoreError::ItemNotFound(product_id));
            }
        }

        ReturnAction::ClearReplacements => {
            next.require_sale(kind)?;
            next.replacement_items.clear();
        }

        ReturnAction::Review => {
            next.require_sale(kind)?;
            next.phase = WorkflowPhase::ReviewingSettlement;
        }

        ReturnAction::Confirm => {
            next.require_sale(kind)?;
            next.check_confirmable()?;
            next = ReturnState::closed(WorkflowPhase::Confirmed);
        }

        ReturnAction::Cancel => {
            next.require_sale(kind)?;
            next = ReturnState::closed(WorkflowPhase::Cancelled);
        }
    }

    next.settlement = compute_settlement(&next.returned_items, &next.replacement_items);
    Ok(next)
}

fn add_replacement(state: &mut ReturnState, product: &ProductRecord, quantity: i64) -> CoreResult<()> {
    if !product.is_active {
        return Err(CoreError::ProductUnavailable(product.id.clone()));
    }
    validate_unit_price(product.price)?;
    validate_positive_quantity(quantity)?;

    if let Some(stock) = product.stock {
        if stock < 1 {
            return Err(CoreError::InsufficientStock {
                product_id: product.id.clone(),
                available: stock,
                requested: quantity,
            });
        }
    }

    let bounds = QuantityBounds::replacement(product.stock);

    if let Some(item) = state
        .replacement_items
        .iter_mut()
        .find(|i| i.product_id == product.id)
    {
        item.available_stock = product.stock;
        item.requested_quantity = adjust_quantity(item.requested_quantity, quantity, bounds);
        return Ok(());
    }

    state
        .replacement_items
        .push(ReplacementLineItem::from_product(product, bounds.clamp(quantity)));
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
