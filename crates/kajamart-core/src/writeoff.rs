//! # Write-Offs
//!
//! Registering stock that leaves inventory without a sale: damaged,
//! expired, or low-stock leftovers pulled from the shelf.
//!
//! Uses the same quantity rules as returns, bounded by stock on hand:
//! ```text
//! ProductRecord (stock 4) ──► WriteOffLine [1, 4] ──► WriteOffSubmission
//!                                                    reason + notes + value
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::quantity::{adjust_quantity, QuantityBounds};
use crate::settlement::line_total;
use crate::types::ProductRecord;
use crate::validation::{normalize_notes, validate_positive_quantity, validate_unit_price};

/// Why stock is being written off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum WriteOffReason {
    #[default]
    Damaged,
    Expired,
    LowStock,
    /// Requires a note explaining it.
    Other,
}

/// One product being written off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WriteOffLine {
    pub product_id: String,
    pub name: String,
    /// Valuation per unit (current selling price).
    pub unit_value: Money,
    pub quantity: i64,
    /// Stock on hand when the product was added; upper bound for `quantity`.
    pub available_stock: i64,
}

impl WriteOffLine {
    pub fn line_total(&self) -> Money {
        line_total(self.unit_value, self.quantity)
    }

    fn bounds(&self) -> QuantityBounds {
        QuantityBounds {
            min: 1,
            max: Some(self.available_stock),
        }
    }
}

/// Payload for the "submit write-off" endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WriteOffSubmission {
    pub reason: WriteOffReason,
    pub notes: Option<String>,
    pub lines: Vec<WriteOffLine>,
    pub total_value: Money,
}

/// A write-off being put together.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WriteOffDraft {
    pub reason: WriteOffReason,
    pub notes: Option<String>,
    pub lines: Vec<WriteOffLine>,
}

impl WriteOffDraft {
    pub fn new(reason: WriteOffReason) -> Self {
        WriteOffDraft {
            reason,
            notes: None,
            lines: Vec::new(),
        }
    }

    /// Adds a product, or tops up its line if already present.
    ///
    /// ## Errors
    /// - `MustBePositive` for quantity < 1
    /// - `InsufficientStock` when the product has no tracked stock on hand
    pub fn add_product(&mut self, product: &ProductRecord, quantity: i64) -> CoreResult<()> {
        validate_unit_price(product.price)?;
        validate_positive_quantity(quantity)?;

        let stock = product.stock.unwrap_or(0);
        if stock < 1 {
            return Err(CoreError::InsufficientStock {
                product_id: product.id.clone(),
                available: stock,
                requested: quantity,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.available_stock = stock;
            line.quantity = adjust_quantity(line.quantity, quantity, line.bounds());
            return Ok(());
        }

        let mut line = WriteOffLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_value: product.price,
            quantity,
            available_stock: stock,
        };
        line.quantity = line.bounds().clamp(quantity);
        self.lines.push(line);
        Ok(())
    }

    /// Steps a line's quantity within `[1, available_stock]`.
    pub fn adjust(&mut self, product_id: &str, delta: i64) -> CoreResult<()> {
        let line = self.line_mut(product_id)?;
        line.quantity = adjust_quantity(line.quantity, delta, line.bounds());
        Ok(())
    }

    /// Overwrites a line's quantity, clamped to `[1, available_stock]`.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        let line = self.line_mut(product_id)?;
        line.quantity = line.bounds().clamp(quantity);
        Ok(())
    }

    pub fn remove(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return Err(CoreError::ItemNotFound(product_id.to_string()));
        }
        Ok(())
    }

    /// Total value leaving inventory.
    pub fn total_value(&self) -> Money {
        self.lines.iter().map(WriteOffLine::line_total).sum()
    }

    /// Builds the payload without consuming the draft.
    ///
    /// ## Errors
    /// - `NothingToConfirm` for an empty draft
    /// - `Required` for `Other` without a note
    pub fn submission(&self) -> CoreResult<WriteOffSubmission> {
        if self.lines.is_empty() {
            return Err(CoreError::NothingToConfirm);
        }

        let notes = normalize_notes(self.notes.as_deref())?;
        if self.reason == WriteOffReason::Other && notes.is_none() {
            return Err(ValidationError::Required {
                field: "notes".to_string(),
            }
            .into());
        }

        Ok(WriteOffSubmission {
            reason: self.reason,
            notes,
            lines: self.lines.clone(),
            total_value: self.total_value(),
        })
    }

    fn line_mut(&mut self, product_id: &str) -> CoreResult<&mut WriteOffLine> {
        self.lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| CoreError::ItemNotFound(product_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64, stock: Option<i64>) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            name: format!("Product {}", id),
            barcode: None,
            price: Money::from_minor(price),
            stock,
            is_active: true,
        }
    }

    #[test]
    fn test_add_and_total() {
        let mut draft = WriteOffDraft::new(WriteOffReason::Expired);
        draft.add_product(&product("1", 3500, Some(10)), 4).unwrap();
        draft.add_product(&product("2", 1200, Some(2)), 1).unwrap();

        assert_eq!(draft.total_value().minor(), 15200);
    }

    #[test]
    fn test_quantity_bounded_by_stock() {
        let mut draft = WriteOffDraft::new(WriteOffReason::LowStock);
        draft.add_product(&product("1", 100, Some(3)), 5).unwrap();
        assert_eq!(draft.lines[0].quantity, 3);

        draft.add_product(&product("1", 100, Some(3)), 1).unwrap();
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].quantity, 3);

        draft.adjust("1", -10).unwrap();
        assert_eq!(draft.lines[0].quantity, 1);

        draft.set_quantity("1", 2).unwrap();
        assert_eq!(draft.lines[0].quantity, 2);
    }

    #[test]
    fn test_untracked_or_empty_stock_rejected() {
        let mut draft = WriteOffDraft::default();
        assert!(matches!(
            draft.add_product(&product("1", 100, None), 1),
            Err(CoreError::InsufficientStock { available: 0, .. })
        ));
        assert!(matches!(
            draft.add_product(&product("1", 100, Some(0)), 1),
            Err(CoreError::InsufficientStock { .. })
        ));
        assert!(matches!(
            draft.add_product(&product("1", 100, Some(5)), 0),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert!(draft.lines.is_empty());
    }

    #[test]
    fn test_submission_rules() {
        let mut draft = WriteOffDraft::new(WriteOffReason::Other);
        assert_eq!(draft.submission().unwrap_err(), CoreError::NothingToConfirm);

        draft.add_product(&product("1", 2500, Some(4)), 2).unwrap();
        draft.notes = Some("   ".to_string());
        assert!(matches!(
            draft.submission(),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));

        draft.notes = Some("Inventario físico".to_string());
        let submission = draft.submission().unwrap();
        assert_eq!(submission.total_value.minor(), 5000);
        assert_eq!(submission.notes.as_deref(), Some("Inventario físico"));
        assert_eq!(draft.lines.len(), 1);
    }

    #[test]
    fn test_remove_line() {
        let mut draft = WriteOffDraft::new(WriteOffReason::Damaged);
        draft.add_product(&product("1", 100, Some(1)), 1).unwrap();

        draft.remove("1").unwrap();
        assert!(draft.lines.is_empty());
        assert_eq!(
            draft.remove("1").unwrap_err(),
            CoreError::ItemNotFound("1".to_string())
        );
    }
}
