//! # Write-Off Session
//!
//! Registers damaged, expired or low-stock units through the backend. Same
//! contract as returns: a failed submission keeps the draft and its
//! submission id for a retry.

use std::sync::Arc;

use kajamart_core::quantity::parse_quantity;
use kajamart_core::validation::validate_search_term;
use kajamart_core::writeoff::{WriteOffDraft, WriteOffReason};
use kajamart_core::{CoreError, Money, ProductRecord};
use tracing::{debug, info, warn};

use crate::backend::{Envelope, ReturnsBackend, WriteOffReceipt, WriteOffRequest};
use crate::error::ClientResult;

pub struct WriteOffSession {
    backend: Arc<dyn ReturnsBackend>,
    draft: WriteOffDraft,
    product_results: Vec<ProductRecord>,
    pending: Option<WriteOffRequest>,
}

impl WriteOffSession {
    pub fn new(backend: Arc<dyn ReturnsBackend>, reason: WriteOffReason) -> Self {
        WriteOffSession {
            backend,
            draft: WriteOffDraft::new(reason),
            product_results: Vec::new(),
            pending: None,
        }
    }

    pub fn draft(&self) -> &WriteOffDraft {
        &self.draft
    }

    pub fn product_results(&self) -> &[ProductRecord] {
        &self.product_results
    }

    pub fn total_value(&self) -> Money {
        self.draft.total_value()
    }

    pub fn set_reason(&mut self, reason: WriteOffReason) {
        self.draft.reason = reason;
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.draft.notes = notes;
    }

    pub async fn search_products(&mut self, term: &str) -> ClientResult<&[ProductRecord]> {
        let term = validate_search_term(term)?;
        debug!(term = %term, "Searching products for write-off");

        self.product_results = self.backend.search_products(&term).await?;
        Ok(&self.product_results)
    }

    /// Adds a product from the latest search.
    pub fn add_product(&mut self, product_id: &str, quantity: i64) -> ClientResult<()> {
        let product = self
            .product_results
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| CoreError::ItemNotFound(product_id.to_string()))?;

        self.draft.add_product(product, quantity)?;
        Ok(())
    }

    pub fn adjust(&mut self, product_id: &str, delta: i64) -> ClientResult<()> {
        self.draft.adjust(product_id, delta)?;
        Ok(())
    }

    pub fn set_quantity_text(&mut self, product_id: &str, input: &str) -> ClientResult<()> {
        let quantity = parse_quantity(input)?;
        self.draft.set_quantity(product_id, quantity)?;
        Ok(())
    }

    pub fn remove(&mut self, product_id: &str) -> ClientResult<()> {
        self.draft.remove(product_id)?;
        Ok(())
    }

    /// Submits the write-off. On success the draft is cleared, keeping the reason.
    pub async fn submit(&mut self) -> ClientResult<WriteOffReceipt> {
        let submission = self.draft.submission()?;

        let request = match self.pending.take() {
            Some(pending) if pending.body == submission => pending,
            _ => Envelope::new(submission),
        };

        match self.backend.submit_write_off(&request).await {
            Ok(receipt) => {
                info!(
                    write_off_id = %receipt.write_off_id,
                    reason = ?request.body.reason,
                    lines = request.body.lines.len(),
                    value = request.body.total_value.minor(),
                    "Write-off registered"
                );
                self.draft = WriteOffDraft::new(self.draft.reason);
                Ok(receipt)
            }
            Err(e) => {
                warn!(
                    submission_id = %request.submission_id,
                    error = %e,
                    "Write-off submission failed; draft kept"
                );
                self.pending = Some(request);
                Err(e)
            }
        }
    }
}
