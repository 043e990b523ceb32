//! # Return Session
//!
//! Drives one return/exchange from sale lookup to confirmation. All business
//! rules live in the core reducer; this layer fetches records, parses text
//! input, and talks to the backend.
//!
//! ## Flow
//! ```text
//! search_sales ──► select_sale ──► set/adjust returns ──► search_products
//!                                                              │
//!      confirm ◄── review ◄── add/adjust replacements ◄────────┘
//!         │
//!         ├── Ok  ──► Confirmed, receipt kept
//!         └── Err ──► state untouched, request kept for retry
//! ```

use std::sync::Arc;

use kajamart_core::quantity::parse_quantity;
use kajamart_core::validation::validate_search_term;
use kajamart_core::{
    CoreError, CurrencyFormat, ProductRecord, ReturnAction, ReturnState, SaleRecord,
    SettlementOutcome,
};
use tracing::{debug, info, warn};

use crate::backend::{Envelope, ReturnReceipt, ReturnRequest, ReturnsBackend};
use crate::error::ClientResult;

/// One customer's return, from lookup to settlement.
pub struct ReturnSession {
    backend: Arc<dyn ReturnsBackend>,
    state: ReturnState,
    sale_results: Vec<SaleRecord>,
    product_results: Vec<ProductRecord>,
    /// Last request that failed to submit; reused while the selection is unchanged.
    pending: Option<ReturnRequest>,
    last_receipt: Option<ReturnReceipt>,
}

impl ReturnSession {
    pub fn new(backend: Arc<dyn ReturnsBackend>) -> Self {
        ReturnSession {
            backend,
            state: ReturnState::new(),
            sale_results: Vec::new(),
            product_results: Vec::new(),
            pending: None,
            last_receipt: None,
        }
    }

    pub fn state(&self) -> &ReturnState {
        &self.state
    }

    pub fn sale_results(&self) -> &[SaleRecord] {
        &self.sale_results
    }

    pub fn product_results(&self) -> &[ProductRecord] {
        &self.product_results
    }

    pub fn last_receipt(&self) -> Option<&ReturnReceipt> {
        self.last_receipt.as_ref()
    }

    /// Whether a failed submission is waiting to be retried.
    pub fn has_pending_submission(&self) -> bool {
        self.pending.is_some()
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Finds sales by id or customer name.
    pub async fn search_sales(&mut self, term: &str) -> ClientResult<&[SaleRecord]> {
        let term = validate_search_term(term)?;
        debug!(term = %term, "Searching sales");

        self.sale_results = self.backend.find_sales(&term).await?;
        Ok(&self.sale_results)
    }

    /// Loads a sale and starts the return from it.
    pub async fn select_sale(&mut self, sale_id: &str) -> ClientResult<()> {
        let sale = self.backend.get_sale(sale_id).await?;
        info!(sale_id = %sale.id, lines = sale.lines.len(), "Sale selected for return");

        self.dispatch(ReturnAction::SelectSale(sale))
    }

    /// Finds replacement candidates by name or barcode.
    pub async fn search_products(&mut self, term: &str) -> ClientResult<&[ProductRecord]> {
        let term = validate_search_term(term)?;
        debug!(term = %term, "Searching products");

        self.product_results = self.backend.search_products(&term).await?;
        Ok(&self.product_results)
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Applies an action to the workflow. On error the state is unchanged.
    pub fn dispatch(&mut self, action: ReturnAction) -> ClientResult<()> {
        let kind = action.kind();
        if let Err(e) = self.state.apply(action) {
            debug!(action = %kind, error = %e, "Action rejected");
            return Err(e.into());
        }
        Ok(())
    }

    pub fn adjust_return(&mut self, product_id: &str, delta: i64) -> ClientResult<()> {
        self.dispatch(ReturnAction::AdjustReturn {
            product_id: product_id.to_string(),
            delta,
        })
    }

    /// Sets a return quantity from a text field.
    pub fn set_return_quantity_text(&mut self, product_id: &str, input: &str) -> ClientResult<()> {
        let quantity = parse_quantity(input)?;
        self.dispatch(ReturnAction::SetReturnQuantity {
            product_id: product_id.to_string(),
            quantity,
        })
    }

    /// Adds a product from the latest product search as a replacement.
    pub fn add_replacement(&mut self, product_id: &str, quantity: i64) -> ClientResult<()> {
        let product = self
            .product_results
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or_else(|| CoreError::ItemNotFound(product_id.to_string()))?;

        self.dispatch(ReturnAction::AddReplacement { product, quantity })
    }

    pub fn adjust_replacement(&mut self, product_id: &str, delta: i64) -> ClientResult<()> {
        self.dispatch(ReturnAction::AdjustReplacement {
            product_id: product_id.to_string(),
            delta,
        })
    }

    /// Sets a replacement quantity from a text field.
    pub fn set_replacement_quantity_text(&mut self, product_id: &str, input: &str) -> ClientResult<()> {
        let quantity = parse_quantity(input)?;
        self.dispatch(ReturnAction::SetReplacementQuantity {
            product_id: product_id.to_string(),
            quantity,
        })
    }

    pub fn remove_replacement(&mut self, product_id: &str) -> ClientResult<()> {
        self.dispatch(ReturnAction::RemoveReplacement {
            product_id: product_id.to_string(),
        })
    }

    pub fn review(&mut self) -> ClientResult<()> {
        self.dispatch(ReturnAction::Review)
    }

    /// One-line summary of what the cashier must do.
    pub fn describe_settlement(&self, format: &CurrencyFormat) -> String {
        match self.state.settlement.outcome() {
            SettlementOutcome::Refund(amount) => {
                format!("Refund to customer: {}", format.format(amount))
            }
            SettlementOutcome::Collect(amount) => {
                format!("Collect from customer: {}", format.format(amount))
            }
            SettlementOutcome::Even => "Even exchange, no payment".to_string(),
        }
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Submits the return and closes the session.
    ///
    /// If submission fails the state is left exactly as it was and the
    /// request is kept, so calling `confirm` again resends it with the same
    /// submission id unless the selection changed in between.
    pub async fn confirm(&mut self) -> ClientResult<ReturnReceipt> {
        let submission = self.state.submission()?;

        let request = match self.pending.take() {
            Some(pending) if pending.body == submission => {
                debug!(submission_id = %pending.submission_id, "Retrying pending return");
                pending
            }
            _ => Envelope::new(submission),
        };

        match self.backend.submit_return(&request).await {
            Ok(receipt) => {
                info!(
                    sale_id = %request.body.sale_id,
                    return_id = %receipt.return_id,
                    refund = request.body.settlement.amount_to_refund.minor(),
                    collect = request.body.settlement.amount_to_collect.minor(),
                    "Return confirmed"
                );
                self.state.apply(ReturnAction::Confirm)?;
                self.product_results.clear();
                self.last_receipt = Some(receipt.clone());
                Ok(receipt)
            }
            Err(e) => {
                warn!(
                    sale_id = %request.body.sale_id,
                    submission_id = %request.submission_id,
                    error = %e,
                    "Return submission failed; selection kept"
                );
                self.pending = Some(request);
                Err(e)
            }
        }
    }

    /// Abandons the return. Nothing is sent.
    pub fn cancel(&mut self) -> ClientResult<()> {
        self.dispatch(ReturnAction::Cancel)?;
        self.pending = None;
        self.product_results.clear();
        info!("Return cancelled");
        Ok(())
    }

    /// Starts a fresh return after the previous one was closed.
    ///
    /// Forgets the previous receipt along with everything else.
    pub fn start_over(&mut self) {
        if self.state.is_open() && self.state.sale_id.is_some() {
            debug!(phase = %self.state.phase, "Discarding open return");
        }
        self.state = ReturnState::new();
        self.sale_results.clear();
        self.product_results.clear();
        self.pending = None;
        self.last_receipt = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::error::{ClientError, NoticeCode, UserNotice};
    use chrono::Utc;
    use kajamart_core::{Money, SaleLine, ValidationError, WorkflowPhase};

    fn sale() -> SaleRecord {
        SaleRecord {
            id: "V-1001".to_string(),
            customer_name: Some("Ana Gómez".to_string()),
            sold_at: Utc::now(),
            lines: vec![
                SaleLine {
                    product_id: "P-1".to_string(),
                    name: "Camiseta".to_string(),
                    unit_price: Money::from_minor(35500),
                    quantity: 2,
                },
                SaleLine {
                    product_id: "P-2".to_string(),
                    name: "Gorra".to_string(),
                    unit_price: Money::from_minor(20000),
                    quantity: 1,
                },
            ],
        }
    }

    fn product(id: &str, price: i64, stock: Option<i64>) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            name: format!("Producto {}", id),
            barcode: Some(format!("770{}", id)),
            price: Money::from_minor(price),
            stock,
            is_active: true,
        }
    }

    fn session_with(backend: Arc<MockBackend>) -> ReturnSession {
        ReturnSession::new(backend)
    }

    fn backend() -> Arc<MockBackend> {
        Arc::new(MockBackend {
            sales: vec![sale()],
            products: vec![product("R-1", 50000, Some(3)), product("R-2", 10000, None)],
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_search_validates_term_before_calling_backend() {
        let mut session = session_with(backend());

        let err = session.search_sales("   ").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let found = session.search_sales(" ana ").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "V-1001");
    }

    #[tokio::test]
    async fn test_full_exchange_collects_difference() {
        let backend = backend();
        let mut session = session_with(backend.clone());

        session.select_sale("V-1001").await.unwrap();
        session.set_return_quantity_text("P-1", " 1 ").unwrap();
        session.search_products("producto").await.unwrap();
        session.add_replacement("R-1", 1).unwrap();
        session.review().unwrap();

        let format = CurrencyFormat::default();
        assert_eq!(
            session.describe_settlement(&format),
            "Collect from customer: $ 14.500"
        );

        let receipt = session.confirm().await.unwrap();
        assert_eq!(receipt.sale_id, "V-1001");
        assert_eq!(session.state().phase, WorkflowPhase::Confirmed);

        let sent = backend.submitted_returns();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body.returned_items.len(), 1);
        assert_eq!(sent[0].body.settlement.amount_to_collect, Money::from_minor(14500));
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_state_and_reuses_id() {
        let backend = backend();
        let mut session = session_with(backend.clone());

        session.select_sale("V-1001").await.unwrap();
        session.adjust_return("P-1", 2).unwrap();
        let before = session.state().clone();

        backend.fail_next(1);
        let err = session.confirm().await.unwrap_err();
        let notice = UserNotice::from(err);
        assert_eq!(notice.code, NoticeCode::Server);
        assert!(notice.is_retryable());

        assert_eq!(session.state(), &before);
        assert!(session.has_pending_submission());
        let pending_id = session.pending.as_ref().unwrap().submission_id;

        session.confirm().await.unwrap();
        let sent = backend.submitted_returns();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].submission_id, pending_id);
        assert_eq!(sent[0].body.settlement.amount_to_refund, Money::from_minor(71000));
        assert!(!session.has_pending_submission());
    }

    #[tokio::test]
    async fn test_changed_selection_gets_new_submission_id() {
        let backend = backend();
        let mut session = session_with(backend.clone());

        session.select_sale("V-1001").await.unwrap();
        session.adjust_return("P-1", 1).unwrap();

        backend.fail_next(1);
        session.confirm().await.unwrap_err();
        let first_id = session.pending.as_ref().unwrap().submission_id;

        session.adjust_return("P-2", 1).unwrap();
        session.confirm().await.unwrap();

        let sent = backend.submitted_returns();
        assert_ne!(sent[0].submission_id, first_id);
        assert_eq!(sent[0].body.settlement.amount_to_refund, Money::from_minor(55500));
    }

    #[tokio::test]
    async fn test_confirm_with_nothing_selected_is_local_error() {
        let backend = backend();
        let mut session = session_with(backend.clone());
        session.select_sale("V-1001").await.unwrap();

        let err = session.confirm().await.unwrap_err();
        assert!(matches!(err, ClientError::Core(CoreError::NothingToConfirm)));
        assert_eq!(UserNotice::from(err).code, NoticeCode::NothingSelected);
        assert!(backend.submitted_returns().is_empty());
        assert!(session.state().is_open());
    }

    #[tokio::test]
    async fn test_bad_quantity_text_leaves_state() {
        let mut session = session_with(backend());
        session.select_sale("V-1001").await.unwrap();
        session.set_return_quantity_text("P-1", "1").unwrap();

        for input in ["", "-1", "1.5", "dos"] {
            assert!(session.set_return_quantity_text("P-1", input).is_err());
        }
        assert_eq!(session.state().total_returned_units(), 1);

        session.set_return_quantity_text("P-1", "99").unwrap();
        assert_eq!(session.state().total_returned_units(), 2);
    }

    #[tokio::test]
    async fn test_unknown_product_and_sale() {
        let mut session = session_with(backend());

        let err = session.select_sale("V-404").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));

        session.select_sale("V-1001").await.unwrap();
        let err = session.add_replacement("R-1", 1).unwrap_err();
        assert!(matches!(err, ClientError::Core(CoreError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_cancel_then_start_over() {
        let backend = backend();
        let mut session = session_with(backend.clone());

        session.select_sale("V-1001").await.unwrap();
        session.adjust_return("P-2", 1).unwrap();
        session.cancel().unwrap();

        assert_eq!(session.state().phase, WorkflowPhase::Cancelled);
        assert!(backend.submitted_returns().is_empty());
        assert!(session.adjust_return("P-2", 1).is_err());

        session.start_over();
        assert_eq!(session.state(), &ReturnState::new());
        session.select_sale("V-1001").await.unwrap();
    }

    #[tokio::test]
    async fn test_start_over_forgets_previous_receipt() {
        let mut session = session_with(backend());

        session.select_sale("V-1001").await.unwrap();
        session.adjust_return("P-2", 1).unwrap();
        session.confirm().await.unwrap();
        assert_eq!(session.last_receipt().unwrap().sale_id, "V-1001");

        session.start_over();
        assert!(session.last_receipt().is_none());
        assert!(session.sale_results().is_empty());
        assert_eq!(session.state(), &ReturnState::new());
    }

    #[tokio::test]
    async fn test_largest_typed_quantity_settles_without_overflow() {
        let mut session = session_with(backend());
        session.select_sale("V-1001").await.unwrap();
        session.set_return_quantity_text("P-2", "1").unwrap();
        session.search_products("producto").await.unwrap();
        session.add_replacement("R-2", 1).unwrap();

        session
            .set_replacement_quantity_text("R-2", "9223372036854775807")
            .unwrap();

        let settlement = session.state().settlement;
        assert_eq!(settlement.replacement_total, Money::from_minor(i64::MAX));
        assert_eq!(settlement.amount_to_collect, Money::from_minor(i64::MAX - 20000));
        assert!(settlement.amount_to_refund.is_zero());
    }
}
