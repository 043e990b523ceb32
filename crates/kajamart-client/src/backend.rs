//! # Backend Seam
//!
//! The REST API is an external collaborator. Sessions talk to it through
//! [`ReturnsBackend`], so tests can swap in an in-memory double.
//!
//! ```text
//! ReturnSession ──► dyn ReturnsBackend ──┬──► HttpBackend (reqwest)
//!                                        └──► test double
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kajamart_core::writeoff::WriteOffSubmission;
use kajamart_core::{ProductRecord, ReturnSubmission, SaleRecord, SettlementResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ClientResult;

// =============================================================================
// Request Envelope
// =============================================================================

/// A submission stamped with an idempotency id.
///
/// The id is generated once per distinct payload and reused when the same
/// payload is retried, so the server can drop duplicates.
///
/// ```json
/// { "submissionId": "…", "requestedAt": "…", "saleId": "V-1001", … }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub submission_id: Uuid,
    pub requested_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn new(body: T) -> Self {
        Envelope {
            submission_id: Uuid::new_v4(),
            requested_at: Utc::now(),
            body,
        }
    }
}

pub type ReturnRequest = Envelope<ReturnSubmission>;
pub type WriteOffRequest = Envelope<WriteOffSubmission>;

// =============================================================================
// Receipts
// =============================================================================

/// Server acknowledgement of a processed return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnReceipt {
    /// Server-side id of the return record.
    pub return_id: String,
    pub sale_id: String,
    /// Settlement as recorded by the server.
    pub settlement: SettlementResult,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
}

/// Server acknowledgement of a registered write-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOffReceipt {
    pub write_off_id: String,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Backend Trait
// =============================================================================

/// Operations the screens need from the Kajamart API.
#[async_trait]
pub trait ReturnsBackend: Send + Sync {
    /// Sales matching an id or customer name.
    async fn find_sales(&self, term: &str) -> ClientResult<Vec<SaleRecord>>;

    /// A single sale with its lines.
    async fn get_sale(&self, sale_id: &str) -> ClientResult<SaleRecord>;

    /// Products matching a name or barcode.
    async fn search_products(&self, term: &str) -> ClientResult<Vec<ProductRecord>>;

    async fn submit_return(&self, request: &ReturnRequest) -> ClientResult<ReturnReceipt>;

    async fn submit_write_off(&self, request: &WriteOffRequest) -> ClientResult<WriteOffReceipt>;
}
