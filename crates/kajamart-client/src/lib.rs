//! # kajamart-client
//!
//! REST boundary and session orchestration for Kajamart returns.
//!
//! ## Module Overview
//! - [`backend`] - `ReturnsBackend` trait, request envelope, receipts
//! - [`http`] - reqwest implementation of the backend
//! - [`credentials`] - Injected bearer-token provider
//! - [`session`] - Return/exchange session driving the core reducer
//! - [`writeoff`] - Write-off registration session
//! - [`config`] - Layered configuration (env > TOML > defaults)
//! - [`error`] - `ClientError` and user-facing notices
//! - [`telemetry`] - Tracing subscriber setup
//!
//! ## Wiring
//! ```rust,ignore
//! let config = ClientConfig::load_or_default(None);
//! let credentials: Arc<dyn CredentialProvider> = Arc::new(InMemoryCredentials::new());
//! let backend = Arc::new(HttpBackend::new(&config.api, credentials)?);
//!
//! let mut session = ReturnSession::new(backend);
//! session.search_sales("Ana").await?;
//! session.select_sale("V-1001").await?;
//! session.set_return_quantity_text("P-1", "1")?;
//! println!("{}", session.describe_settlement(&config.currency_format()));
//! session.confirm().await?;
//! ```

pub mod backend;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod session;
pub mod telemetry;
pub mod writeoff;

pub use backend::{Envelope, ReturnReceipt, ReturnRequest, ReturnsBackend, WriteOffReceipt, WriteOffRequest};
pub use config::{ApiSettings, ClientConfig, CurrencySettings};
pub use credentials::{CredentialProvider, InMemoryCredentials};
pub use error::{ClientError, ClientResult, NoticeCode, UserNotice};
pub use http::HttpBackend;
pub use session::ReturnSession;
pub use writeoff::WriteOffSession;
