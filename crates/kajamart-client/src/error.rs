//! # Client Error Types
//!
//! Failures at the REST boundary, plus the notice shown to the user.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Kajamart Returns                       │
//! │                                                                         │
//! │  ReturnSession::confirm()                                               │
//! │         │                                                               │
//! │         ├── precondition fails ── CoreError::NothingToConfirm ──┐       │
//! │         │                                                        │       │
//! │         ├── network fails ─────── ClientError::Http ─────────────┤       │
//! │         │                                                        ▼       │
//! │         │                                              UserNotice {      │
//! │         │                                                code, message } │
//! │         └── success ──► ReturnReceipt                                   │
//! │                                                                         │
//! │  In every failure case the session keeps its state for a retry.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kajamart_core::{CoreError, ValidationError};
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Client Error
// =============================================================================

/// Everything that can go wrong outside the pure core.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, TLS, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The stored credential was missing or rejected.
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied.
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server rejected the payload.
    #[error("Rejected by server: {0}")]
    Rejected(String),

    /// Any other non-success status.
    #[error("Server error ({status}): {body}")]
    Server { status: u16, body: String },

    /// Response did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid or unreadable configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// File system error while loading or saving config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Business rule or validation failure from the core.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Core(CoreError::Validation(err))
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

// =============================================================================
// User Notice
// =============================================================================

/// What the screen shows when an operation fails.
///
/// ```json
/// { "code": "NOTHING_SELECTED", "message": "Nothing to confirm: ..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotice {
    /// Machine-readable code for the front end.
    pub code: NoticeCode,

    /// Human-readable message for display.
    pub message: String,
}

/// Notice categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeCode {
    /// Input failed validation; fix the field and retry.
    Validation,

    /// Confirmation attempted without a selection.
    NothingSelected,

    /// Action not possible in the current step.
    InvalidStep,

    /// Product or sale missing.
    NotFound,

    /// Not enough stock for the request.
    InsufficientStock,

    /// Login needed.
    Unauthorized,

    /// Could not reach the server; safe to retry.
    Network,

    /// Server refused or failed the request.
    Server,

    /// Anything else.
    Internal,
}

impl UserNotice {
    pub fn new(code: NoticeCode, message: impl Into<String>) -> Self {
        UserNotice {
            code,
            message: message.into(),
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.code, NoticeCode::Network | NoticeCode::Server)
    }
}

impl From<CoreError> for UserNotice {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::NothingToConfirm | CoreError::NoUnitsReturned => {
                NoticeCode::NothingSelected
            }
            CoreError::ActionNotAllowed { .. } | CoreError::SessionClosed(_) => {
                NoticeCode::InvalidStep
            }
            CoreError::ItemNotFound(_) | CoreError::ProductUnavailable(_) => NoticeCode::NotFound,
            CoreError::InsufficientStock { .. } => NoticeCode::InsufficientStock,
            CoreError::Validation(_) => NoticeCode::Validation,
        };
        UserNotice::new(code, err.to_string())
    }
}

impl From<ClientError> for UserNotice {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Core(e) => e.into(),
            ClientError::Unauthorized => {
                UserNotice::new(NoticeCode::Unauthorized, "Please sign in again")
            }
            ClientError::Forbidden(_) => UserNotice::new(
                NoticeCode::Unauthorized,
                "You do not have permission for this operation",
            ),
            ClientError::NotFound(what) => {
                UserNotice::new(NoticeCode::NotFound, format!("Not found: {}", what))
            }
            ClientError::Rejected(reason) => UserNotice::new(NoticeCode::Validation, reason),
            ClientError::Http(e) => {
                tracing::warn!("HTTP request failed: {}", e);
                UserNotice::new(
                    NoticeCode::Network,
                    "Could not reach the server. Your selection is kept; try again.",
                )
            }
            ClientError::Server { status, body } => {
                tracing::error!(status, body = %body, "Server error");
                UserNotice::new(
                    NoticeCode::Server,
                    "The server could not complete the request. Try again.",
                )
            }
            other => {
                tracing::error!("Internal client error: {}", other);
                UserNotice::new(NoticeCode::Internal, "An unexpected error occurred")
            }
        }
    }
}

impl std::fmt::Display for UserNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}
