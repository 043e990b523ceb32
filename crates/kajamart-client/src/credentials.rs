//! # Credentials
//!
//! The bearer token attached to API calls. Constructed once at startup and
//! passed to the backend as `Arc<dyn CredentialProvider>`; there is no
//! process-wide token.

use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Source of the bearer token for API requests.
pub trait CredentialProvider: Send + Sync + fmt::Debug {
    /// Current token, if signed in.
    fn get(&self) -> Option<String>;

    /// Stores a new token after sign-in.
    fn set(&self, token: String);

    /// Forgets the token (sign-out, or the server rejected it).
    fn clear(&self);
}

/// Token held in process memory only.
#[derive(Default)]
pub struct InMemoryCredentials {
    token: RwLock<Option<String>>,
}

impl InMemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        InMemoryCredentials {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl CredentialProvider for InMemoryCredentials {
    fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: String) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl fmt::Debug for InMemoryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present = self
            .token
            .read()
            .map(|t| t.is_some())
            .unwrap_or(false);
        f.debug_struct("InMemoryCredentials")
            .field("token", if present { &"<redacted>" } else { &"<none>" })
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_set_get_clear() {
        let creds: Arc<dyn CredentialProvider> = Arc::new(InMemoryCredentials::new());
        assert_eq!(creds.get(), None);

        creds.set("abc123".to_string());
        assert_eq!(creds.get().as_deref(), Some("abc123"));

        creds.clear();
        assert_eq!(creds.get(), None);
    }

    #[test]
    fn test_debug_hides_token() {
        let creds = InMemoryCredentials::with_token("secret-token");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }
}
