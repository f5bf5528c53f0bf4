//! Identity provider seam
//!
//! Authentication itself lives in an external service. The core only needs to
//! ask it to sign people in and out and to be told who is currently signed in.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::types::IdentityError;

/// An authenticated identity as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id, used as the grievance partition key
    pub id: String,
    pub email: String,
}

/// External identity provider
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in with email and password
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, IdentityError>;

    /// Create an account and sign it in
    async fn register(&self, email: &str, password: &str) -> Result<Identity, IdentityError>;

    /// Send a password reset message to `email`
    async fn request_password_reset(&self, email: &str) -> Result<(), IdentityError>;

    /// Delete the currently signed-in account
    async fn delete_current_identity(&self) -> Result<(), IdentityError>;

    /// Sign the current identity out
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// Change notifications of the current identity (or its absence)
    fn watch(&self) -> watch::Receiver<Option<Identity>>;
}

/// Basic shape check for an email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("asha@example.com"));
        assert!(is_valid_email("  admin@bolobharat.com "));
        assert!(!is_valid_email("asha"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("asha@localhost"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("a@b@example.com"));
    }
}
