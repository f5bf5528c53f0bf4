//! In-memory identity provider
//!
//! Accounts keyed by lowercased email with Argon2 password hashes. Tracks a
//! single current identity and publishes every change through a `watch`
//! channel, mirroring a hosted auth SDK's state-change listener.

use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::identity::{is_valid_email, Identity, IdentityProvider};
use super::password::{check_strength, hash_password, verify_password};
use crate::types::IdentityError;

#[derive(Debug, Clone)]
struct Account {
    id: String,
    email: String,
    password_hash: String,
}

/// Identity provider held entirely in process memory
pub struct InMemoryIdentityProvider {
    /// Lowercased email -> account
    accounts: DashMap<String, Account>,
    /// Lowercased email -> number of reset requests sent
    reset_requests: DashMap<String, usize>,
    current: watch::Sender<Option<Identity>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            accounts: DashMap::new(),
            reset_requests: DashMap::new(),
            current,
        }
    }

    /// Currently signed-in identity
    pub fn current(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    /// Number of accounts
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Number of password reset messages sent to `email`
    pub fn reset_requests_for(&self, email: &str) -> usize {
        self.reset_requests
            .get(&email_key(email))
            .map(|count| *count)
            .unwrap_or(0)
    }

    fn set_current(&self, identity: Option<Identity>) {
        self.current.send_replace(identity);
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait::async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        if !is_valid_email(email) {
            return Err(IdentityError::InvalidEmail);
        }
        let account = self
            .accounts
            .get(&email_key(email))
            .map(|entry| entry.value().clone())
            .ok_or(IdentityError::UnknownAccount)?;

        if !verify_password(password, &account.password_hash)? {
            warn!("Failed sign-in for {}", account.email);
            return Err(IdentityError::WrongPassword);
        }

        let identity = Identity {
            id: account.id,
            email: account.email,
        };
        info!("Signed in {}", identity.email);
        self.set_current(Some(identity.clone()));
        Ok(identity)
    }

    async fn register(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        if !is_valid_email(email) {
            return Err(IdentityError::InvalidEmail);
        }
        check_strength(password)?;

        let key = email_key(email);
        let password_hash = hash_password(password)?;
        let account = match self.accounts.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => return Err(IdentityError::EmailInUse),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let account = Account {
                    id: Uuid::new_v4().simple().to_string(),
                    email: email.trim().to_string(),
                    password_hash,
                };
                slot.insert(account.clone());
                account
            }
        };

        let identity = Identity {
            id: account.id,
            email: account.email,
        };
        info!("Registered {}", identity.email);
        self.set_current(Some(identity.clone()));
        Ok(identity)
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        if !is_valid_email(email) {
            return Err(IdentityError::InvalidEmail);
        }
        let key = email_key(email);
        if !self.accounts.contains_key(&key) {
            return Err(IdentityError::UnknownAccount);
        }
        *self.reset_requests.entry(key).or_insert(0) += 1;
        debug!("Password reset requested for {}", email.trim());
        Ok(())
    }

    async fn delete_current_identity(&self) -> Result<(), IdentityError> {
        let identity = self.current().ok_or(IdentityError::NoSession)?;
        self.accounts.remove(&email_key(&identity.email));
        self.reset_requests.remove(&email_key(&identity.email));
        info!("Deleted account {}", identity.email);
        self.set_current(None);
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        if let Some(identity) = self.current() {
            info!("Signed out {}", identity.email);
        }
        self.set_current(None);
        Ok(())
    }

    fn watch(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }
}
