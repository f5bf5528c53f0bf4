//! Session store
//!
//! Follows the identity provider's change notifications and resolves the
//! current identity into an [`Actor`]: the explicit context handed to every
//! operation that needs authorization.

use tokio::sync::watch;
use tracing::{debug, info};

use super::identity::{Identity, IdentityProvider};
use super::permissions::{get_operation_description, is_operation_allowed, PermissionLevel};
use crate::types::{DeskError, Result};

/// Who is performing an operation, and with what capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub email: String,
    pub level: PermissionLevel,
}

impl Actor {
    pub fn citizen(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            level: PermissionLevel::Authenticated,
        }
    }

    pub fn admin(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            level: PermissionLevel::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.level >= PermissionLevel::Admin
    }

    /// Fail with an authorization error unless this actor may run `operation`
    pub fn require(&self, operation: &str) -> Result<()> {
        if is_operation_allowed(operation, self.level) {
            return Ok(());
        }
        Err(DeskError::Authorization(format!(
            "{} ({}) may not: {}",
            self.email,
            self.level,
            get_operation_description(operation)
        )))
    }
}

/// Resolve an identity into an actor. `admin_emails` must already be
/// trimmed and lowercased (see [`normalize_admin_emails`]).
pub fn resolve_actor(identity: &Identity, admin_emails: &[String]) -> Actor {
    let email = identity.email.trim().to_lowercase();
    let level = if admin_emails.contains(&email) {
        PermissionLevel::Admin
    } else {
        PermissionLevel::Authenticated
    };
    Actor {
        id: identity.id.clone(),
        email: identity.email.clone(),
        level,
    }
}

pub fn normalize_admin_emails(admin_emails: &[String]) -> Vec<String> {
    admin_emails
        .iter()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Current-session tracker fed by identity change notifications
pub struct SessionStore {
    rx: watch::Receiver<Option<Identity>>,
    /// Lowercased emails granted administrator capability
    admin_emails: Vec<String>,
}

impl SessionStore {
    pub fn new(provider: &dyn IdentityProvider, admin_emails: &[String]) -> Self {
        Self {
            rx: provider.watch(),
            admin_emails: normalize_admin_emails(admin_emails),
        }
    }

    /// Resolve an identity into an actor using the admin list
    pub fn resolve(&self, identity: &Identity) -> Actor {
        resolve_actor(identity, &self.admin_emails)
    }

    /// Actor for the latest notified identity, if anyone is signed in
    pub fn current(&self) -> Option<Actor> {
        self.rx.borrow().as_ref().map(|identity| self.resolve(identity))
    }

    /// Actor for the current session, or a validation error when signed out
    pub fn require_current(&self) -> Result<Actor> {
        self.current().ok_or_else(|| {
            DeskError::Validation("User not authenticated. Please log in.".to_string())
        })
    }

    /// Wait for the next sign-in or sign-out notification.
    ///
    /// Returns `None` once the provider has gone away.
    pub async fn changed(&mut self) -> Option<Option<Actor>> {
        if self.rx.changed().await.is_err() {
            debug!("Identity provider closed");
            return None;
        }
        let identity = self.rx.borrow_and_update().clone();
        let actor = identity.as_ref().map(|i| self.resolve(i));
        match &actor {
            Some(a) => info!("Session started for {} ({})", a.email, a.level),
            None => info!("Session cleared"),
        }
        Some(actor)
    }
}
