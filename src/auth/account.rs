//! Account flows: registration, sign-in, password reset, profile details and
//! account deletion.
//!
//! Deletion cascades over everything stored under the user's id before the
//! identity itself is removed.

use std::sync::Arc;
use tracing::{info, warn};

use super::identity::{Identity, IdentityProvider};
use super::session::{normalize_admin_emails, resolve_actor, Actor};
use crate::model::{submitter_path, user_details_path, user_path, SubmitterDetails, UserDetails};
use crate::repository::DocumentRepository;
use crate::types::{DeskError, Result};

/// Where a freshly signed-in user is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// Administrators go straight to the console
    AdminConsole,
    /// Citizens confirm their profile details first
    UserDetails,
}

/// Result of a successful sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub actor: Actor,
    pub landing: Landing,
}

/// Account operations over an identity provider and the document repository
pub struct AccountService {
    provider: Arc<dyn IdentityProvider>,
    repo: Arc<dyn DocumentRepository>,
    admin_emails: Vec<String>,
}

impl AccountService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        repo: Arc<dyn DocumentRepository>,
        admin_emails: &[String],
    ) -> Self {
        Self {
            provider,
            repo,
            admin_emails: normalize_admin_emails(admin_emails),
        }
    }

    /// Create an account; the new identity is signed in
    pub async fn register(&self, email: &str, password: &str) -> Result<Actor> {
        let identity = self.provider.register(email, password).await?;
        Ok(resolve_actor(&identity, &self.admin_emails))
    }

    /// Sign in and decide where the user lands
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let identity = self.provider.authenticate(email, password).await?;
        let actor = resolve_actor(&identity, &self.admin_emails);
        let landing = if actor.is_admin() {
            Landing::AdminConsole
        } else {
            Landing::UserDetails
        };
        info!("{} signed in, landing on {:?}", actor.email, landing);
        Ok(LoginOutcome { actor, landing })
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.provider.sign_out().await?;
        Ok(())
    }

    /// Ask the provider to send a reset link
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(DeskError::Validation("Please enter your email.".to_string()));
        }
        self.provider.request_password_reset(email).await?;
        Ok(())
    }

    /// Store the actor's profile details
    pub async fn save_user_details(&self, actor: &Actor, details: &UserDetails) -> Result<()> {
        actor.require("save_user_details")?;
        let doc = serde_json::to_value(details)?;
        self.repo
            .write_at_path(&user_details_path(&actor.id), doc)
            .await
    }

    /// Profile details for `uid`, if any were saved
    pub async fn load_user_details(&self, uid: &str) -> Result<Option<UserDetails>> {
        let Some(doc) = self.repo.read(&user_details_path(uid)).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(doc)?))
    }

    /// Contact snapshot copied into a new grievance
    pub async fn submitter_details(&self, actor: &Actor) -> Result<SubmitterDetails> {
        let profile = self.load_user_details(&actor.id).await?.unwrap_or_default();
        Ok(SubmitterDetails {
            name: profile.name,
            email: actor.email.clone(),
            phone: profile.phone,
        })
    }

    /// Delete the signed-in account and all data stored under it
    pub async fn delete_account(&self, actor: &Actor) -> Result<()> {
        actor.require("delete_account")?;

        let current: Option<Identity> = self.provider.watch().borrow().clone();
        match current {
            Some(identity) if identity.id == actor.id => {}
            _ => {
                warn!("Refusing to delete {}: not the signed-in identity", actor.email);
                return Err(DeskError::Authorization(
                    "Only the signed-in user can delete their account".to_string(),
                ));
            }
        }

        for path in [
            submitter_path(&actor.id),
            user_details_path(&actor.id),
            user_path(&actor.id),
        ] {
            self.repo.remove_at_path(&path).await?;
        }
        self.provider.delete_current_identity().await?;
        info!("Deleted account {} and its data", actor.email);
        Ok(())
    }
}
