//! Grievance lifecycle: submission, status changes and votes
//!
//! Every mutation goes through the [`GrievanceStore`]; writes to the same
//! grievance are not coordinated here, the repository's last write wins.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::Actor;
use crate::model::{
    Domain, Grievance, GrievanceDraft, GrievanceStatus, Language, StatusChange,
};
use crate::repository::GrievanceStore;
use crate::types::{DeskError, Result};

/// Creates and mutates grievances on behalf of actors
#[derive(Clone)]
pub struct GrievanceService {
    store: GrievanceStore,
}

impl GrievanceService {
    pub fn new(store: GrievanceStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &GrievanceStore {
        &self.store
    }

    /// File a new grievance for the signed-in actor.
    ///
    /// Returns the new grievance id.
    pub async fn submit(&self, actor: Option<&Actor>, draft: GrievanceDraft) -> Result<String> {
        let actor = actor.ok_or_else(|| {
            DeskError::Validation("User not authenticated. Please log in.".to_string())
        })?;
        actor.require("submit_grievance")?;

        let domain: Domain = draft.domain.parse().map_err(DeskError::Validation)?;
        let problem_title = required(&draft.problem_title, "Problem title")?;
        let description = required(&draft.description, "Description")?;
        let language: Language = draft
            .preferred_language
            .parse()
            .map_err(DeskError::Validation)?;

        let id = Uuid::new_v4().simple().to_string();
        let grievance = Grievance::new(
            id.clone(),
            actor.id.clone(),
            domain,
            problem_title,
            description,
            language,
            draft.submitter_details,
            Utc::now(),
        );
        self.store.put(&grievance).await?;

        info!("Grievance {} submitted by {} under {}", id, actor.email, domain);
        Ok(id)
    }

    /// Move a grievance to `new_status`, recording the transition.
    ///
    /// Only administrators may do this; the check happens before any read.
    pub async fn change_status(
        &self,
        actor: &Actor,
        submitter_id: &str,
        grievance_id: &str,
        new_status: GrievanceStatus,
    ) -> Result<Grievance> {
        if let Err(e) = actor.require("change_status") {
            warn!(
                "{} attempted to change status of {} without admin rights",
                actor.email, grievance_id
            );
            return Err(e);
        }

        let mut grievance = self.fetch(submitter_id, grievance_id).await?;
        let now = Utc::now();
        let previous = grievance.effective_status();

        grievance.status_history.push(StatusChange {
            timestamp: now,
            status: new_status,
            previous_status: previous,
        });
        grievance.status = Some(new_status);
        grievance.last_updated_at = Some(now);

        let mut fields = Map::new();
        fields.insert("status".into(), serde_json::to_value(new_status)?);
        fields.insert("lastUpdatedAt".into(), Value::from(now.timestamp_millis()));
        fields.insert(
            "statusHistory".into(),
            serde_json::to_value(&grievance.status_history)?,
        );
        self.store
            .update_fields(submitter_id, grievance_id, fields)
            .await?;

        info!(
            "Grievance {} moved {} -> {} by {}",
            grievance_id, previous, new_status, actor.email
        );
        Ok(grievance)
    }

    /// Endorse someone else's grievance. Voting twice is a no-op.
    pub async fn cast_vote(
        &self,
        voter: &Actor,
        submitter_id: &str,
        grievance_id: &str,
    ) -> Result<()> {
        voter.require("cast_vote")?;
        if voter.id == submitter_id {
            return Err(DeskError::SelfVote {
                grievance_id: grievance_id.to_string(),
            });
        }

        let mut grievance = self.fetch(submitter_id, grievance_id).await?;
        if grievance.has_voted(&voter.id) {
            debug!("{} already voted on {}", voter.id, grievance_id);
            return Ok(());
        }
        grievance.votes.insert(voter.id.clone());

        let mut fields = Map::new();
        fields.insert("votes".into(), serde_json::to_value(&grievance.votes)?);
        fields.insert(
            "lastUpdatedAt".into(),
            Value::from(Utc::now().timestamp_millis()),
        );
        self.store
            .update_fields(submitter_id, grievance_id, fields)
            .await?;

        info!(
            "Vote by {} on {} ({} total)",
            voter.id,
            grievance_id,
            grievance.vote_count()
        );
        Ok(())
    }

    /// Fetch one grievance
    pub async fn get(&self, submitter_id: &str, grievance_id: &str) -> Result<Option<Grievance>> {
        self.store.get(submitter_id, grievance_id).await
    }

    /// All grievances across every submitter
    pub async fn list_all(&self) -> Result<Vec<Grievance>> {
        self.store.list_all().await
    }

    async fn fetch(&self, submitter_id: &str, grievance_id: &str) -> Result<Grievance> {
        self.store
            .get(submitter_id, grievance_id)
            .await?
            .ok_or_else(|| {
                DeskError::NotFound(format!("grievance {}/{}", submitter_id, grievance_id))
            })
    }
}

/// Trimmed value of a required free-text field
fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DeskError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}
