//! Typed grievance access over a [`DocumentRepository`]
//!
//! Converts between repository JSON and [`Grievance`] values, and flattens the
//! `grievances/{submitterId}/{grievanceId}` tree into a flat collection.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

use super::{DocumentRepository, Snapshot, Subscription};
use crate::model::{grievance_path, Grievance, GRIEVANCE_ROOT};
use crate::types::Result;

/// Grievance collection backed by a document repository
#[derive(Clone)]
pub struct GrievanceStore {
    repo: Arc<dyn DocumentRepository>,
}

impl GrievanceStore {
    pub fn new(repo: Arc<dyn DocumentRepository>) -> Self {
        Self { repo }
    }

    /// Underlying repository
    pub fn repository(&self) -> &Arc<dyn DocumentRepository> {
        &self.repo
    }

    /// Fetch one grievance
    pub async fn get(&self, submitter_id: &str, grievance_id: &str) -> Result<Option<Grievance>> {
        let path = grievance_path(submitter_id, grievance_id);
        let Some(doc) = self.repo.read(&path).await? else {
            return Ok(None);
        };
        Ok(decode(submitter_id, grievance_id, doc))
    }

    /// Write a complete grievance document
    pub async fn put(&self, grievance: &Grievance) -> Result<()> {
        let doc = serde_json::to_value(grievance)?;
        self.repo.write_at_path(&grievance.path(), doc).await
    }

    /// Merge selected fields into a stored grievance
    pub async fn update_fields(
        &self,
        submitter_id: &str,
        grievance_id: &str,
        fields: Map<String, Value>,
    ) -> Result<()> {
        let path = grievance_path(submitter_id, grievance_id);
        self.repo.update_at_path(&path, Value::Object(fields)).await
    }

    /// Every stored grievance, in repository key order
    pub async fn list_all(&self) -> Result<Vec<Grievance>> {
        let snapshot = self.repo.read(GRIEVANCE_ROOT).await?;
        Ok(flatten_snapshot(&snapshot))
    }

    /// Subscribe to the whole grievance tree
    pub async fn subscribe(&self) -> Result<Subscription> {
        self.repo.subscribe(GRIEVANCE_ROOT).await
    }
}

/// Decode one document, stamping it with the ids taken from its path
fn decode(submitter_id: &str, grievance_id: &str, doc: Value) -> Option<Grievance> {
    match serde_json::from_value::<Grievance>(doc) {
        Ok(mut g) => {
            g.id = grievance_id.to_string();
            g.submitter_id = submitter_id.to_string();
            Some(g)
        }
        Err(e) => {
            warn!(
                "Skipping undecodable grievance {}/{}: {}",
                submitter_id, grievance_id, e
            );
            None
        }
    }
}

/// Flatten a `grievances` snapshot into a list.
///
/// An absent snapshot is an empty collection. Documents that fail to decode
/// are skipped and logged.
pub fn flatten_snapshot(snapshot: &Snapshot) -> Vec<Grievance> {
    let Some(Value::Object(by_submitter)) = snapshot else {
        return Vec::new();
    };

    let mut grievances = Vec::new();
    for (submitter_id, partition) in by_submitter {
        let Value::Object(docs) = partition else {
            warn!("Skipping malformed partition for submitter {}", submitter_id);
            continue;
        };
        for (grievance_id, doc) in docs {
            if let Some(g) = decode(submitter_id, grievance_id, doc.clone()) {
                grievances.push(g);
            }
        }
    }
    grievances
}
