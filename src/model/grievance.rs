//! Grievance document schema
//!
//! Stored at `grievances/{submitterId}/{grievanceId}`. Field aliases accept the
//! names written by earlier clients (`userId`, `problem`, `timestamp`, ...),
//! and `votes` / `statusHistory` accept the older shapes of those fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::warn;

use super::domain::{Domain, GrievanceStatus, Language};

/// Root path under which grievances are partitioned by submitter
pub const GRIEVANCE_ROOT: &str = "grievances";

/// Contact details of the submitter, captured once at submission time
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitterDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// One recorded status transition
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub status: GrievanceStatus,
    pub previous_status: GrievanceStatus,
}

/// A citizen-submitted complaint
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Grievance {
    /// Push key, unique within the submitter's partition
    #[serde(default)]
    pub id: String,

    #[serde(default, alias = "userId")]
    pub submitter_id: String,

    pub domain: Domain,

    #[serde(default, alias = "problem")]
    pub problem_title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, alias = "language")]
    pub preferred_language: Language,

    /// Absent on documents written before status tracking existed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<GrievanceStatus>,

    #[serde(default, deserialize_with = "deserialize_status_history")]
    pub status_history: Vec<StatusChange>,

    #[serde(default, deserialize_with = "deserialize_votes")]
    pub votes: BTreeSet<String>,

    #[serde(
        default,
        alias = "timestamp",
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(
        default,
        alias = "lastUpdated",
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated_at: Option<DateTime<Utc>>,

    #[serde(default, alias = "userDetails")]
    pub submitter_details: SubmitterDetails,
}

impl Grievance {
    /// Create a fresh Pending grievance
    pub fn new(
        id: String,
        submitter_id: String,
        domain: Domain,
        problem_title: String,
        description: String,
        preferred_language: Language,
        submitter_details: SubmitterDetails,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            submitter_id,
            domain,
            problem_title,
            description,
            preferred_language,
            status: Some(GrievanceStatus::Pending),
            status_history: Vec::new(),
            votes: BTreeSet::new(),
            created_at: Some(now),
            last_updated_at: Some(now),
            submitter_details,
        }
    }

    /// Stored status, or Pending when none was ever written.
    ///
    /// For display, filtering and counting only.
    pub fn effective_status(&self) -> GrievanceStatus {
        self.status.unwrap_or_default()
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    pub fn has_voted(&self, voter_id: &str) -> bool {
        self.votes.contains(voter_id)
    }

    /// Sort key for recency: creation time in epoch millis, 0 when unknown
    pub fn recency_key(&self) -> i64 {
        self.created_at.map(|t| t.timestamp_millis()).unwrap_or(0)
    }

    /// When the grievance was submitted, falling back to its last update
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.or(self.last_updated_at)
    }

    /// Repository path of this grievance
    pub fn path(&self) -> String {
        grievance_path(&self.submitter_id, &self.id)
    }
}

/// `grievances/{submitterId}`
pub fn submitter_path(submitter_id: &str) -> String {
    format!("{}/{}", GRIEVANCE_ROOT, submitter_id)
}

/// `grievances/{submitterId}/{grievanceId}`
pub fn grievance_path(submitter_id: &str, grievance_id: &str) -> String {
    format!("{}/{}/{}", GRIEVANCE_ROOT, submitter_id, grievance_id)
}

/// Input collected by the grievance form, prior to validation
#[derive(Debug, Clone, Default)]
pub struct GrievanceDraft {
    pub domain: String,
    pub problem_title: String,
    pub description: String,
    pub preferred_language: String,
    pub submitter_details: SubmitterDetails,
}

/// Votes are a set of voter ids. Older documents carry a bare counter or a
/// `{voterId: true}` map; counters carry no voter identity and decode as empty.
fn deserialize_votes<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let votes = match raw {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .filter(|(_, v)| !matches!(v, Value::Bool(false) | Value::Null))
            .map(|(k, _)| k)
            .collect(),
        _ => BTreeSet::new(),
    };
    Ok(votes)
}

/// Status history is a list of transitions. Older documents carry a single
/// transition object, or a map of transitions keyed by push id; both become
/// a list ordered by timestamp. Entries that fail to decode are dropped.
fn deserialize_status_history<'de, D>(deserializer: D) -> Result<Vec<StatusChange>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let entries: Vec<Value> = match raw {
        Value::Array(items) => items,
        Value::Object(map) if map.contains_key("status") => vec![Value::Object(map)],
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        _ => Vec::new(),
    };

    let mut history: Vec<StatusChange> = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(change) => Some(change),
            Err(e) => {
                warn!("Dropping malformed status history entry: {}", e);
                None
            }
        })
        .collect();
    history.sort_by_key(|change| change.timestamp);
    Ok(history)
}
