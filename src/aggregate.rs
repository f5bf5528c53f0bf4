//! Derived views over a grievance collection
//!
//! Everything here is a pure function of its inputs so it can be re-run on
//! every snapshot the repository delivers.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{normalize_label, Domain, Grievance, GrievanceStatus};

/// Admin console filter. Unset or empty criteria are no-ops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrievanceFilter {
    /// Case-insensitive substring of the problem title
    pub search_term: Option<String>,
    /// Domain label, compared after normalization
    pub domain: Option<String>,
    /// Exact match against the effective status
    pub status: Option<GrievanceStatus>,
}

impl GrievanceFilter {
    pub fn is_empty(&self) -> bool {
        non_empty(&self.search_term).is_none()
            && non_empty(&self.domain).is_none()
            && self.status.is_none()
    }

    /// Whether `grievance` satisfies every set criterion
    pub fn matches(&self, grievance: &Grievance) -> bool {
        if let Some(term) = non_empty(&self.search_term) {
            let title = grievance.problem_title.to_lowercase();
            if !title.contains(&term.to_lowercase()) {
                return false;
            }
        }
        if let Some(domain) = non_empty(&self.domain) {
            if normalize_label(grievance.domain.as_str()) != normalize_label(domain) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if grievance.effective_status() != status {
                return false;
            }
        }
        true
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Grievances per domain. Domains without grievances are absent.
pub fn count_by_domain(grievances: &[Grievance]) -> BTreeMap<Domain, usize> {
    let mut counts = BTreeMap::new();
    for g in grievances {
        *counts.entry(g.domain).or_insert(0) += 1;
    }
    counts
}

/// Grievances per effective status
pub fn count_by_status(grievances: &[Grievance]) -> BTreeMap<GrievanceStatus, usize> {
    let mut counts = BTreeMap::new();
    for g in grievances {
        *counts.entry(g.effective_status()).or_insert(0) += 1;
    }
    counts
}

/// Grievances matching `filter`, in input order
pub fn filter<'a>(grievances: &'a [Grievance], filter: &GrievanceFilter) -> Vec<&'a Grievance> {
    grievances.iter().filter(|g| filter.matches(g)).collect()
}

/// Newest first by creation time; unknown creation time sorts as oldest.
/// Ties keep their input order.
pub fn sort_by_recency(mut grievances: Vec<Grievance>) -> Vec<Grievance> {
    grievances.sort_by_key(|g| std::cmp::Reverse(g.recency_key()));
    grievances
}

/// Split into (submitted by `user_id`, everyone else's)
pub fn partition_by_ownership<'a>(
    grievances: &'a [Grievance],
    user_id: &str,
) -> (Vec<&'a Grievance>, Vec<&'a Grievance>) {
    grievances.iter().partition(|g| g.submitter_id == user_id)
}

/// Labelled series for a bar chart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub labels: Vec<String>,
    pub values: Vec<usize>,
}

impl ChartSeries {
    fn from_counts<K: ToString>(label: &str, counts: &BTreeMap<K, usize>) -> Self {
        Self {
            label: label.to_string(),
            labels: counts.keys().map(ToString::to_string).collect(),
            values: counts.values().copied().collect(),
        }
    }

    pub fn by_domain(grievances: &[Grievance]) -> Self {
        Self::from_counts("Number of Complaints by Domain", &count_by_domain(grievances))
    }

    pub fn by_status(grievances: &[Grievance]) -> Self {
        Self::from_counts("Number of Complaints by Status", &count_by_status(grievances))
    }
}
