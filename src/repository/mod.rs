//! Document repository seam
//!
//! The hosted real-time database is an external collaborator. This module
//! defines the surface the core needs from it (path-addressed reads, writes,
//! partial updates, removal, and whole-subtree subscriptions) together with an
//! in-memory implementation and a typed grievance wrapper.

pub mod memory;
pub mod store;

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::types::Result;

pub use memory::InMemoryRepository;
pub use store::GrievanceStore;

/// Full subtree at a subscribed path; `None` when nothing is stored there
pub type Snapshot = Option<Value>;

/// Path-addressed document store with change subscriptions
#[async_trait::async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Read the subtree at `path`
    async fn read(&self, path: &str) -> Result<Option<Value>>;

    /// Replace the document at `path`
    async fn write_at_path(&self, path: &str, document: Value) -> Result<()>;

    /// Merge the top-level keys of `partial` into the document at `path`.
    /// A `null` value removes that key.
    async fn update_at_path(&self, path: &str, partial: Value) -> Result<()>;

    /// Remove the subtree at `path`
    async fn remove_at_path(&self, path: &str) -> Result<()>;

    /// Subscribe to whole-subtree snapshots at `path`
    async fn subscribe(&self, path: &str) -> Result<Subscription>;
}

/// Split a slash-separated path into its non-empty segments
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Look up the subtree at `segments` inside `root`
pub fn value_at<'a>(root: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments {
        node = node.as_object()?.get(*segment)?;
    }
    if node.is_null() {
        None
    } else {
        Some(node)
    }
}

/// Live subscription to a repository path.
///
/// The first call to [`Subscription::next`] yields the current snapshot;
/// later calls wait for the subtree to change. Dropping the subscription
/// releases it; nothing further is delivered.
pub struct Subscription {
    path: String,
    segments: Vec<String>,
    rx: watch::Receiver<Arc<Value>>,
    last: Option<Snapshot>,
}

impl Subscription {
    /// Wrap a receiver over the repository root
    pub fn new(path: &str, rx: watch::Receiver<Arc<Value>>) -> Self {
        Self {
            path: path.to_string(),
            segments: split_path(path).into_iter().map(str::to_string).collect(),
            rx,
            last: None,
        }
    }

    /// Subscribed path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the repository has gone away.
    pub async fn next(&mut self) -> Option<Snapshot> {
        loop {
            if self.last.is_some() && self.rx.changed().await.is_err() {
                debug!("Repository closed, ending subscription to {}", self.path);
                return None;
            }

            let snapshot = {
                let root = self.rx.borrow_and_update();
                let segments: Vec<&str> = self.segments.iter().map(String::as_str).collect();
                value_at(&root, &segments).cloned()
            };

            // Writes elsewhere in the tree wake every subscriber; only deliver
            // when this subtree actually changed.
            if self.last.as_ref() == Some(&snapshot) {
                continue;
            }
            self.last = Some(snapshot.clone());
            return Some(snapshot);
        }
    }

    /// Stop consuming snapshots
    pub fn unsubscribe(self) {
        debug!("Unsubscribed from {}", self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_path_ignores_empty_segments() {
        assert_eq!(split_path("/grievances//u1/"), vec!["grievances", "u1"]);
        assert!(split_path("").is_empty());
    }

    #[test]
    fn test_value_at() {
        let root = json!({ "a": { "b": { "c": 1 } }, "n": null });
        assert_eq!(value_at(&root, &["a", "b", "c"]), Some(&json!(1)));
        assert_eq!(value_at(&root, &["a", "x"]), None);
        assert_eq!(value_at(&root, &["n"]), None);
        assert_eq!(value_at(&root, &[]), Some(&root));
    }
}
