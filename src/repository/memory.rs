//! In-memory document repository
//!
//! A single JSON tree behind a `watch` channel. Every successful mutation
//! publishes the new root, which is what drives [`Subscription`]s. Used by the
//! CLI (seeded from a snapshot file) and by tests.

use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{split_path, value_at, DocumentRepository, Subscription};
use crate::types::{DeskError, Result};

/// In-memory repository with change notification
pub struct InMemoryRepository {
    tree: watch::Sender<Arc<Value>>,
    /// When set, every mutation fails with a repository error
    fail_writes: AtomicBool,
}

impl InMemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::from_snapshot(Value::Null)
    }

    /// Create a repository seeded with `root`
    pub fn from_snapshot(root: Value) -> Self {
        let (tree, _) = watch::channel(Arc::new(root));
        Self {
            tree,
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Copy of the whole tree
    pub fn snapshot(&self) -> Value {
        self.tree.borrow().as_ref().clone()
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.tree.receiver_count()
    }

    /// Make subsequent mutations fail, simulating an unreachable backend
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self, path: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            warn!("Rejecting write to {}: repository unavailable", path);
            return Err(DeskError::Repository(format!(
                "write to {} rejected: repository unavailable",
                path
            )));
        }
        Ok(())
    }

    fn mutate<F>(&self, path: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Value, &[&str]) -> Result<bool>,
    {
        self.check_writable(path)?;
        let segments = split_path(path);
        let mut outcome = Ok(());
        self.tree.send_if_modified(|root| {
            match f(Arc::make_mut(root), &segments) {
                Ok(changed) => changed,
                Err(e) => {
                    outcome = Err(e);
                    false
                }
            }
        });
        outcome
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk to `segments`, creating objects along the way
fn node_mut<'a>(root: &'a mut Value, segments: &[&str]) -> &'a mut Value {
    let mut node = root;
    for segment in segments {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = match node {
            Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
            other => other,
        };
    }
    node
}

/// Remove the subtree at `segments`, pruning parents left empty.
/// Returns whether anything was removed.
fn remove_at(node: &mut Value, segments: &[&str]) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        let had_value = !node.is_null();
        *node = Value::Null;
        return had_value;
    };
    let Some(map) = node.as_object_mut() else {
        return false;
    };
    let removed = if rest.is_empty() {
        map.remove(*first).is_some()
    } else {
        match map.get_mut(*first) {
            Some(child) => {
                let removed = remove_at(child, rest);
                let empty = child.is_null() || child.as_object().is_some_and(Map::is_empty);
                if empty {
                    map.remove(*first);
                }
                removed
            }
            None => false,
        }
    };
    if map.is_empty() {
        *node = Value::Null;
    }
    removed
}

#[async_trait::async_trait]
impl DocumentRepository for InMemoryRepository {
    async fn read(&self, path: &str) -> Result<Option<Value>> {
        let segments = split_path(path);
        let root = self.tree.borrow();
        Ok(value_at(&root, &segments).cloned())
    }

    async fn write_at_path(&self, path: &str, document: Value) -> Result<()> {
        self.mutate(path, |root, segments| {
            if document.is_null() {
                return Ok(remove_at(root, segments));
            }
            let node = node_mut(root, segments);
            let changed = *node != document;
            *node = document;
            Ok(changed)
        })?;
        debug!("Wrote document at {}", path);
        Ok(())
    }

    async fn update_at_path(&self, path: &str, partial: Value) -> Result<()> {
        let Value::Object(fields) = partial else {
            return Err(DeskError::Repository(format!(
                "update at {} requires an object payload",
                path
            )));
        };
        self.mutate(path, |root, segments| {
            let node = node_mut(root, segments);
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Value::Object(target) = node else {
                return Ok(false);
            };
            for (key, value) in fields {
                if value.is_null() {
                    target.remove(&key);
                } else {
                    target.insert(key, value);
                }
            }
            Ok(true)
        })?;
        debug!("Updated document at {}", path);
        Ok(())
    }

    async fn remove_at_path(&self, path: &str) -> Result<()> {
        self.mutate(path, |root, segments| Ok(remove_at(root, segments)))?;
        debug!("Removed subtree at {}", path);
        Ok(())
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription> {
        debug!("New subscription to {}", path);
        Ok(Subscription::new(path, self.tree.subscribe()))
    }
}
