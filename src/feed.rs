//! Live grievance views
//!
//! A feed subscribes to the grievance tree and recomputes a view model on
//! every delivered snapshot and on every parameter change (filter edits,
//! signed-in user). Recomputation is a pure function of the latest snapshot
//! and the current parameters.
//!
//! # Lifecycle
//!
//! ```text
//! repository ──snapshot──► feed task ──view──► watch::Receiver<V>
//!                              ▲
//!         set_params ──────────┘
//! ```
//!
//! Dropping or closing the [`GrievanceFeed`] stops the task, which releases the
//! repository subscription.

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::aggregate::{
    filter, partition_by_ownership, sort_by_recency, ChartSeries, GrievanceFilter,
};
use crate::model::Grievance;
use crate::repository::store::flatten_snapshot;
use crate::repository::GrievanceStore;
use crate::types::Result;

/// A view derived from the whole grievance collection
pub trait ViewModel: Clone + Default + Send + Sync + 'static {
    /// Inputs besides the collection that the view depends on
    type Params: Clone + Send + Sync + 'static;

    fn compute(grievances: &[Grievance], params: &Self::Params) -> Self;
}

/// Administrator console: filtered list plus charts over everything
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdminView {
    /// Newest first, after filtering
    pub grievances: Vec<Grievance>,
    /// Size of the unfiltered collection
    pub total: usize,
    pub domain_chart: ChartSeries,
    pub status_chart: ChartSeries,
}

impl ViewModel for AdminView {
    type Params = GrievanceFilter;

    fn compute(grievances: &[Grievance], params: &GrievanceFilter) -> Self {
        let sorted = sort_by_recency(grievances.to_vec());
        Self {
            grievances: filter(&sorted, params).into_iter().cloned().collect(),
            total: sorted.len(),
            domain_chart: ChartSeries::by_domain(&sorted),
            status_chart: ChartSeries::by_status(&sorted),
        }
    }
}

/// Citizen dashboard: own grievances and everyone else's, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardView {
    pub mine: Vec<Grievance>,
    pub others: Vec<Grievance>,
}

impl ViewModel for DashboardView {
    /// Signed-in user id
    type Params = String;

    fn compute(grievances: &[Grievance], user_id: &String) -> Self {
        let sorted = sort_by_recency(grievances.to_vec());
        let (mine, others) = partition_by_ownership(&sorted, user_id);
        Self {
            mine: mine.into_iter().cloned().collect(),
            others: others.into_iter().cloned().collect(),
        }
    }
}

/// Handle to a running feed
pub struct GrievanceFeed<V: ViewModel> {
    view_rx: watch::Receiver<V>,
    params_tx: watch::Sender<V::Params>,
    shutdown_tx: broadcast::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl<V: ViewModel> GrievanceFeed<V> {
    /// Start a feed of `V` over the grievance tree
    pub async fn spawn(store: &GrievanceStore, params: V::Params) -> Result<Self> {
        let mut subscription = store.subscribe().await?;
        let (view_tx, view_rx) = watch::channel(V::default());
        let (params_tx, mut params_rx) = watch::channel(params);
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

        let task = tokio::spawn(async move {
            let mut latest: Vec<Grievance> = Vec::new();
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!("Feed shutdown received");
                        break;
                    }
                    snapshot = subscription.next() => match snapshot {
                        Some(snapshot) => {
                            latest = flatten_snapshot(&snapshot);
                            debug!("Feed received snapshot with {} grievances", latest.len());
                        }
                        None => {
                            info!("Repository closed, stopping feed");
                            break;
                        }
                    },
                    changed = params_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }

                let params = params_rx.borrow_and_update().clone();
                view_tx.send_replace(V::compute(&latest, &params));
            }
            subscription.unsubscribe();
        });

        Ok(Self {
            view_rx,
            params_tx,
            shutdown_tx,
            task: Some(task),
        })
    }

    /// Latest computed view
    pub fn view(&self) -> V {
        self.view_rx.borrow().clone()
    }

    /// Independent receiver of view updates
    pub fn subscribe(&self) -> watch::Receiver<V> {
        self.view_rx.clone()
    }

    /// Wait for the next recomputed view. `None` once the feed has stopped.
    pub async fn changed(&mut self) -> Option<V> {
        self.view_rx.changed().await.ok()?;
        Some(self.view_rx.borrow_and_update().clone())
    }

    /// Replace the view parameters; triggers a recompute
    pub fn set_params(&self, params: V::Params) {
        self.params_tx.send_replace(params);
    }

    /// Stop the feed and wait for it to release its subscription
    pub async fn close(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl<V: ViewModel> Drop for GrievanceFeed<V> {
    fn drop(&mut self) {
        // Already stopped by close()
        let Some(task) = self.task.take() else {
            return;
        };
        let _ = self.shutdown_tx.send(());
        task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Domain, GrievanceStatus};
    use crate::repository::{DocumentRepository, InMemoryRepository};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    async fn seeded() -> (Arc<InMemoryRepository>, GrievanceStore) {
        let repo = Arc::new(InMemoryRepository::from_snapshot(json!({
            "grievances": {
                "u1": {
                    "g1": { "domain": "Health", "problemTitle": "Clinic", "createdAt": 10 },
                    "g2": { "domain": "Transport", "problemTitle": "Bus", "createdAt": 30,
                            "status": "Resolved" }
                },
                "u2": {
                    "g3": { "domain": "Health", "problemTitle": "Ambulance", "createdAt": 20 }
                }
            }
        })));
        let store = GrievanceStore::new(repo.clone());
        (repo, store)
    }

    #[tokio::test]
    async fn test_admin_feed_initial_view() {
        let (_repo, store) = seeded().await;
        let mut feed = GrievanceFeed::<AdminView>::spawn(&store, GrievanceFilter::default())
            .await
            .unwrap();

        let view = feed.changed().await.unwrap();
        assert_eq!(view.total, 3);
        let order: Vec<_> = view.grievances.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(order, vec!["g2", "g3", "g1"]);
        assert_eq!(view.domain_chart.labels, vec!["Health", "Transport"]);
        assert_eq!(view.domain_chart.values, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_admin_feed_recomputes_on_filter_change() {
        let (_repo, store) = seeded().await;
        let mut feed = GrievanceFeed::<AdminView>::spawn(&store, GrievanceFilter::default())
            .await
            .unwrap();
        feed.changed().await.unwrap();

        feed.set_params(GrievanceFilter {
            status: Some(GrievanceStatus::Pending),
            ..Default::default()
        });
        let view = feed.changed().await.unwrap();
        assert_eq!(view.grievances.len(), 2);
        // Charts still cover the whole collection
        assert_eq!(view.total, 3);
    }

    #[tokio::test]
    async fn test_admin_feed_follows_writes_and_empty_snapshot() {
        let (repo, store) = seeded().await;
        let mut feed = GrievanceFeed::<AdminView>::spawn(&store, GrievanceFilter::default())
            .await
            .unwrap();
        feed.changed().await.unwrap();

        repo.remove_at_path("grievances").await.unwrap();
        let view = feed.changed().await.unwrap();
        assert_eq!(view.total, 0);
        assert!(view.grievances.is_empty());
        assert!(view.domain_chart.labels.is_empty());

        repo.write_at_path(
            "grievances/u3/g9",
            json!({ "domain": "Finance", "problemTitle": "Pension", "createdAt": 5 }),
        )
        .await
        .unwrap();
        let view = feed.changed().await.unwrap();
        assert_eq!(view.total, 1);
        assert_eq!(view.grievances[0].domain, Domain::Finance);
    }

    #[tokio::test]
    async fn test_dashboard_feed_partitions() {
        let (_repo, store) = seeded().await;
        let mut feed = GrievanceFeed::<DashboardView>::spawn(&store, "u1".to_string())
            .await
            .unwrap();
        let view = feed.changed().await.unwrap();
        assert_eq!(view.mine.len(), 2);
        assert_eq!(view.others.len(), 1);

        feed.set_params("u2".to_string());
        let view = feed.changed().await.unwrap();
        assert_eq!(view.mine.len(), 1);
        assert_eq!(view.mine[0].id, "g3");
    }

    #[tokio::test]
    async fn test_close_releases_subscription() {
        let (repo, store) = seeded().await;
        let feed = GrievanceFeed::<AdminView>::spawn(&store, GrievanceFilter::default())
            .await
            .unwrap();
        assert_eq!(repo.subscriber_count(), 1);
        feed.close().await;
        assert_eq!(repo.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_close_stops_updates_once() {
        let (repo, store) = seeded().await;
        let mut feed = GrievanceFeed::<AdminView>::spawn(&store, GrievanceFilter::default())
            .await
            .unwrap();
        feed.changed().await.unwrap();
        let mut updates = feed.subscribe();

        feed.close().await;
        assert!(updates.changed().await.is_err());
        assert_eq!(repo.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_drop_releases_subscription() {
        let (repo, store) = seeded().await;
        let feed = GrievanceFeed::<DashboardView>::spawn(&store, "u1".to_string())
            .await
            .unwrap();
        drop(feed);

        for _ in 0..100 {
            if repo.subscriber_count() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(repo.subscriber_count(), 0);
    }
}
