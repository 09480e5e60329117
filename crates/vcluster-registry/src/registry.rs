//! The node table.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;
use vcluster_models::NodeRecord;

/// A registered node plus liveness bookkeeping.
#[derive(Debug, Clone)]
pub struct NodeEntry {
    pub record: NodeRecord,
    pub registered_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// In-memory registry of worker nodes, kept in first-registration order.
///
/// At most one entry exists per node id. Re-registering an id overwrites
/// its endpoint in place.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    entries: RwLock<Vec<NodeEntry>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh a node. Returns the registry size afterwards.
    pub async fn register(&self, node: NodeRecord) -> usize {
        self.register_at(node, Utc::now()).await
    }

    async fn register_at(&self, node: NodeRecord, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;

        match entries.iter_mut().find(|e| e.record.id == node.id) {
            Some(entry) => {
                if entry.record.endpoint != node.endpoint {
                    info!(
                        node_id = %node.id,
                        old_endpoint = %entry.record.endpoint,
                        new_endpoint = %node.endpoint,
                        "Node endpoint changed"
                    );
                    entry.record.endpoint = node.endpoint;
                }
                entry.last_seen = now;
            }
            None => {
                info!(node_id = %node.id, endpoint = %node.endpoint, "Node registered");
                entries.push(NodeEntry {
                    record: node,
                    registered_at: now,
                    last_seen: now,
                });
            }
        }

        entries.len()
    }

    /// Snapshot of all nodes in registration order.
    pub async fn list(&self) -> Vec<NodeRecord> {
        self.entries
            .read()
            .await
            .iter()
            .map(|e| e.record.clone())
            .collect()
    }

    /// Snapshot including liveness timestamps.
    pub async fn entries(&self) -> Vec<NodeEntry> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remove nodes not seen within `ttl`. Returns the removed records.
    pub async fn prune_stale(&self, ttl: Duration) -> Vec<NodeRecord> {
        self.prune_stale_at(ttl, Utc::now()).await
    }

    async fn prune_stale_at(&self, ttl: Duration, now: DateTime<Utc>) -> Vec<NodeRecord> {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return Vec::new();
        };
        let cutoff = now - ttl;

        let mut entries = self.entries.write().await;
        let mut removed = Vec::new();
        entries.retain(|e| {
            if e.last_seen < cutoff {
                removed.push(e.record.clone());
                false
            } else {
                true
            }
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, endpoint: &str) -> NodeRecord {
        NodeRecord::new(id, endpoint)
    }

    #[tokio::test]
    async fn test_register_returns_count() {
        let registry = NodeRegistry::new();
        assert_eq!(registry.register(node("a", "http://a:1")).await, 1);
        assert_eq!(registry.register(node("b", "http://b:1")).await, 2);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_reregistration_is_idempotent() {
        let registry = NodeRegistry::new();
        registry.register(node("a", "http://a:1")).await;
        registry.register(node("b", "http://b:1")).await;

        let count = registry.register(node("a", "http://a:2")).await;

        assert_eq!(count, 2);
        let nodes = registry.list().await;
        assert_eq!(nodes, vec![node("a", "http://a:2"), node("b", "http://b:1")]);
    }

    #[tokio::test]
    async fn test_list_preserves_registration_order() {
        let registry = NodeRegistry::new();
        for id in ["w3", "w1", "w2"] {
            registry.register(node(id, &format!("http://{}:1", id))).await;
        }

        let ids: Vec<_> = registry.list().await.into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["w3", "w1", "w2"]);
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let registry = NodeRegistry::new();
        assert!(registry.is_empty().await);
        assert!(registry.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_reregistration_refreshes_last_seen() {
        let registry = NodeRegistry::new();
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(20);

        registry.register_at(node("a", "http://a:1"), t0).await;
        registry.register_at(node("a", "http://a:1"), t1).await;

        let entries = registry.entries().await;
        assert_eq!(entries[0].registered_at, t0);
        assert_eq!(entries[0].last_seen, t1);
    }

    #[tokio::test]
    async fn test_prune_stale() {
        let registry = NodeRegistry::new();
        let t0 = Utc::now();

        registry.register_at(node("old", "http://old:1"), t0).await;
        registry
            .register_at(node("fresh", "http://fresh:1"), t0 + chrono::Duration::seconds(50))
            .await;

        let removed = registry
            .prune_stale_at(Duration::from_secs(30), t0 + chrono::Duration::seconds(60))
            .await;

        assert_eq!(removed, vec![node("old", "http://old:1")]);
        assert_eq!(registry.list().await, vec![node("fresh", "http://fresh:1")]);
    }
}
