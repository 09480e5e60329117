//! Background eviction of nodes that stopped re-registering.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{info, warn};

use crate::registry::NodeRegistry;

/// Periodically prunes nodes whose `last_seen` is older than the TTL.
pub struct NodeSweeper {
    registry: Arc<NodeRegistry>,
    ttl: Duration,
    interval: Duration,
}

impl NodeSweeper {
    pub fn new(registry: Arc<NodeRegistry>, ttl: Duration, interval: Duration) -> Self {
        Self {
            registry,
            ttl,
            interval,
        }
    }

    /// Run forever. Returns immediately when the TTL is zero.
    pub async fn run(&self) {
        if self.ttl.is_zero() {
            info!("Node eviction is disabled");
            return;
        }

        info!(
            "Starting node sweeper (ttl: {:?}, interval: {:?})",
            self.ttl, self.interval
        );

        let mut ticker = interval(self.interval.max(Duration::from_millis(10)));
        loop {
            ticker.tick().await;
            self.sweep().await;
        }
    }

    /// Run a single eviction pass. Returns the number of evicted nodes.
    pub async fn sweep(&self) -> usize {
        let removed = self.registry.prune_stale(self.ttl).await;
        for node in &removed {
            warn!(node_id = %node.id, endpoint = %node.endpoint, "Evicted stale node");
        }
        removed.len()
    }
}
