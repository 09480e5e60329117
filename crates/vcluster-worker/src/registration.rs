//! Self-registration with the node registry.

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use vcluster_client::{ClientResult, RegistryClient};
use vcluster_models::NodeRecord;

/// Consecutive heartbeat failures logged before going quiet.
const MAX_LOGGED_FAILURES: u32 = 3;

/// Generate a node id of the form `worker-<6 hex chars>`.
pub fn generate_node_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("worker-{}", &hex[..6])
}

/// Registers this worker and keeps the registration fresh.
pub struct Registrar {
    client: RegistryClient,
    node: NodeRecord,
    heartbeat: Duration,
}

impl Registrar {
    pub fn new(client: RegistryClient, node: NodeRecord, heartbeat: Duration) -> Self {
        Self {
            client,
            node,
            heartbeat,
        }
    }

    pub fn node(&self) -> &NodeRecord {
        &self.node
    }

    /// Register once. Returns the registry size.
    pub async fn register_once(&self) -> ClientResult<usize> {
        self.client.register(&self.node).await
    }

    /// Register, then re-register every heartbeat interval.
    ///
    /// Registration failures never stop the worker; it keeps serving and
    /// retries on the next heartbeat.
    pub async fn run(self) {
        let mut tracker = FailureTracker::new(MAX_LOGGED_FAILURES);

        match self.register_once().await {
            Ok(count) => info!(
                node_id = %self.node.id,
                endpoint = %self.node.endpoint,
                registry_size = count,
                "Registered with registry"
            ),
            Err(e) => {
                tracker.record_failure();
                error!(
                    node_id = %self.node.id,
                    registry = %self.client.base_url(),
                    "Failed to register with registry, serving anyway: {}", e
                );
            }
        }

        if self.heartbeat.is_zero() {
            return;
        }

        let mut ticker = interval(self.heartbeat);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match self.register_once().await {
                Ok(count) => {
                    if tracker.failure_count() > 0 {
                        info!(
                            node_id = %self.node.id,
                            "Re-registered after {} failed attempts",
                            tracker.failure_count()
                        );
                    }
                    tracker.record_success();
                    debug!(node_id = %self.node.id, registry_size = count, "Heartbeat");
                }
                Err(e) => {
                    if tracker.record_failure() {
                        warn!(node_id = %self.node.id, "Heartbeat failed: {}", e);
                    }
                }
            }
        }
    }
}

/// Suppresses log spam from a repeatedly failing background operation.
#[derive(Debug, Default)]
pub struct FailureTracker {
    consecutive_failures: u32,
    max_logged_failures: u32,
}

impl FailureTracker {
    pub fn new(max_logged_failures: u32) -> Self {
        Self {
            consecutive_failures: 0,
            max_logged_failures,
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Record a failure. Returns `true` if it should be logged.
    pub fn record_failure(&mut self) -> bool {
        self.consecutive_failures += 1;

        if self.consecutive_failures == self.max_logged_failures + 1 {
            warn!(
                "Suppressing further failure logs after {} consecutive failures",
                self.max_logged_failures
            );
        }
        self.consecutive_failures <= self.max_logged_failures
    }

    pub fn failure_count(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_generate_node_id() {
        let id = generate_node_id();
        assert!(id.starts_with("worker-"));
        assert_eq!(id.len(), "worker-".len() + 6);
        assert!(id["worker-".len()..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(generate_node_id(), generate_node_id());
    }

    #[test]
    fn test_failure_tracker_suppression() {
        let mut tracker = FailureTracker::new(2);

        assert!(tracker.record_failure());
        assert!(tracker.record_failure());
        assert!(!tracker.record_failure());
        assert!(!tracker.record_failure());

        tracker.record_success();
        assert_eq!(tracker.failure_count(), 0);
        assert!(tracker.record_failure());
    }

    #[tokio::test]
    async fn test_run_registers_and_heartbeats() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register-node"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "Node registered", "count": 1})),
            )
            .mount(&server)
            .await;

        let registrar = Registrar::new(
            RegistryClient::new(server.uri()),
            NodeRecord::new("worker-abc123", "http://127.0.0.1:9"),
            Duration::from_millis(30),
        );
        let handle = tokio::spawn(registrar.run());
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.abort();

        let requests = server.received_requests().await.unwrap();
        assert!(requests.len() >= 2, "expected heartbeats, got {}", requests.len());
        let body: NodeRecord = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body.id, "worker-abc123");
    }

    #[tokio::test]
    async fn test_run_survives_unreachable_registry() {
        let registrar = Registrar::new(
            RegistryClient::new("http://127.0.0.1:1"),
            NodeRecord::new("worker-abc123", "http://127.0.0.1:9"),
            Duration::ZERO,
        );

        tokio::time::timeout(Duration::from_secs(5), registrar.run())
            .await
            .unwrap();
    }
}
