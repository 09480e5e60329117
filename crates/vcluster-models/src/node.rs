//! Worker node records and registry wire bodies.

use serde::{Deserialize, Serialize};

/// A worker endpoint known to the registry.
///
/// Identity is `id`; `endpoint` is the worker's base URL
/// (`http://host:port`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node identifier, unique within the registry
    pub id: String,
    /// Base URL of the worker
    #[serde(alias = "url")]
    pub endpoint: String,
}

impl NodeRecord {
    /// Create a new node record.
    pub fn new(id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Build a URL for a path on this node.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Response body of `POST /register-node`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    /// Registry size after the upsert
    pub count: usize,
}

/// Response body of `GET /nodes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodesResponse {
    pub nodes: Vec<NodeRecord>,
}

/// Response body of a worker's `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerHealth {
    pub status: String,
}

impl WorkerHealth {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
