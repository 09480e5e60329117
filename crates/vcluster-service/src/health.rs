//! Liveness body returned by the registry and broker `/health` routes.

use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
}

impl HealthResponse {
    /// Healthy response for `service`, stamped with the caller's crate version.
    pub fn ok(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
