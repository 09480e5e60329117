//! Registry configuration.

use std::time::Duration;

use vcluster_service::{env_list, env_or, env_string};

/// Registry server configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Nodes not seen for this long are evicted. Zero disables eviction.
    pub node_ttl: Duration,
    /// Interval between eviction sweeps
    pub sweep_interval: Duration,
    /// CORS origins
    pub cors_origins: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            node_ttl: Duration::ZERO,
            sweep_interval: Duration::from_secs(30),
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl RegistryConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_string("REGISTRY_BIND_HOST", &defaults.host),
            port: env_or("REGISTRY_PORT", defaults.port),
            node_ttl: Duration::from_secs(env_or("REGISTRY_NODE_TTL_SECS", 0)),
            sweep_interval: Duration::from_secs(env_or("REGISTRY_SWEEP_SECS", 30).max(1)),
            cors_origins: env_list("CORS_ORIGINS", &["*"]),
        }
    }

    /// Whether stale nodes are evicted.
    pub fn eviction_enabled(&self) -> bool {
        !self.node_ttl.is_zero()
    }
}
