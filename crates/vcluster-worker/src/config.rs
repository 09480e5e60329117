//! Worker configuration.

use std::time::Duration;

use vcluster_models::FrameTransform;
use vcluster_service::{env_list, env_or, env_string};

use crate::error::{WorkerError, WorkerResult};
use crate::network::detect_local_ip;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Bind host
    pub bind_host: String,
    /// Bind port, also advertised to the registry
    pub port: u16,
    /// Host advertised to the registry
    pub advertised_host: String,
    /// Registry base URL
    pub registry_url: String,
    /// Transform applied to every frame
    pub transform: FrameTransform,
    /// Re-registration interval. Zero registers once.
    pub heartbeat_interval: Duration,
    /// Max request body size
    pub max_body_size: usize,
    /// CORS origins
    pub cors_origins: Vec<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 8002,
            advertised_host: "127.0.0.1".to_string(),
            registry_url: "http://127.0.0.1:8000".to_string(),
            transform: FrameTransform::Identity,
            heartbeat_interval: Duration::from_secs(30),
            max_body_size: 64 * 1024 * 1024,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    ///
    /// Fails only on an unknown `WORKER_TRANSFORM`.
    pub fn from_env() -> WorkerResult<Self> {
        let defaults = Self::default();

        let transform = match std::env::var("WORKER_TRANSFORM") {
            Ok(name) => name
                .parse::<FrameTransform>()
                .map_err(|e| WorkerError::config(e.to_string()))?,
            Err(_) => defaults.transform,
        };

        let advertised_host = std::env::var("WORKER_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| detect_local_ip().to_string());

        let registry_host = env_string("REGISTRY_HOST", "127.0.0.1");
        let registry_port: u16 = env_or("REGISTRY_PORT", 8000);

        Ok(Self {
            bind_host: env_string("WORKER_BIND_HOST", &defaults.bind_host),
            port: env_or("WORKER_PORT", defaults.port),
            advertised_host,
            registry_url: format!("http://{}:{}", registry_host, registry_port),
            transform,
            heartbeat_interval: Duration::from_secs(env_or("WORKER_HEARTBEAT_SECS", 30)),
            max_body_size: env_or("MAX_BODY_SIZE", defaults.max_body_size),
            cors_origins: env_list("CORS_ORIGINS", &["*"]),
        })
    }

    /// Endpoint advertised to the registry.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.advertised_host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let config = WorkerConfig {
            advertised_host: "10.1.2.3".to_string(),
            port: 9001,
            ..Default::default()
        };
        assert_eq!(config.endpoint(), "http://10.1.2.3:9001");
    }
}
