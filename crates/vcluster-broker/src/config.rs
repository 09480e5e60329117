//! Broker configuration.

use std::path::PathBuf;
use std::time::Duration;

use vcluster_service::{env_flag, env_list, env_or, env_string};

/// Settings the dispatch pipeline needs.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Directory receiving `<job_id>_output.mp4` artifacts
    pub output_dir: PathBuf,
    /// Upper bound on frames in flight per wave
    pub max_batch: usize,
    /// Timeout of each `/health` probe
    pub health_timeout: Duration,
    /// Timeout of each `/process-frame` call
    pub frame_timeout: Duration,
    /// Deadline for a whole job. `None` disables it.
    pub job_timeout: Option<Duration>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("videos_output"),
            max_batch: 10,
            health_timeout: Duration::from_millis(2000),
            frame_timeout: Duration::from_secs(60),
            job_timeout: Some(Duration::from_secs(3600)),
        }
    }
}

/// Broker server configuration.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Registry base URL
    pub registry_url: String,
    /// Pipeline settings
    pub dispatcher: DispatcherConfig,
    /// Max upload size
    pub max_body_size: usize,
    /// Expose `/metrics`
    pub metrics_enabled: bool,
    /// CORS origins
    pub cors_origins: Vec<String>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
            registry_url: "http://127.0.0.1:8000".to_string(),
            dispatcher: DispatcherConfig::default(),
            max_body_size: 512 * 1024 * 1024,
            metrics_enabled: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl BrokerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let registry_host = env_string("REGISTRY_HOST", "127.0.0.1");
        let registry_port: u16 = env_or("REGISTRY_PORT", 8000);

        let job_timeout_secs: u64 = env_or("BROKER_JOB_TIMEOUT_SECS", 3600);

        Self {
            host: env_string("BROKER_HOST", &defaults.host),
            port: env_or("BROKER_PORT", defaults.port),
            registry_url: format!("http://{}:{}", registry_host, registry_port),
            dispatcher: DispatcherConfig {
                output_dir: PathBuf::from(env_string("BROKER_OUTPUT_DIR", "videos_output")),
                max_batch: env_or("BROKER_MAX_BATCH", 10usize).max(1),
                health_timeout: Duration::from_millis(env_or("BROKER_HEALTH_TIMEOUT_MS", 2000)),
                frame_timeout: Duration::from_secs(env_or("BROKER_FRAME_TIMEOUT_SECS", 60)),
                job_timeout: (job_timeout_secs > 0).then(|| Duration::from_secs(job_timeout_secs)),
            },
            max_body_size: env_or("MAX_BODY_SIZE", defaults.max_body_size),
            metrics_enabled: env_flag("METRICS_ENABLED", true),
            cors_origins: env_list("CORS_ORIGINS", &["*"]),
        }
    }
}
