use crate::cli::server::ServerCliArgs;
use crate::cli::service::ServiceCliArgs;
use crate::types::constant::{
    DEFAULT_BACKLOG_THRESHOLD, DEFAULT_LOCK_TTL_SECONDS, DEFAULT_METRICS_WINDOW_SECONDS,
    DEFAULT_STALL_THRESHOLD_SECONDS,
};

#[derive(Debug, Clone)]
pub struct ServiceParams {
    pub default_lock_ttl_seconds: u64,
    /// Re-queue attempts for a failed job; 0 drops failed jobs
    pub max_job_retries: u32,
    pub backlog_threshold: u64,
    pub stall_threshold_seconds: u64,
    pub metrics_window_seconds: u64,
    pub enqueue_rate_limit: u64,
    pub enqueue_rate_window_seconds: u64,
}

impl Default for ServiceParams {
    fn default() -> Self {
        Self {
            default_lock_ttl_seconds: DEFAULT_LOCK_TTL_SECONDS,
            max_job_retries: 0,
            backlog_threshold: DEFAULT_BACKLOG_THRESHOLD,
            stall_threshold_seconds: DEFAULT_STALL_THRESHOLD_SECONDS,
            metrics_window_seconds: DEFAULT_METRICS_WINDOW_SECONDS,
            enqueue_rate_limit: 30,
            enqueue_rate_window_seconds: 60,
        }
    }
}

impl From<ServiceCliArgs> for ServiceParams {
    fn from(args: ServiceCliArgs) -> Self {
        Self {
            default_lock_ttl_seconds: args.default_lock_ttl_seconds,
            max_job_retries: args.max_job_retries,
            backlog_threshold: args.backlog_threshold,
            stall_threshold_seconds: args.stall_threshold_seconds,
            metrics_window_seconds: args.metrics_window_seconds,
            enqueue_rate_limit: args.enqueue_rate_limit,
            enqueue_rate_window_seconds: args.enqueue_rate_window_seconds,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerParams {
    pub host: String,
    pub port: u16,
    pub monitoring_api_key: Option<String>,
    pub webhook_secret: Option<String>,
}

impl Default for ServerParams {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 3000, monitoring_api_key: None, webhook_secret: None }
    }
}

impl From<ServerCliArgs> for ServerParams {
    fn from(value: ServerCliArgs) -> Self {
        // An empty value from the environment means "not configured".
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            host: value.host,
            port: value.port,
            monitoring_api_key: non_empty(value.monitoring_api_key),
            webhook_secret: non_empty(value.webhook_secret),
        }
    }
}
