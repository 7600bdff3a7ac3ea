use clap::Args;

/// Parameters used to connect to the key-value store.
#[derive(Debug, Clone, Args)]
#[group()]
pub struct StoreCliArgs {
    /// Redis connection URL, e.g. `redis://127.0.0.1:6379`.
    #[arg(env = "SCRIBE_ORCHESTRATOR_REDIS_URL", long, default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Maximum number of pooled connections.
    #[arg(env = "SCRIBE_ORCHESTRATOR_REDIS_POOL_SIZE", long, default_value = "16")]
    pub redis_pool_size: usize,

    /// Timeout in milliseconds for acquiring and creating pooled connections.
    #[arg(env = "SCRIBE_ORCHESTRATOR_REDIS_TIMEOUT_MS", long, default_value = "2000")]
    pub redis_timeout_ms: u64,
}
