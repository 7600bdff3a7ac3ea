use clap::Args;

fn parse_positive_u64(s: &str) -> Result<u64, String> {
    let value: u64 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if value == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(value)
}

#[derive(Debug, Clone, Args)]
pub struct ServiceCliArgs {
    /// Lock TTL in seconds used when a process request does not carry `lockTimeoutSeconds`.
    /// A crashed processor blocks its category for at most this long.
    #[arg(
        env = "SCRIBE_ORCHESTRATOR_DEFAULT_LOCK_TTL_SECONDS",
        long,
        default_value = "180",
        value_parser = parse_positive_u64
    )]
    pub default_lock_ttl_seconds: u64,

    /// How many times a job that failed processing is put back on its queue.
    /// 0 drops failed jobs.
    #[arg(env = "SCRIBE_ORCHESTRATOR_MAX_JOB_RETRIES", long, default_value = "0")]
    pub max_job_retries: u32,

    /// Queue size above which a category is reported as backlogged.
    #[arg(env = "SCRIBE_ORCHESTRATOR_BACKLOG_THRESHOLD", long, default_value = "100")]
    pub backlog_threshold: u64,

    /// Age in seconds of the oldest queued job above which a category is reported as stalled.
    #[arg(
        env = "SCRIBE_ORCHESTRATOR_STALL_THRESHOLD_SECONDS",
        long,
        default_value = "3600",
        value_parser = parse_positive_u64
    )]
    pub stall_threshold_seconds: u64,

    /// Window in seconds over which processing counters are kept.
    #[arg(
        env = "SCRIBE_ORCHESTRATOR_METRICS_WINDOW_SECONDS",
        long,
        default_value = "3600",
        value_parser = parse_positive_u64
    )]
    pub metrics_window_seconds: u64,

    /// Maximum enqueue requests per identity within one rate limit window.
    #[arg(
        env = "SCRIBE_ORCHESTRATOR_ENQUEUE_RATE_LIMIT",
        long,
        default_value = "30",
        value_parser = parse_positive_u64
    )]
    pub enqueue_rate_limit: u64,

    /// Length in seconds of the enqueue rate limit window.
    #[arg(
        env = "SCRIBE_ORCHESTRATOR_ENQUEUE_RATE_WINDOW_SECONDS",
        long,
        default_value = "60",
        value_parser = parse_positive_u64
    )]
    pub enqueue_rate_window_seconds: u64,
}
