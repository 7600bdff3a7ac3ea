/// Prefix of every distributed lock key
pub const LOCK_KEY_PREFIX: &str = "lock:";

/// Prefix of every rate limit counter key
pub const RATE_LIMIT_KEY_PREFIX: &str = "ratelimit:";

/// Prefix of the per-endpoint API statistics hashes
pub const API_STATS_KEY_PREFIX: &str = "api:stats:";

/// API statistics are dropped after 7 days without traffic
pub const API_STATS_TTL_SECONDS: u64 = 7 * 24 * 3600;

/// Lock TTL used by the dispatcher when the caller does not supply one
pub const DEFAULT_LOCK_TTL_SECONDS: u64 = 180;

/// Queue size above which a category is reported as backlogged
pub const DEFAULT_BACKLOG_THRESHOLD: u64 = 100;

/// Age of the oldest queued job above which a category is reported as stalled
pub const DEFAULT_STALL_THRESHOLD_SECONDS: u64 = 3600;

/// Window over which processing counters are kept
pub const DEFAULT_METRICS_WINDOW_SECONDS: u64 = 3600;

/// Header carrying the monitoring API key for admin-gated endpoints
pub const ADMIN_API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the caller identity used for rate limiting
pub const USER_ID_HEADER: &str = "x-user-id";

/// Identity used for rate limiting when the caller did not identify itself
pub const ANONYMOUS_IDENTITY: &str = "anonymous";

/// Rate limit resource name of the enqueue endpoint
pub const ENQUEUE_RESOURCE: &str = "enqueue";

/// Version of the Orchestrator
pub const ORCHESTRATOR_VERSION: &str = env!("CARGO_PKG_VERSION");
