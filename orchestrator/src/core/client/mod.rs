// Client abstractions module - the store and everything built on top of it, plus the
// external collaborators

pub mod cache;
pub mod catalog;
pub mod lock;
pub mod processor;
pub mod queue;
pub mod rate_limit;
pub mod store;

// Re-export commonly used types
pub use cache::{Cache, CacheKey};
pub use catalog::{EntityCatalog, RestCatalog};
pub use lock::{DistributedLock, LockResult, LockToken};
pub use processor::{HttpProcessor, JobProcessor};
pub use queue::JobQueue;
pub use rate_limit::{RateDecision, RateLimiter};
pub use store::{memory::InMemoryStore, redis::RedisStore, KvStore};
