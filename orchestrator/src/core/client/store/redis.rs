use std::collections::HashMap;

use async_trait::async_trait;
use deadpool_redis::{Pool, PoolConfig, Runtime};
use redis::{AsyncCommands, Script};
use tracing::{debug, info};

use super::{KvStore, StoreError};
use crate::types::params::StoreParams;

/// Deletes KEYS[1] only when it holds ARGV[1]
const COMPARE_AND_DELETE: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

const SCAN_BATCH_SIZE: u64 = 200;

/// Redis backed store over a `deadpool-redis` connection pool.
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Builds the pool. No connection is opened until the first command.
    pub fn new(params: &StoreParams) -> Result<Self, StoreError> {
        let mut config = deadpool_redis::Config::from_url(&params.redis_url);
        let mut pool_config = PoolConfig::new(params.pool_size);
        pool_config.timeouts.wait = Some(params.timeout);
        pool_config.timeouts.create = Some(params.timeout);
        pool_config.timeouts.recycle = Some(params.timeout);
        config.pool = Some(pool_config);

        let pool = config.create_pool(Some(Runtime::Tokio1))?;
        info!(pool_size = params.pool_size, "Redis connection pool created");
        Ok(Self { pool })
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, StoreError> {
        Ok(self.pool.get().await?)
    }
}

/// Escapes glob metacharacters so the prefix is matched literally by `SCAN MATCH`.
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len() + 4);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        match ttl_seconds {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        // SET ... NX replies OK on success and nil when the key already exists
        let reply: Option<String> =
            redis::cmd("SET").arg(key).arg(value).arg("NX").arg("EX").arg(ttl_seconds).query_async(&mut conn).await?;
        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        let removed: u64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn delete_many(&self, keys: &[String]) -> Result<u64, StoreError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection().await?;
        Ok(conn.del(keys).await?)
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        let removed: i64 = Script::new(COMPARE_AND_DELETE).key(key).arg(expected).invoke_async(&mut conn).await?;
        Ok(removed == 1)
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let mut conn = self.connection().await?;
        Ok(conn.lpush(key, value).await?)
    }

    async fn rpop(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = redis::cmd("RPOP").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn llen(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.connection().await?;
        Ok(conn.llen(key).await?)
    }

    async fn lindex(&self, key: &str, index: i64) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = redis::cmd("LINDEX").arg(key).arg(index).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut conn = self.connection().await?;
        Ok(conn.incr(key, 1).await?)
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;
        let applied: i64 = redis::cmd("EXPIRE").arg(key).arg(ttl_seconds).query_async(&mut conn).await?;
        Ok(applied == 1)
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let mut conn = self.connection().await?;
        // -2: missing key, -1: no expiry
        let ttl: i64 = redis::cmd("TTL").arg(key).query_async(&mut conn).await?;
        Ok(u64::try_from(ttl).ok())
    }

    async fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64, StoreError> {
        let mut conn = self.connection().await?;
        Ok(conn.hincr(key, field, delta).await?)
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        Ok(conn.hget(key, field).await?)
    }

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let mut conn = self.connection().await?;
        Ok(conn.hgetall(key).await?)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        conn.hset::<_, _, _, ()>(key, field, value).await?;
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.connection().await?;
        let pattern = format!("{}*", escape_glob(prefix));
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH_SIZE)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        // SCAN may return a key more than once
        keys.sort();
        keys.dedup();
        debug!(prefix = %prefix, count = keys.len(), "Scanned keys by prefix");
        Ok(keys)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
