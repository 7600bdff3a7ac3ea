use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{KvStore, StoreError};

const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";
const NOT_AN_INTEGER: &str = "ERR value is not an integer or out of range";
const INVALID_EXPIRE: &str = "ERR invalid expire time in 'set' command";

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    List(VecDeque<String>),
    Hash(HashMap<String, String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self { value, expires_at: None }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Single-process store with Redis semantics.
///
/// Expiry runs on the tokio clock, so tests can move time forward with a paused runtime.
/// [`InMemoryStore::set_available`] switches the store into an outage where every command
/// fails with a connection error.
#[derive(Debug)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    available: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()), available: AtomicBool::new(true) }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Connection("in-memory store is unavailable".to_string()))
        }
    }

    /// Locks the map after dropping expired entries
    async fn live_entries(&self) -> Result<tokio::sync::MutexGuard<'_, HashMap<String, Entry>>, StoreError> {
        self.ensure_available()?;
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok(entries)
    }
}

fn wrong_type() -> StoreError {
    StoreError::Command(WRONG_TYPE.to_string())
}

/// `SET ... EX 0` is refused by the server instead of creating an expired key
fn positive_ttl(ttl_seconds: u64) -> Result<u64, StoreError> {
    if ttl_seconds == 0 {
        return Err(StoreError::Command(INVALID_EXPIRE.to_string()));
    }
    Ok(ttl_seconds)
}

fn parse_integer(raw: &str) -> Result<i64, StoreError> {
    raw.parse::<i64>().map_err(|_| StoreError::Command(NOT_AN_INTEGER.to_string()))
}

fn list_mut<'a>(
    entries: &'a mut HashMap<String, Entry>,
    key: &str,
) -> Result<Option<&'a mut VecDeque<String>>, StoreError> {
    match entries.get_mut(key) {
        None => Ok(None),
        Some(Entry { value: Value::List(list), .. }) => Ok(Some(list)),
        Some(_) => Err(wrong_type()),
    }
}

fn hash_ref<'a>(
    entries: &'a HashMap<String, Entry>,
    key: &str,
) -> Result<Option<&'a HashMap<String, String>>, StoreError> {
    match entries.get(key) {
        None => Ok(None),
        Some(Entry { value: Value::Hash(hash), .. }) => Ok(Some(hash)),
        Some(_) => Err(wrong_type()),
    }
}

fn hash_mut<'a>(
    entries: &'a mut HashMap<String, Entry>,
    key: &str,
) -> Result<&'a mut HashMap<String, String>, StoreError> {
    let entry = entries.entry(key.to_string()).or_insert_with(|| Entry::new(Value::Hash(HashMap::new())));
    match &mut entry.value {
        Value::Hash(hash) => Ok(hash),
        _ => Err(wrong_type()),
    }
}

#[async_trait]
impl KvStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.live_entries().await?;
        match entries.get(key) {
            None => Ok(None),
            Some(Entry { value: Value::Str(value), .. }) => Ok(Some(value.clone())),
            Some(_) => Err(wrong_type()),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<(), StoreError> {
        let ttl_seconds = ttl_seconds.map(positive_ttl).transpose()?;
        let mut entries = self.live_entries().await?;
        let expires_at = ttl_seconds.map(|ttl| Instant::now() + Duration::from_secs(ttl));
        entries.insert(key.to_string(), Entry { value: Value::Str(value.to_string()), expires_at });
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool, StoreError> {
        let ttl_seconds = positive_ttl(ttl_seconds)?;
        let mut entries = self.live_entries().await?;
        if entries.contains_key(key) {
            return Ok(false);
        }
        let expires_at = Some(Instant::now() + Duration::from_secs(ttl_seconds));
        entries.insert(key.to_string(), Entry { value: Value::Str(value.to_string()), expires_at });
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.live_entries().await?;
        Ok(entries.remove(key).is_some())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<u64, StoreError> {
        let mut entries = self.live_entries().await?;
        Ok(keys.iter().filter(|key| entries.remove(key.as_str()).is_some()).count() as u64)
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        let mut entries = self.live_entries().await?;
        let matches = matches!(entries.get(key), Some(Entry { value: Value::Str(current), .. }) if current == expected);
        if matches {
            entries.remove(key);
        }
        Ok(matches)
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let mut entries = self.live_entries().await?;
        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry::new(Value::List(VecDeque::new())));
        match &mut entry.value {
            Value::List(list) => {
                list.push_front(value.to_string());
                Ok(list.len() as u64)
            }
            _ => Err(wrong_type()),
        }
    }

    async fn rpop(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.live_entries().await?;
        let Some(list) = list_mut(&mut entries, key)? else {
            return Ok(None);
        };
        let value = list.pop_back();
        // Redis drops a list once its last element is gone
        if list.is_empty() {
            entries.remove(key);
        }
        Ok(value)
    }

    async fn llen(&self, key: &str) -> Result<u64, StoreError> {
        let mut entries = self.live_entries().await?;
        Ok(list_mut(&mut entries, key)?.map(|list| list.len() as u64).unwrap_or(0))
    }

    async fn lindex(&self, key: &str, index: i64) -> Result<Option<String>, StoreError> {
        let mut entries = self.live_entries().await?;
        let Some(list) = list_mut(&mut entries, key)? else {
            return Ok(None);
        };
        let len = list.len() as i64;
        let position = if index < 0 { len + index } else { index };
        if position < 0 || position >= len {
            return Ok(None);
        }
        Ok(list.get(position as usize).cloned())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut entries = self.live_entries().await?;
        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry::new(Value::Str("0".to_string())));
        match &mut entry.value {
            Value::Str(raw) => {
                let next = parse_integer(raw)? + 1;
                *raw = next.to_string();
                Ok(next)
            }
            _ => Err(wrong_type()),
        }
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<bool, StoreError> {
        let mut entries = self.live_entries().await?;
        match entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(Instant::now() + Duration::from_secs(ttl_seconds));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let entries = self.live_entries().await?;
        let now = Instant::now();
        // Redis rounds the remaining time to the nearest second
        Ok(entries
            .get(key)
            .and_then(|entry| entry.expires_at)
            .map(|at| (at.saturating_duration_since(now).as_millis() as u64 + 500) / 1000))
    }

    async fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64, StoreError> {
        let mut entries = self.live_entries().await?;
        let hash = hash_mut(&mut entries, key)?;
        let current = match hash.get(field) {
            Some(raw) => parse_integer(raw)?,
            None => 0,
        };
        let next = current + delta;
        hash.insert(field.to_string(), next.to_string());
        Ok(next)
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let entries = self.live_entries().await?;
        Ok(hash_ref(&entries, key)?.and_then(|hash| hash.get(field).cloned()))
    }

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let entries = self.live_entries().await?;
        Ok(hash_ref(&entries, key)?.cloned().unwrap_or_default())
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.live_entries().await?;
        hash_mut(&mut entries, key)?.insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.live_entries().await?;
        let mut keys: Vec<String> = entries.keys().filter(|key| key.starts_with(prefix)).cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.ensure_available()
    }
}
