use std::fmt;

const FILE_TTL_SECONDS: u64 = 3600;
const DOCUMENT_TTL_SECONDS: u64 = 24 * 3600;
const USER_FILES_TTL_SECONDS: u64 = 300;

/// Cache keys of the domain entities, each with its own TTL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    File(String),
    Transcript(String),
    Translation(String),
    Summary(String),
    /// One page of an owner's file listing
    UserFiles { owner: String, limit: u32 },
    /// Every cached listing page of an owner; only meaningful for invalidation
    UserFilesAll(String),
}

impl CacheKey {
    pub fn key(&self) -> String {
        match self {
            CacheKey::File(id) => format!("file:{}", id),
            CacheKey::Transcript(id) => format!("transcript:{}", id),
            CacheKey::Translation(id) => format!("translation:{}", id),
            CacheKey::Summary(id) => format!("summary:{}", id),
            CacheKey::UserFiles { owner, limit } => format!("user-files:{}:{}", owner, limit),
            CacheKey::UserFilesAll(owner) => format!("user-files:{}:*", owner),
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        match self {
            CacheKey::File(_) => FILE_TTL_SECONDS,
            CacheKey::Transcript(_) | CacheKey::Translation(_) | CacheKey::Summary(_) => DOCUMENT_TTL_SECONDS,
            CacheKey::UserFiles { .. } | CacheKey::UserFilesAll(_) => USER_FILES_TTL_SECONDS,
        }
    }

    /// Whether the key names a group of entries rather than a single one
    pub fn is_pattern(&self) -> bool {
        matches!(self, CacheKey::UserFilesAll(_))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
