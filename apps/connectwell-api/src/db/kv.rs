use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::ApiError;

/// Abstraction over a key-value store used for session tokens.
///
/// Backed by an in-memory map; a shared cache can be slotted in behind the
/// same trait when the API runs on more than one node.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), ApiError>;
    async fn get(&self, key: &str) -> Result<Option<String>, ApiError>;
    async fn del(&self, key: &str) -> Result<(), ApiError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// DashMap-backed store. Expired entries are dropped when read and swept on
/// every write.
#[derive(Default)]
pub struct MemoryKv {
    data: DashMap<String, (String, Instant)>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), ApiError> {
        let now = Instant::now();
        self.data.retain(|_, (_, expires_at)| *expires_at > now);
        let expires_at = now + Duration::from_secs(ttl_secs);
        self.data.insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        let now = Instant::now();
        if self
            .data
            .remove_if(key, |_, (_, expires_at)| *expires_at <= now)
            .is_some()
        {
            return Ok(None);
        }
        Ok(self.data.get(key).map(|entry| entry.value().0.clone()))
    }

    async fn del(&self, key: &str) -> Result<(), ApiError> {
        self.data.remove(key);
        Ok(())
    }
}
