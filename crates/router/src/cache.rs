//! Content-addressed response cache.
//!
//! Maps `(prompt, system prompt, provider)` to a previously generated
//! cloud response. The key normalizes whitespace and case so requests
//! differing only cosmetically share an entry. Entries are immutable
//! once written: a store on an existing key is a no-op, and expiry is
//! an external TTL policy applied by the persistence collaborator.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key-value collaborator the cache persists through.
///
/// Implementations may be in-process maps or remote tables; the cache
/// only relies on `get`/`put` semantics. TTL-based expiry, when
/// wanted, is the collaborator's job.
pub trait Store: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value.
    fn put(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// In-memory store backed by a `BTreeMap`.
///
/// Useful for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Store for InMemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries
            .write()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// A cached generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The generated text.
    pub response_text: String,
    /// Token count recorded when the response was produced.
    pub tokens_used: usize,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

/// Response cache over a [`Store`] collaborator.
#[derive(Debug)]
pub struct ResponseCache<S> {
    store: S,
}

impl<S: Store> ResponseCache<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Look up a previous response for the same normalized inputs.
    pub fn lookup(&self, prompt: &str, system: Option<&str>, provider: &str) -> Option<CacheEntry> {
        let key = cache_key(prompt, system, provider);
        let raw = self.store.get(&key)?;
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(key, "discarding undecodable cache entry: {e}");
                None
            }
        }
    }

    /// Store a response. First write wins: an existing entry is left
    /// untouched so a stored response is immutable.
    pub fn store(
        &self,
        prompt: &str,
        system: Option<&str>,
        provider: &str,
        response_text: &str,
        tokens_used: usize,
    ) -> anyhow::Result<()> {
        let key = cache_key(prompt, system, provider);
        if self.store.get(&key).is_some() {
            tracing::debug!(key, "cache entry exists, keeping first write");
            return Ok(());
        }
        let entry = CacheEntry {
            response_text: response_text.to_owned(),
            tokens_used,
            created_at: Utc::now(),
        };
        self.store.put(&key, &serde_json::to_string(&entry)?)
    }
}

/// Compute the stable cache key for a prompt/system/provider triple.
///
/// Normalization (trim + lowercase) runs before hashing so lookups and
/// stores always agree, whatever whitespace the caller carried.
pub fn cache_key(prompt: &str, system: Option<&str>, provider: &str) -> String {
    let prompt = prompt.trim().to_lowercase();
    let system = system.unwrap_or("").trim().to_lowercase();
    let combined = format!("{system}|{prompt}|{provider}");
    format!("cache:{}", djb2(&combined))
}

// djb2: tiny, stable across processes, and collision-tolerant enough
// for a response cache where a miss only costs one backend call.
fn djb2(text: &str) -> u64 {
    let mut hash: u64 = 5381;
    for byte in text.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as u64);
    }
    hash
}
