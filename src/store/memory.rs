//! In-process token store with per-entry expiry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::store::{StoreError, TokenStore};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| now < deadline)
    }
}

/// `DashMap`-backed store. Expired entries are dropped on read and by
/// [`MemoryTokenStore::run_sweeper`].
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: DashMap<String, Entry>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before - self.entries.len()
    }

    /// Purge expired entries every `period` until `shutdown` fires.
    pub async fn run_sweeper(self: Arc<Self>, period: Duration, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = period.as_secs(), "Token store sweeper starting");

        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.purge_expired();
                    if removed > 0 {
                        tracing::debug!(removed, remaining = self.len(), "Purged expired tokens");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Token store sweeper stopping");
                    break;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }
        // Shard guard is released; drop the stale entry.
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        Ok(None)
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryTokenStore::new();
        store.put("k", "v", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.put("k", "v2", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let store = MemoryTokenStore::new();
        store.put("short", "v", Some(Duration::from_secs(600))).await.unwrap();
        store.put("forever", "v", None).await.unwrap();

        tokio::time::advance(Duration::from_secs(599)).await;
        assert!(store.get("short").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.get("short").await.unwrap(), None);
        assert!(store.get("forever").await.unwrap().is_some());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let store = MemoryTokenStore::new();
        store.put("a", "1", Some(Duration::from_secs(1))).await.unwrap();
        store.put("b", "2", Some(Duration::from_secs(10))).await.unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_reclaims_abandoned_entries() {
        let store = Arc::new(MemoryTokenStore::new());
        let (tx, rx) = broadcast::channel(1);
        let sweeper = tokio::spawn(store.clone().run_sweeper(Duration::from_secs(60), rx));

        for i in 0..1000 {
            let key = format!("oauth:{}:request_token", i);
            store.put(&key, "t", Some(Duration::from_secs(600))).await.unwrap();
        }
        store.put("user:alice:access_token", "a", None).await.unwrap();

        time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(store.len(), 1);

        tx.send(()).unwrap();
        sweeper.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_keeps_live_entries() {
        let store = Arc::new(MemoryTokenStore::new());
        let (tx, rx) = broadcast::channel(1);
        let sweeper = tokio::spawn(store.clone().run_sweeper(Duration::from_secs(60), rx));

        store.put("pending", "t", Some(Duration::from_secs(600))).await.unwrap();
        time::sleep(Duration::from_secs(300)).await;
        assert_eq!(store.get("pending").await.unwrap().as_deref(), Some("t"));

        tx.send(()).unwrap();
        sweeper.await.unwrap();
    }
}
