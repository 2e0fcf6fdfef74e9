//! TTL cache for the last-fetched chain-info snapshot.
//!
//! `getblockchaininfo` is cheap but callers tend to poll it; the cache keeps
//! the most recent snapshot and serves it until the TTL elapses. Expiry is
//! checked on read, so there is no background purge task to manage.

use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::types::ChainInfo;

/// Single-slot cache holding the last `getblockchaininfo` result.
///
/// A TTL of zero disables caching entirely: `get` always misses and `store`
/// is a no-op.
pub struct ChainInfoCache {
    ttl: Duration,
    slot: RwLock<Option<Snapshot>>,
}

struct Snapshot {
    fetched_at: Instant,
    info: ChainInfo,
}

impl ChainInfoCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Return the cached snapshot if it is younger than the TTL.
    pub async fn get(&self) -> Option<ChainInfo> {
        if self.ttl.is_zero() {
            return None;
        }
        let slot = self.slot.read().await;
        match slot.as_ref() {
            Some(snapshot) if snapshot.fetched_at.elapsed() < self.ttl => {
                Some(snapshot.info.clone())
            }
            _ => None,
        }
    }

    /// Replace the cached snapshot, resetting its age.
    pub async fn store(&self, info: ChainInfo) {
        if self.ttl.is_zero() {
            return;
        }
        let mut slot = self.slot.write().await;
        *slot = Some(Snapshot {
            fetched_at: Instant::now(),
            info,
        });
    }

    /// Drop the cached snapshot so the next read goes to the node.
    pub async fn clear(&self) {
        *self.slot.write().await = None;
    }
}
