use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tessera_application::PermissionCache;
use tessera_core::AppResult;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

/// Longest lifetime a cached decision can have. Longer ttls are clamped.
pub const MAX_DECISION_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy)]
struct CachedDecision {
    allowed: bool,
    deadline: Instant,
}

impl CachedDecision {
    fn new(allowed: bool, ttl: Duration, now: Instant) -> Self {
        let ttl = ttl.min(MAX_DECISION_TTL);
        let deadline = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(Duration::from_secs(24 * 60 * 60)))
            .unwrap_or(now);
        Self { allowed, deadline }
    }

    fn live_at(&self, now: Instant) -> bool {
        now < self.deadline
    }
}

/// Process-local permission decision cache.
///
/// Expired decisions are dropped lazily on lookup, by `purge_expired`, or by
/// the optional background sweeper.
#[derive(Debug, Default)]
pub struct InMemoryPermissionCache {
    decisions: RwLock<HashMap<String, CachedDecision>>,
}

impl InMemoryPermissionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored decisions, expired ones included.
    pub async fn len(&self) -> usize {
        self.decisions.read().await.len()
    }

    /// Returns whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.decisions.read().await.is_empty()
    }

    /// Spawns a task that purges expired decisions every `interval`.
    ///
    /// The task runs until the returned handle is aborted.
    #[must_use]
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(10)));
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = cache.sweep(Instant::now()).await;
                if removed > 0 {
                    debug!(removed, "swept expired permission decisions");
                }
            }
        })
    }

    async fn sweep(&self, now: Instant) -> usize {
        let mut decisions = self.decisions.write().await;
        let before = decisions.len();
        decisions.retain(|_, decision| decision.live_at(now));
        before - decisions.len()
    }
}

#[async_trait]
impl PermissionCache for InMemoryPermissionCache {
    async fn get(&self, key: &str) -> AppResult<Option<bool>> {
        let now = Instant::now();
        let cached = self.decisions.read().await.get(key).copied();

        match cached {
            None => Ok(None),
            Some(decision) if decision.live_at(now) => Ok(Some(decision.allowed)),
            Some(_) => {
                let mut decisions = self.decisions.write().await;
                // A concurrent set may have refreshed the key since the read.
                if decisions.get(key).is_some_and(|decision| !decision.live_at(now)) {
                    decisions.remove(key);
                }
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, allowed: bool, ttl: Duration) -> AppResult<()> {
        if ttl.is_zero() {
            return Ok(());
        }

        let decision = CachedDecision::new(allowed, ttl, Instant::now());
        self.decisions.write().await.insert(key.to_owned(), decision);
        Ok(())
    }

    async fn purge_expired(&self) -> AppResult<usize> {
        Ok(self.sweep(Instant::now()).await)
    }
}
