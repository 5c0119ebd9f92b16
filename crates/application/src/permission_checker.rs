use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use tessera_core::{AppError, AppResult};

use crate::{AuthzCheckRequest, AuthzTransport, PermissionCache};

/// Default lifetime of cached decisions.
pub const DEFAULT_DECISION_TTL: Duration = Duration::from_secs(60);

/// Cache-fronted client for remote permission checks.
///
/// Only answers actually returned by the remote service are cached; transport
/// failures propagate and leave the cache untouched.
#[derive(Clone)]
pub struct PermissionChecker {
    cache: Arc<dyn PermissionCache>,
    transport: Arc<dyn AuthzTransport>,
    ttl: Duration,
}

impl PermissionChecker {
    /// Creates a checker with the default decision ttl.
    #[must_use]
    pub fn new(cache: Arc<dyn PermissionCache>, transport: Arc<dyn AuthzTransport>) -> Self {
        Self::with_ttl(cache, transport, DEFAULT_DECISION_TTL)
    }

    /// Creates a checker with an explicit decision ttl.
    #[must_use]
    pub fn with_ttl(
        cache: Arc<dyn PermissionCache>,
        transport: Arc<dyn AuthzTransport>,
        ttl: Duration,
    ) -> Self {
        Self {
            cache,
            transport,
            ttl,
        }
    }

    /// Returns whether `principal` may perform `permission` on `resource`.
    ///
    /// `principal` and `resource` must not contain `:`; such checks fail with
    /// `InvalidPermission` before the cache or the remote service is touched.
    pub async fn check(&self, principal: &str, permission: &str, resource: &str) -> AppResult<bool> {
        if principal.contains(KEY_SEPARATOR) || resource.contains(KEY_SEPARATOR) {
            return Err(AppError::InvalidPermission(format!(
                "principal and resource must not contain '{KEY_SEPARATOR}'"
            )));
        }

        let key = cache_key(principal, permission, resource);

        if let Some(allowed) = self.cache.get(&key).await? {
            debug!(key = %key, allowed, "permission cache hit");
            return Ok(allowed);
        }
        debug!(key = %key, "permission cache miss");

        let request = AuthzCheckRequest::new(principal, permission, resource);
        let allowed = self.transport.check(&request).await?;
        self.cache.set(&key, allowed, self.ttl).await?;

        Ok(allowed)
    }
}

const KEY_SEPARATOR: char = ':';

/// Builds the `principal:permission:resource` cache key.
///
/// Permissions may contain `:` themselves. The key stays unambiguous only
/// while `principal` and `resource` do not, which [`PermissionChecker::check`]
/// enforces.
#[must_use]
pub fn cache_key(principal: &str, permission: &str, resource: &str) -> String {
    format!("{principal}{KEY_SEPARATOR}{permission}{KEY_SEPARATOR}{resource}")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, bool>>,
    }

    #[async_trait]
    impl PermissionCache for MapCache {
        async fn get(&self, key: &str) -> AppResult<Option<bool>> {
            Ok(self.entries.lock().await.get(key).copied())
        }

        async fn set(&self, key: &str, allowed: bool, _ttl: Duration) -> AppResult<()> {
            self.entries.lock().await.insert(key.to_owned(), allowed);
            Ok(())
        }

        async fn purge_expired(&self) -> AppResult<usize> {
            Ok(0)
        }
    }

    struct ScriptedTransport {
        answer: AppResult<bool>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(answer: AppResult<bool>) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AuthzTransport for ScriptedTransport {
        async fn check(&self, _request: &AuthzCheckRequest) -> AppResult<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    #[test]
    fn key_joins_all_parts() {
        assert_eq!(cache_key("alice", "read", "content"), "alice:read:content");
        assert_eq!(cache_key("alice", "users:read", ""), "alice:users:read:");
    }

    #[tokio::test]
    async fn remote_answers_are_cached() -> AppResult<()> {
        let cache = Arc::new(MapCache::default());
        let transport = Arc::new(ScriptedTransport::new(Ok(false)));
        let checker = PermissionChecker::new(cache.clone(), transport.clone());

        assert!(!checker.check("alice", "write", "content").await?);
        assert!(!checker.check("alice", "write", "content").await?);

        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            cache.get("alice:write:content").await?,
            Some(false)
        );
        Ok(())
    }

    #[tokio::test]
    async fn cached_decision_skips_transport() -> AppResult<()> {
        let cache = Arc::new(MapCache::default());
        cache
            .set("bob:read:content", true, Duration::from_secs(60))
            .await?;
        let transport = Arc::new(ScriptedTransport::new(Ok(false)));
        let checker = PermissionChecker::new(cache, transport.clone());

        assert!(checker.check("bob", "read", "content").await?);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test]
    async fn transport_errors_are_not_cached() -> AppResult<()> {
        let cache = Arc::new(MapCache::default());
        let transport = Arc::new(ScriptedTransport::new(Err(AppError::Transport(
            "status 503".to_owned(),
        ))));
        let checker = PermissionChecker::new(cache.clone(), transport.clone());

        for _ in 0..2 {
            assert!(matches!(
                checker.check("carol", "read", "content").await,
                Err(AppError::Transport(_))
            ));
        }
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get("carol:read:content").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn separator_in_principal_or_resource_is_rejected() -> AppResult<()> {
        let cache = Arc::new(MapCache::default());
        let transport = Arc::new(ScriptedTransport::new(Ok(true)));
        let checker = PermissionChecker::new(cache.clone(), transport.clone());

        // Both would otherwise share the key "a:b:c:d".
        for (principal, permission, resource) in [("a", "b", "c:d"), ("a:b", "c", "d")] {
            assert!(matches!(
                checker.check(principal, permission, resource).await,
                Err(AppError::InvalidPermission(_))
            ));
        }

        assert!(checker.check("a", "b:c", "d").await?);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.entries.lock().await.len(), 1);
        Ok(())
    }
}
