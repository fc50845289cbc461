//! Application state for the web layer.

use std::sync::Arc;

use moka::future::Cache as MokaCache;
use tokio::sync::Mutex;

use crate::cache::{CacheConfig, CachedCandidates, SessionConfig};
use crate::discovery::{BrowseCursor, DiscoveryConfig, Scanner};
use crate::domain::UserId;
use crate::store::StoreBackend;

/// Scan state of one traveler.
///
/// Clones share the scanner's generation counter and the cursor slot.
#[derive(Debug, Clone)]
pub struct Session {
    /// So a new scan only supersedes the traveler's own
    pub scanner: Scanner,

    /// Browse position over the latest non-empty scan, if any
    pub cursor: Arc<Mutex<Option<BrowseCursor>>>,
}

impl Session {
    fn new(config: DiscoveryConfig) -> Self {
        Self {
            scanner: Scanner::new(config),
            cursor: Arc::new(Mutex::new(None)),
        }
    }
}

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Profile store
    pub store: Arc<StoreBackend>,

    /// Candidate queries, cached in front of the store
    pub candidates: Arc<CachedCandidates<StoreBackend>>,

    /// Discovery configuration
    pub config: Arc<DiscoveryConfig>,

    /// Per-traveler sessions, evicted when idle
    sessions: MokaCache<UserId, Session>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        store: StoreBackend,
        cache: &CacheConfig,
        sessions: &SessionConfig,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            candidates: Arc::new(CachedCandidates::new(store.clone(), cache)),
            store: Arc::new(store),
            config: Arc::new(config),
            sessions: MokaCache::builder()
                .time_to_idle(sessions.idle)
                .max_capacity(sessions.max_capacity)
                .build(),
        }
    }

    /// The session for `user`, created on first use.
    pub async fn session_for(&self, user: &UserId) -> Session {
        let config = self.config.as_ref().clone();
        self.sessions
            .get_with(user.clone(), async move { Session::new(config) })
            .await
    }

    /// The session for `user` if one is live.
    pub async fn existing_session(&self, user: &UserId) -> Option<Session> {
        self.sessions.get(user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::store::MemoryStore;

    fn state(sessions: SessionConfig) -> AppState {
        AppState::new(
            StoreBackend::Memory(MemoryStore::new()),
            &CacheConfig::default(),
            &sessions,
            DiscoveryConfig::default(),
        )
    }

    #[tokio::test]
    async fn session_is_shared_per_user() {
        let state = state(SessionConfig::default());
        let me = UserId::parse("me").unwrap();

        let first = state.session_for(&me).await;
        let second = state.session_for(&me).await;
        first.scanner.invalidate();

        assert!(second.scanner.is_current(1));
        assert!(Arc::ptr_eq(&first.cursor, &second.cursor));

        let other = state.session_for(&UserId::parse("other").unwrap()).await;
        assert!(other.scanner.is_current(0));
    }

    #[tokio::test]
    async fn idle_session_expires() {
        let state = state(SessionConfig {
            idle: Duration::from_millis(50),
            ..SessionConfig::default()
        });
        let me = UserId::parse("me").unwrap();

        state.session_for(&me).await;
        assert!(state.existing_session(&me).await.is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(state.existing_session(&me).await.is_none());
    }
}
