//! Shared server state: live editing sessions and the geometry adapter.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::cache::prune_cache;
use crate::config::Config;
use crate::geometry::AsyncGeometryAdapter;
use crate::session::SessionHandle;

pub struct AppState {
    sessions: DashMap<Uuid, SessionHandle>,
    adapter: Arc<dyn AsyncGeometryAdapter>,
    config: Config,
}

impl AppState {
    pub fn new(adapter: Arc<dyn AsyncGeometryAdapter>, config: Config) -> Self {
        Self {
            sessions: DashMap::new(),
            adapter,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn create_session(&self) -> SessionHandle {
        let handle = SessionHandle::spawn(
            self.adapter.clone(),
            &self.config.editor,
            self.config.session_queue_depth,
        );
        self.sessions.insert(handle.id(), handle.clone());
        handle
    }

    pub fn session(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// Drop a session. Its task exits once in-flight requests finish.
    pub fn remove_session(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions with no request for longer than `max_idle`.
    /// Returns how many were removed.
    pub fn reap_idle_sessions(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        prune_cache(&self.sessions, usize::MAX, max_idle);
        before.saturating_sub(self.sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::InProcessAdapter;
    use route_core::{FlatTerrain, GreatCircleAdapter};

    fn state() -> AppState {
        let config = Config::from_env();
        let adapter: Arc<dyn AsyncGeometryAdapter> = Arc::new(InProcessAdapter::new(
            GreatCircleAdapter::from_config(FlatTerrain(0.0), &config.editor),
        ));
        AppState::new(adapter, config)
    }

    #[tokio::test]
    async fn idle_sessions_are_reaped() {
        let state = state();
        let idle = state.create_session();
        let busy = state.create_session();

        tokio::time::sleep(Duration::from_millis(30)).await;
        busy.snapshot().await.unwrap();

        assert_eq!(state.reap_idle_sessions(Duration::from_millis(20)), 1);
        assert!(state.session(&idle.id()).is_none());
        assert!(state.session(&busy.id()).is_some());

        assert_eq!(state.reap_idle_sessions(Duration::from_secs(60)), 0);
        assert_eq!(state.session_count(), 1);
    }
}
