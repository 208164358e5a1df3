//! Drops editing sessions nobody has touched for a while.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::config::Config;
use crate::state::AppState;

pub async fn run_session_reaper_loop(state: Arc<AppState>, config: Config) {
    let max_idle = Duration::from_secs(config.session_idle_ttl_s);
    let mut ticker = interval(Duration::from_secs(config.session_reap_interval_s.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let reaped = state.reap_idle_sessions(max_idle);
        if reaped > 0 {
            tracing::info!(
                "Reaped {} idle session(s), {} remaining",
                reaped,
                state.session_count()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{AsyncGeometryAdapter, InProcessAdapter};
    use route_core::{FlatTerrain, GreatCircleAdapter};

    #[tokio::test]
    async fn loop_reaps_sessions_past_the_idle_ttl() {
        let mut config = Config::from_env();
        config.session_idle_ttl_s = 0;
        config.session_reap_interval_s = 1;
        let adapter: Arc<dyn AsyncGeometryAdapter> = Arc::new(InProcessAdapter::new(
            GreatCircleAdapter::from_config(FlatTerrain(0.0), &config.editor),
        ));
        let state = Arc::new(AppState::new(adapter, config.clone()));
        state.create_session();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let reaper = tokio::spawn(run_session_reaper_loop(state.clone(), config));
        for _ in 0..50 {
            if state.session_count() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        reaper.abort();
        assert_eq!(state.session_count(), 0);
    }
}
