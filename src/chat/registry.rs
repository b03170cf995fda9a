//! Mounted chat widgets, keyed by session id.
//!
//! DESIGN
//! ======
//! A browser mount maps to `mount`, an unload to `unmount`. Tabs that close
//! without delivering the unload are covered by the idle reaper, which tears
//! down widgets that have been quiet for longer than the idle timeout.
//! Widgets with a send in flight are never reaped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;
use uuid::Uuid;

use super::store::ChatStore;
use super::{ChatWidget, SendPhase};
use crate::config::env_parse;

const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 1800;
const DEFAULT_REAP_INTERVAL_SECS: u64 = 60;

/// Idle reaper timing, loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaperConfig {
    /// Quiet time after which a widget counts as abandoned.
    pub idle_timeout: Duration,
    /// How often the reaper scans the registry.
    pub interval: Duration,
}

impl ReaperConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            idle_timeout: Duration::from_secs(env_parse("CHAT_IDLE_TIMEOUT_SECS", DEFAULT_IDLE_TIMEOUT_SECS)),
            interval: Duration::from_secs(env_parse("CHAT_REAP_INTERVAL_SECS", DEFAULT_REAP_INTERVAL_SECS).max(1)),
        }
    }
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            interval: Duration::from_secs(DEFAULT_REAP_INTERVAL_SECS),
        }
    }
}

pub type SharedWidget = Arc<Mutex<ChatWidget>>;

#[derive(Clone, Default)]
pub struct ChatRegistry {
    widgets: Arc<RwLock<HashMap<Uuid, SharedWidget>>>,
}

impl ChatRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly mounted widget and return its shared handle.
    pub async fn mount(&self, widget: ChatWidget) -> SharedWidget {
        let session_id = widget.session_id();
        let shared = Arc::new(Mutex::new(widget));
        self.widgets.write().await.insert(session_id, Arc::clone(&shared));
        shared
    }

    pub async fn get(&self, session_id: Uuid) -> Option<SharedWidget> {
        self.widgets.read().await.get(&session_id).cloned()
    }

    /// Remove and tear down. Returns `false` if no such widget was mounted.
    pub async fn unmount(&self, session_id: Uuid, store: Arc<dyn ChatStore>) -> bool {
        let Some(widget) = self.widgets.write().await.remove(&session_id) else {
            return false;
        };
        widget.lock().await.teardown(store);
        true
    }

    pub async fn len(&self) -> usize {
        self.widgets.read().await.len()
    }

    /// Tear down every idle widget whose last activity is older than
    /// `idle_timeout` as of `now`. Widgets that are locked or mid-send are
    /// left alone. Returns the number reaped.
    ///
    /// The idle check and the teardown happen under the same widget guard,
    /// so a send can never start in between.
    pub async fn reap_idle(&self, now: Instant, idle_timeout: Duration, store: &Arc<dyn ChatStore>) -> usize {
        let mut widgets = self.widgets.write().await;
        let mut expired = Vec::new();
        for (session_id, widget) in widgets.iter() {
            let Ok(mut w) = widget.try_lock() else {
                continue;
            };
            if w.phase() == SendPhase::Idle && now.saturating_duration_since(w.last_active()) > idle_timeout {
                w.teardown(Arc::clone(store));
                expired.push(*session_id);
            }
        }

        for session_id in &expired {
            widgets.remove(session_id);
        }
        expired.len()
    }
}

/// Spawn the idle reaper. Returns a handle for shutdown.
pub fn spawn_reaper(registry: ChatRegistry, store: Arc<dyn ChatStore>, config: ReaperConfig) -> JoinHandle<()> {
    info!(
        idle_timeout_secs = config.idle_timeout.as_secs(),
        interval_secs = config.interval.as_secs(),
        "chat idle reaper configured"
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let reaped = registry.reap_idle(Instant::now(), config.idle_timeout, &store).await;
            if reaped > 0 {
                let remaining = registry.len().await;
                info!(reaped, remaining, "chat: idle sessions torn down");
            }
        }
    })
}
