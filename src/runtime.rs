//! Runtime for executing sessions
//!
//! Each session gets its own `SessionRuntime` behind a mutex; the manager only
//! indexes them, sessions never share state. Sessions nobody has touched for
//! the idle timeout are dropped by `cleanup_expired`.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::{ActionReport, SessionRuntime};

use crate::llm::ChatClient;
use crate::state_machine::SessionContext;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Settings applied to every new session
#[derive(Debug, Clone)]
pub struct SessionDefaults {
    pub top_up_delay: Duration,
    pub starting_credits: u32,
}

struct SessionEntry {
    runtime: Arc<Mutex<SessionRuntime>>,
    last_active: Instant,
}

/// Manager for all live sessions
pub struct SessionManager {
    client: Arc<dyn ChatClient>,
    defaults: SessionDefaults,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionManager {
    pub fn new(client: Arc<dyn ChatClient>, defaults: SessionDefaults) -> Self {
        Self {
            client,
            defaults,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a logged-out session and return its id
    pub async fn create(&self) -> (String, Arc<Mutex<SessionRuntime>>) {
        let id = uuid::Uuid::new_v4().to_string();
        let context = SessionContext::new(id.clone())
            .with_top_up_delay(self.defaults.top_up_delay)
            .with_starting_credits(self.defaults.starting_credits);
        let runtime = Arc::new(Mutex::new(SessionRuntime::new(context, self.client.clone())));

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            id.clone(),
            SessionEntry {
                runtime: runtime.clone(),
                last_active: Instant::now(),
            },
        );
        tracing::info!(session_id = %id, active = sessions.len(), "Session created");
        (id, runtime)
    }

    /// Look up a session and mark it active
    pub async fn get(&self, id: &str) -> Option<Arc<Mutex<SessionRuntime>>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_active = Instant::now();
        Some(entry.runtime.clone())
    }

    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Session dropped");
        }
        removed
    }

    /// Drop sessions idle for at least `max_idle`. Sessions in the middle of
    /// an action are kept. Returns how many were dropped.
    pub async fn cleanup_expired(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            entry.last_active.elapsed() < max_idle || entry.runtime.try_lock().is_err()
        });
        let dropped = before - sessions.len();
        if dropped > 0 {
            tracing::info!(dropped, active = sessions.len(), "Idle sessions dropped");
        }
        dropped
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockChatClient;
    use super::*;
    use crate::config::AppConfig;
    use crate::state_machine::Screen;
    use crate::system_prompt::Topic;

    fn manager() -> (Arc<MockChatClient>, SessionManager) {
        let mock = Arc::new(MockChatClient::new("mock"));
        let manager = SessionManager::new(
            mock.clone(),
            SessionDefaults {
                top_up_delay: Duration::ZERO,
                starting_credits: 2,
            },
        );
        (mock, manager)
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let (mock, manager) = manager();
        let (a, rt_a) = manager.create().await;
        let (b, rt_b) = manager.create().await;
        assert_ne!(a, b);
        assert_eq!(manager.len().await, 2);

        mock.queue_reply("welcome");
        {
            let mut rt = rt_a.lock().await;
            rt.login("Alex").await.unwrap();
            rt.select_topic(Topic::General).await.unwrap();
            assert_eq!(rt.session().credits(), 2);
        }

        let rt = rt_b.lock().await;
        assert!(!rt.session().logged_in);
        assert!(rt.session().conversation.is_empty());
    }

    #[tokio::test]
    async fn test_default_config_allows_ten_answered_turns() {
        let config = AppConfig::default();
        let mock = Arc::new(MockChatClient::new("mock"));
        let manager = SessionManager::new(
            mock.clone(),
            SessionDefaults {
                top_up_delay: Duration::ZERO,
                starting_credits: config.starting_credits,
            },
        );
        let (_, runtime) = manager.create().await;
        let mut rt = runtime.lock().await;
        rt.login("Alex").await.unwrap();
        mock.queue_reply("welcome");
        rt.select_topic(Topic::General).await.unwrap();

        let mut answered = 0;
        for i in 0..11 {
            mock.queue_reply(format!("reply {i}"));
            let report = rt.send_message("hello").await.unwrap();
            if report.notices.is_empty() {
                answered += 1;
            }
        }

        assert_eq!(answered, 10);
        assert_eq!(rt.session().chats_used(), 10);
        assert_eq!(rt.session().credits(), 0);
        assert_eq!(rt.session().screen(), Screen::Exhausted);
    }

    #[tokio::test]
    async fn test_cleanup_drops_idle_sessions_only() {
        let (_mock, manager) = manager();
        let (idle, _) = manager.create().await;
        let (busy, busy_rt) = manager.create().await;

        assert_eq!(manager.cleanup_expired(Duration::from_secs(60)).await, 0);
        assert_eq!(manager.len().await, 2);

        // A session holding its lock is mid-action and survives
        let _guard = busy_rt.lock().await;
        assert_eq!(manager.cleanup_expired(Duration::ZERO).await, 1);
        assert!(manager.get(&idle).await.is_none());
        assert!(manager.get(&busy).await.is_some());
    }

    #[tokio::test]
    async fn test_remove_drops_session() {
        let (_mock, manager) = manager();
        let (id, _) = manager.create().await;
        assert!(manager.get(&id).await.is_some());
        assert!(manager.remove(&id).await);
        assert!(manager.get(&id).await.is_none());
        assert!(!manager.remove(&id).await);
    }
}
