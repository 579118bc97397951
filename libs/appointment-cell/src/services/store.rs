use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::BookingError;
use crate::services::session::BookingSession;

pub type SharedSession = Arc<Mutex<BookingSession>>;

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

struct StoredSession {
    session: SharedSession,
    last_touched: Instant,
}

/// In-memory registry of open booking sessions. Nothing survives a restart.
/// Sessions untouched for longer than the idle timeout are evicted whenever a
/// new session is created.
#[derive(Clone)]
pub struct BookingSessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, StoredSession>>>,
    idle_timeout: Duration,
}

impl Default for BookingSessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl BookingSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    pub async fn create(&self, session: BookingSession) -> SharedSession {
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        let now = Instant::now();

        let mut sessions = self.sessions.write().await;
        let evicted = Self::sweep(&mut sessions, now, self.idle_timeout);
        if evicted > 0 {
            info!("Evicted {} idle booking sessions", evicted);
        }
        sessions.insert(id, StoredSession {
            session: Arc::clone(&shared),
            last_touched: now,
        });

        debug!("Stored booking session {}", id);
        shared
    }

    /// Fetch a session and mark it as recently used.
    pub async fn get(&self, session_id: Uuid) -> Result<SharedSession, BookingError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(&session_id)
            .ok_or(BookingError::SessionNotFound(session_id))?;
        stored.last_touched = Instant::now();
        Ok(Arc::clone(&stored.session))
    }

    pub async fn remove(&self, session_id: Uuid) -> Result<SharedSession, BookingError> {
        let removed = self.sessions
            .write()
            .await
            .remove(&session_id)
            .ok_or(BookingError::SessionNotFound(session_id))?;
        debug!("Removed booking session {}", session_id);
        Ok(removed.session)
    }

    #[cfg(test)]
    async fn evict_idle_at(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        Self::sweep(&mut sessions, now, self.idle_timeout)
    }

    fn sweep(sessions: &mut HashMap<Uuid, StoredSession>, now: Instant, idle_timeout: Duration) -> usize {
        let before = sessions.len();
        sessions.retain(|id, stored| {
            let keep = now.saturating_duration_since(stored.last_touched) < idle_timeout;
            if !keep {
                debug!("Booking session {} idle, evicting", id);
            }
            keep
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
