//! Session registry keyed by opaque session id.
//!
//! Each session lives in its own slot with its own async mutex, so a slow
//! submission on one session never blocks another, while submissions on the
//! same session run one at a time. Idle sessions expire after a TTL.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::session::Session;

/// Default idle lifetime of a session.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// A single session plus its last-activity timestamp.
pub struct SessionSlot {
    session: tokio::sync::Mutex<Session>,
    last_touched: Mutex<Instant>,
}

impl SessionSlot {
    fn new(session: Session) -> Self {
        Self {
            session: tokio::sync::Mutex::new(session),
            last_touched: Mutex::new(Instant::now()),
        }
    }

    /// Wait for exclusive access to the session.
    ///
    /// The session counts as active from acquisition until the guard is
    /// dropped, so a long submission never ages it toward expiry.
    pub async fn lock(&self) -> SessionGuard<'_> {
        let guard = self.session.lock().await;
        self.touch();
        SessionGuard { guard, slot: self }
    }

    fn touch(&self) {
        *lock_std(&self.last_touched) = Instant::now();
    }

    fn idle_since(&self) -> Instant {
        *lock_std(&self.last_touched)
    }

    fn is_busy(&self) -> bool {
        self.session.try_lock().is_err()
    }
}

/// Exclusive access to a session; refreshes its idle timer on release.
pub struct SessionGuard<'a> {
    guard: tokio::sync::MutexGuard<'a, Session>,
    slot: &'a SessionSlot,
}

impl Deref for SessionGuard<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.guard
    }
}

impl DerefMut for SessionGuard<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        &mut self.guard
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        // Runs before the inner guard unlocks.
        self.slot.touch();
    }
}

fn lock_std<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-wide map from session id to session.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<SessionSlot>>>,
    ttl: Duration,
    confidence_max: u8,
}

impl SessionRegistry {
    pub fn new(ttl: Duration, confidence_max: u8) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            confidence_max,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn expired(&self, slot: &SessionSlot, now: Instant) -> bool {
        !slot.is_busy() && now.duration_since(slot.idle_since()) >= self.ttl
    }

    /// Look up a live session without creating one.
    pub fn get(&self, id: &str) -> Option<Arc<SessionSlot>> {
        let mut sessions = lock_std(&self.sessions);
        let slot = sessions.get(id)?;
        if self.expired(slot, Instant::now()) {
            sessions.remove(id);
            tracing::debug!(session = id, "session expired on access");
            return None;
        }
        Some(Arc::clone(slot))
    }

    /// Look up a session, creating a fresh `NotStarted` one on first use or
    /// after expiry.
    pub fn get_or_create(&self, id: &str) -> Arc<SessionSlot> {
        let mut sessions = lock_std(&self.sessions);
        let now = Instant::now();
        if let Some(slot) = sessions.get(id) {
            if !self.expired(slot, now) {
                return Arc::clone(slot);
            }
            tracing::debug!(session = id, "replacing expired session");
        }
        let slot = Arc::new(SessionSlot::new(Session::new(id, self.confidence_max)));
        sessions.insert(id.to_string(), Arc::clone(&slot));
        slot
    }

    pub fn remove(&self, id: &str) -> bool {
        lock_std(&self.sessions).remove(id).is_some()
    }

    /// Drop every idle session past its TTL. Returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = lock_std(&self.sessions);
        let before = sessions.len();
        sessions.retain(|_, slot| !self.expired(slot, now));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "evicted expired sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        lock_std(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run [`Self::evict_expired`] every `every` until the handle is aborted.
    pub fn spawn_reaper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.evict_expired();
            }
        })
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(
            DEFAULT_SESSION_TTL,
            crate::session::DEFAULT_CONFIDENCE_MAX,
        )
    }
}
