//! In-memory toast stack fed by a [`NotificationChannel`].

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use shared::domain::Notification;

use crate::notify::{NotificationChannel, Subscription};

pub const DEFAULT_TOAST_TTL: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub notification: Notification,
    pub expires_at: Instant,
}

#[derive(Debug, Default)]
struct BoardState {
    next_id: u64,
    toasts: Vec<Toast>,
}

#[derive(Debug, Clone)]
pub struct ToastBoard {
    ttl: Duration,
    state: Arc<Mutex<BoardState>>,
}

impl Default for ToastBoard {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL)
    }
}

impl ToastBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Arc::new(Mutex::new(BoardState::default())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Makes this board the channel's renderer for as long as the returned
    /// subscription lives.
    pub fn attach(&self, channel: &NotificationChannel) -> Subscription {
        let board = self.clone();
        channel.register(move |notification: &Notification| {
            board.push(notification.clone());
        })
    }

    pub fn push(&self, notification: Notification) -> u64 {
        self.push_at(notification, Instant::now())
    }

    pub fn push_at(&self, notification: Notification, now: Instant) -> u64 {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.toasts.push(Toast {
            id,
            notification,
            expires_at: now + self.ttl,
        });
        id
    }

    /// Returns whether a toast with `id` was showing.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut state = self.lock();
        let before = state.toasts.len();
        state.toasts.retain(|toast| toast.id != id);
        state.toasts.len() != before
    }

    /// Drops expired toasts and returns how many were removed.
    pub fn prune(&self, now: Instant) -> usize {
        let mut state = self.lock();
        let before = state.toasts.len();
        state.toasts.retain(|toast| toast.expires_at > now);
        before - state.toasts.len()
    }

    /// Unexpired toasts, oldest first.
    pub fn active(&self, now: Instant) -> Vec<Toast> {
        self.lock()
            .toasts
            .iter()
            .filter(|toast| toast.expires_at > now)
            .cloned()
            .collect()
    }

    /// Removes and returns every toast regardless of expiry.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut self.lock().toasts)
    }

    pub fn len(&self) -> usize {
        self.lock().toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/toast_tests.rs"]
mod tests;
