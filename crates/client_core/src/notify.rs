//! Single-slot notification channel between request/form handling and
//! whatever renders toasts.

use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::domain::Notification;
use tracing::{debug, warn};

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification);
}

impl<F> NotificationSink for F
where
    F: Fn(&Notification) + Send + Sync,
{
    fn notify(&self, notification: &Notification) {
        self(notification)
    }
}

#[derive(Default)]
struct Slot {
    generation: u64,
    sink: Option<Arc<dyn NotificationSink>>,
}

/// Cheaply clonable handle; clones share the same slot.
#[derive(Clone, Default)]
pub struct NotificationChannel {
    slot: Arc<Mutex<Slot>>,
}

impl NotificationChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `sink` as the only subscriber, replacing any previous one.
    pub fn register<S>(&self, sink: S) -> Subscription
    where
        S: NotificationSink + 'static,
    {
        let mut slot = self.lock();
        if slot.sink.is_some() {
            debug!("replacing active notification subscriber");
        }
        slot.generation += 1;
        slot.sink = Some(Arc::new(sink));
        Subscription {
            channel: self.clone(),
            generation: slot.generation,
            armed: true,
        }
    }

    /// Clears the slot. Safe to call when nothing is registered.
    pub fn unregister(&self) {
        self.lock().sink = None;
    }

    pub fn is_registered(&self) -> bool {
        self.lock().sink.is_some()
    }

    /// Hands `notification` to the current subscriber, if any. A panicking
    /// subscriber is logged and otherwise ignored.
    pub fn publish(&self, notification: Notification) {
        // Released before the call so the subscriber may publish or unregister.
        let sink = self.lock().sink.clone();
        let Some(sink) = sink else {
            debug!(kind = %notification.kind, "no notification subscriber; dropping");
            return;
        };

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| sink.notify(&notification)))
        {
            warn!(
                kind = %notification.kind,
                reason = panic_reason(payload.as_ref()),
                "notification subscriber panicked"
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationChannel")
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// Ties a registered subscriber to its owner. Dropping it unregisters the
/// subscriber, unless a newer registration has already replaced it.
#[must_use = "dropping a Subscription immediately unregisters the subscriber"]
pub struct Subscription {
    channel: NotificationChannel,
    generation: u64,
    armed: bool,
}

impl Subscription {
    /// Whether this subscription's sink still owns the slot.
    pub fn is_current(&self) -> bool {
        let slot = self.channel.lock();
        slot.generation == self.generation && slot.sink.is_some()
    }

    pub fn cancel(mut self) {
        self.release();
    }

    /// Leaves the subscriber installed; only [`NotificationChannel::unregister`]
    /// or a later registration removes it.
    pub fn detach(mut self) {
        self.armed = false;
    }

    fn release(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;
        let mut slot = self.channel.lock();
        if slot.generation == self.generation {
            slot.sink = None;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("generation", &self.generation)
            .field("armed", &self.armed)
            .finish()
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
#[path = "tests/notify_tests.rs"]
mod tests;
