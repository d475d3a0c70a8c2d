//! Engine log and progress notifications
//!
//! Listeners are registered through [`EngineEvents::subscribe_log`] and
//! [`EngineEvents::subscribe_progress`]. Each call returns a
//! [`Subscription`]; dropping it removes the listener. Notifications are
//! diagnostic only and never drive control flow.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::engine::progress::EngineProgress;

type LogListener = Box<dyn FnMut(&str) + Send>;
type ProgressListener = Box<dyn FnMut(&EngineProgress) + Send>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    log: Vec<(u64, LogListener)>,
    progress: Vec<(u64, ProgressListener)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenerKind {
    Log,
    Progress,
}

/// Fan-out hub for engine notifications
#[derive(Clone, Default)]
pub struct EngineEvents {
    inner: Arc<Mutex<Listeners>>,
}

impl EngineEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a log line listener
    pub fn subscribe_log<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&str) + Send + 'static,
    {
        let mut listeners = self.lock();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.log.push((id, Box::new(listener)));
        self.subscription(id, ListenerKind::Log)
    }

    /// Register a progress listener
    pub fn subscribe_progress<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&EngineProgress) + Send + 'static,
    {
        let mut listeners = self.lock();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.progress.push((id, Box::new(listener)));
        self.subscription(id, ListenerKind::Progress)
    }

    /// Deliver one log line to every log listener.
    ///
    /// Listeners run under the hub lock and must not subscribe or
    /// unsubscribe from inside the callback.
    pub fn emit_log(&self, line: &str) {
        for (_, listener) in self.lock().log.iter_mut() {
            listener(line);
        }
    }

    /// Deliver one progress notification to every progress listener
    pub fn emit_progress(&self, progress: &EngineProgress) {
        for (_, listener) in self.lock().progress.iter_mut() {
            listener(progress);
        }
    }

    /// Number of live listeners, log and progress combined
    pub fn listener_count(&self) -> usize {
        let listeners = self.lock();
        listeners.log.len() + listeners.progress.len()
    }

    fn subscription(&self, id: u64, kind: ListenerKind) -> Subscription {
        Subscription {
            id,
            kind,
            hub: Arc::downgrade(&self.inner),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Listeners> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for EngineEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle to a registered listener; unsubscribes on drop
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    kind: ListenerKind,
    hub: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Remove the listener now
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(hub) = self.hub.upgrade() else {
            return;
        };
        let mut listeners = hub.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match self.kind {
            ListenerKind::Log => listeners.log.retain(|(id, _)| *id != self.id),
            ListenerKind::Progress => listeners.progress.retain(|(id, _)| *id != self.id),
        }
    }
}
