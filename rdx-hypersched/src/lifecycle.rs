//! Owner-side collaborators of the scheduler.
//!
//! A task never owns the object it was scheduled for. It keeps a weak
//! reference and asks the owner whether it is still alive each time a driver
//! looks at the task. Owners that can also emit events get a chance to veto
//! the task before it is admitted.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// An object whose lifetime bounds the tasks scheduled on its behalf.
pub trait LifecycleObject: Send + Sync {
    /// Returns `false` once the object has been torn down.
    fn is_alive(&self) -> bool;

    /// The object's event-emission capability, if it has one.
    ///
    /// Owners that return `Some` have every new task routed through the
    /// scheduler's event bus as a cancellable `TaskScheduledEvent`.
    fn as_event_emitter(&self) -> Option<&dyn EventEmitter> {
        None
    }
}

/// An object that can act as the source of an event.
pub trait EventEmitter: Send + Sync {
    fn emitter_name(&self) -> &str;
}

/// A named owner with an explicit on/off liveness switch.
///
/// Hosts that have no lifecycle object of their own (demos, shells, tests)
/// can schedule against one of these and flip it with `kill` and `revive`.
pub struct ManagedOwner {
    name: String,
    alive: AtomicBool,
    emits_events: bool,
}

impl ManagedOwner {
    /// Creates a live owner that routes its tasks through the event bus.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alive: AtomicBool::new(true),
            emits_events: true,
        }
    }

    /// Creates a live owner without an event-emission capability.
    pub fn silent(name: impl Into<String>) -> Self {
        Self {
            emits_events: false,
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kill(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn revive(&self) {
        self.alive.store(true, Ordering::SeqCst);
    }
}

impl fmt::Debug for ManagedOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedOwner")
            .field("name", &self.name)
            .field("alive", &self.is_alive())
            .field("emits_events", &self.emits_events)
            .finish()
    }
}

impl LifecycleObject for ManagedOwner {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn as_event_emitter(&self) -> Option<&dyn EventEmitter> {
        if self.emits_events {
            Some(self)
        } else {
            None
        }
    }
}

impl EventEmitter for ManagedOwner {
    fn emitter_name(&self) -> &str {
        &self.name
    }
}
