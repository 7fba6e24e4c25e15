//! Defines the events exchanged between the scheduler and its collaborators.
//!
//! Two kinds of event live here. `TaskScheduledEvent` is the cancellable
//! gating event an `EventBus` resolves before a task becomes live.
//! `SchedulerEvent` is the scheduler's own broadcast stream, which observers
//! subscribe to in order to follow admissions, runs and purges.

use crate::common::TaskId;
use crate::components::task::TaskHandle;
use crate::lifecycle::EventEmitter;
use chrono::{DateTime, Utc};

/// Raised for every new task whose owner can emit events.
///
/// Cancelling the event vetoes the task: it is marked cancelled and never
/// enters the task set.
#[derive(Debug, Clone)]
pub struct TaskScheduledEvent {
    task: TaskHandle,
    cancelled: bool,
}

impl TaskScheduledEvent {
    pub fn new(task: TaskHandle) -> Self {
        Self {
            task,
            cancelled: false,
        }
    }

    /// The task awaiting admission.
    pub fn task(&self) -> &TaskHandle {
        &self.task
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}

/// Continuation an `EventBus` invokes with the resolved event.
pub type OnResolved = Box<dyn FnOnce(TaskScheduledEvent) + Send>;

/// Routes gating events from an owner to whatever policy listens for them.
///
/// Implementations must invoke `on_resolved` exactly once, on any thread and
/// at any later point, with the event as the listeners left it.
pub trait EventBus: Send + Sync {
    fn emit(&self, source: &dyn EventEmitter, event: TaskScheduledEvent, on_resolved: OnResolved);
}

/// Why a task left the task set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeReason {
    /// The task was cancelled after admission.
    Cancelled,
    /// The task ran to completion.
    Finished,
    /// The task's end time passed.
    Expired,
    /// The task was invalidated or its scheduler shut down.
    ReferenceDead,
    /// The owner object no longer exists.
    OwnerDropped,
}

/// Events describing what the scheduler is doing.
#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    /// Fired once when the background driver begins looping.
    DriverStarted { timestamp: DateTime<Utc> },
    /// Fired once when the background driver exits.
    DriverStopped,
    /// Fired when a task enters the task set.
    TaskAdmitted { id: TaskId },
    /// Fired when a gating event vetoes a task.
    TaskRejected { id: TaskId },
    /// Fired after every execution of a task's action.
    TaskRan { id: TaskId, failed: bool },
    /// Fired when a task is removed from the task set.
    TaskPurged { id: TaskId, reason: PurgeReason },
}
