//! Defines the scheduled task record and its state transitions.

use crate::common::{lock, ExecutionTarget, TaskId, TaskKey};
use crate::lifecycle::LifecycleObject;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, TryLockError, Weak};
use std::time::Duration;

/// The unit of work a task executes.
///
/// An `Err` is logged against the task and otherwise treated like a normal run.
pub type TaskAction = Box<dyn FnMut() -> anyhow::Result<()> + Send>;

/// Shared handle to a scheduled task.
pub type TaskHandle = Arc<ScheduledTask>;

/// The mutable timing state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskTiming {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_run_time: Option<DateTime<Utc>>,
}

/// One unit of scheduled work together with its timing and lifecycle state.
///
/// Tasks are created by the scheduler and shared between the caller, the
/// task set and the drivers. All state transitions go through `&self`.
pub struct ScheduledTask {
    id: TaskId,
    name: String,
    owner: Weak<dyn LifecycleObject>,
    target: ExecutionTarget,
    period: Option<Duration>,
    timing: Mutex<TaskTiming>,
    action: Mutex<TaskAction>,
    cancelled: AtomicBool,
    finished: AtomicBool,
    reference_alive: AtomicBool,
    gated: AtomicBool,
    key: OnceLock<TaskKey>,
}

impl ScheduledTask {
    pub(crate) fn new(
        id: TaskId,
        name: String,
        owner: Weak<dyn LifecycleObject>,
        target: ExecutionTarget,
        action: TaskAction,
    ) -> Self {
        Self {
            id,
            name,
            owner,
            target,
            period: None,
            timing: Mutex::new(TaskTiming::default()),
            action: Mutex::new(action),
            cancelled: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            reference_alive: AtomicBool::new(true),
            gated: AtomicBool::new(false),
            key: OnceLock::new(),
        }
    }

    pub(crate) fn with_start_time(self, start_time: DateTime<Utc>) -> Self {
        lock(&self.timing).start_time = Some(start_time);
        self
    }

    pub(crate) fn with_period(mut self, period: Duration) -> Self {
        self.period = Some(period);
        self
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> ExecutionTarget {
        self.target
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// A snapshot of the task's timing state.
    pub fn timing(&self) -> TaskTiming {
        *lock(&self.timing)
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.timing().start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.timing().end_time
    }

    pub fn last_run_time(&self) -> Option<DateTime<Utc>> {
        self.timing().last_run_time
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn is_reference_alive(&self) -> bool {
        self.reference_alive.load(Ordering::SeqCst)
    }

    /// Whether the owner still exists and reports itself alive.
    pub fn is_owner_alive(&self) -> bool {
        self.owner().is_some_and(|owner| owner.is_alive())
    }

    /// Whether the task belongs in the live view.
    pub fn is_live(&self) -> bool {
        self.is_reference_alive()
            && !self.is_cancelled()
            && !self.is_finished()
            && self.is_owner_alive()
    }

    /// Sets a deadline after which the task is force-finished without running again.
    pub fn expire_at(&self, end_time: DateTime<Utc>) {
        lock(&self.timing).end_time = Some(end_time);
    }

    /// Detaches the task from its scheduler. The next dispatch pass purges it.
    pub fn invalidate(&self) {
        self.reference_alive.store(false, Ordering::SeqCst);
    }

    pub(crate) fn owner(&self) -> Option<Arc<dyn LifecycleObject>> {
        self.owner.upgrade()
    }

    /// Flags the task as cancelled. Returns `false` if it was already terminal.
    pub(crate) fn mark_cancelled(&self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Stamps the end time and flags the task as finished.
    pub(crate) fn finish(&self, now: DateTime<Utc>) {
        lock(&self.timing).end_time = Some(now);
        self.finished.store(true, Ordering::SeqCst);
    }

    pub(crate) fn record_run(&self, now: DateTime<Utc>) {
        lock(&self.timing).last_run_time = Some(now);
    }

    /// Claims the task's single pass through the admission gate.
    pub(crate) fn enter_gate(&self) -> bool {
        !self.gated.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn key(&self) -> Option<TaskKey> {
        self.key.get().copied()
    }

    pub(crate) fn assign_key(&self, key: TaskKey) {
        self.key.set(key).ok();
    }

    /// Takes the action for execution, or `None` if another driver is running it.
    pub(crate) fn try_lock_action(&self) -> Option<MutexGuard<'_, TaskAction>> {
        match self.action.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("target", &self.target)
            .field("period", &self.period)
            .field("timing", &self.timing())
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .field("reference_alive", &self.is_reference_alive())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::ManagedOwner;

    fn task_for(owner: &Arc<ManagedOwner>) -> ScheduledTask {
        let weak: Weak<dyn LifecycleObject> = Arc::downgrade(owner) as Weak<dyn LifecycleObject>;
        ScheduledTask::new(
            TaskId(1),
            "test".to_string(),
            weak,
            ExecutionTarget::Sync,
            Box::new(|| Ok(())),
        )
    }

    #[test]
    fn cancellation_only_succeeds_once() {
        let owner = Arc::new(ManagedOwner::new("owner"));
        let task = task_for(&owner);
        assert!(task.mark_cancelled());
        assert!(!task.mark_cancelled());
        assert!(task.is_cancelled());
        assert!(!task.is_live());
    }

    #[test]
    fn finished_tasks_cannot_be_cancelled() {
        let owner = Arc::new(ManagedOwner::new("owner"));
        let task = task_for(&owner);
        let now = Utc::now();
        task.finish(now);
        assert!(task.is_finished());
        assert_eq!(task.end_time(), Some(now));
        assert!(!task.mark_cancelled());
        assert!(!task.is_cancelled());
    }

    #[test]
    fn liveness_follows_owner_and_reference() {
        let owner = Arc::new(ManagedOwner::new("owner"));
        let task = task_for(&owner);
        assert!(task.is_live());

        owner.kill();
        assert!(!task.is_owner_alive());
        assert!(!task.is_live());
        owner.revive();
        assert!(task.is_live());

        task.invalidate();
        assert!(!task.is_live());
    }

    #[test]
    fn dropped_owner_is_never_alive() {
        let owner = Arc::new(ManagedOwner::new("owner"));
        let task = task_for(&owner);
        drop(owner);
        assert!(task.owner().is_none());
        assert!(!task.is_owner_alive());
    }

    #[test]
    fn gate_is_entered_at_most_once() {
        let owner = Arc::new(ManagedOwner::new("owner"));
        let task = task_for(&owner);
        assert!(task.enter_gate());
        assert!(!task.enter_gate());
    }

    #[test]
    fn action_lock_is_exclusive() {
        let owner = Arc::new(ManagedOwner::new("owner"));
        let task = task_for(&owner);
        let guard = task.try_lock_action();
        assert!(guard.is_some());
        assert!(task.try_lock_action().is_none());
        drop(guard);
        assert!(task.try_lock_action().is_some());
    }
}
