//! The shared arena holding every admitted task.

use crate::common::{read, write, ExecutionTarget, TaskKey};
use crate::components::task::{ScheduledTask, TaskHandle};
use slotmap::SlotMap;
use std::sync::{Arc, RwLock};

/// Thread-safe storage for admitted tasks.
///
/// Raw storage may still hold cancelled, finished or orphaned tasks until a
/// dispatch pass purges them; `live` filters those out.
#[derive(Default)]
pub(crate) struct TaskSet {
    slots: RwLock<SlotMap<TaskKey, TaskHandle>>,
}

impl TaskSet {
    pub(crate) fn insert(&self, task: &TaskHandle) -> TaskKey {
        let key = write(&self.slots).insert(Arc::clone(task));
        task.assign_key(key);
        key
    }

    /// Removes `task` from storage. Returns `true` if it was present.
    pub(crate) fn remove(&self, task: &ScheduledTask) -> bool {
        let Some(key) = task.key() else {
            return false;
        };
        let mut slots = write(&self.slots);
        match slots.get(key) {
            Some(stored) if std::ptr::eq(Arc::as_ptr(stored), task) => {
                slots.remove(key);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn contains(&self, task: &ScheduledTask) -> bool {
        task.key()
            .and_then(|key| read(&self.slots).get(key).map(|stored| stored.id() == task.id()))
            .unwrap_or(false)
    }

    /// Copies out every stored task matching `filter`, oldest first.
    ///
    /// Callers dispatch from the copy so the lock is never held while an
    /// action runs.
    pub(crate) fn snapshot_where(&self, filter: impl Fn(&ScheduledTask) -> bool) -> Vec<TaskHandle> {
        let mut tasks: Vec<TaskHandle> = read(&self.slots)
            .values()
            .filter(|task| filter(task))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.id());
        tasks
    }

    pub(crate) fn for_target(&self, target: ExecutionTarget) -> Vec<TaskHandle> {
        self.snapshot_where(|task| task.target() == target)
    }

    pub(crate) fn live(&self) -> Vec<TaskHandle> {
        self.snapshot_where(ScheduledTask::is_live)
    }

    /// Detaches every stored task. Each is purged on its next dispatch pass.
    pub(crate) fn invalidate_all(&self) {
        for task in read(&self.slots).values() {
            task.invalidate();
        }
    }

    pub(crate) fn len(&self) -> usize {
        read(&self.slots).len()
    }
}
