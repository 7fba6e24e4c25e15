//! Contains common, primitive types shared across the scheduler.
//!
//! This module defines the identifiers used to address tasks, both the
//! process-unique `TaskId` handed out at admission and the arena slot key the
//! task set stores them under, as well as the `ExecutionTarget` that decides
//! which driver is allowed to run a task.

use crate::error::SchedulerError;
use serde::Deserialize;
use slotmap::new_key_type;
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

new_key_type! {
    /// Identifies the slot an admitted task occupies inside the task set.
    ///
    /// Slot keys are versioned, so a key held by a purged task can never
    /// address a task admitted later into the same slot.
    pub struct TaskKey;
}

/// Uniquely identifies a scheduled task for the lifetime of its scheduler.
///
/// Ids are drawn from a monotonically increasing counter and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The logical pulse or context a task must run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionTarget {
    /// The host's main-thread tick.
    Sync,
    /// The scheduler's own background driver.
    Async,
    /// The host's next rendered frame.
    NextFrame,
    /// The host's next physics step.
    NextPhysicsUpdate,
    /// The next pass of the background driver.
    NextAsyncFrame,
}

impl ExecutionTarget {
    pub const ALL: [ExecutionTarget; 5] = [
        ExecutionTarget::Sync,
        ExecutionTarget::Async,
        ExecutionTarget::NextFrame,
        ExecutionTarget::NextPhysicsUpdate,
        ExecutionTarget::NextAsyncFrame,
    ];

    /// Maps the `run_async` flag of the timed scheduling calls to a target.
    pub fn from_async_flag(run_async: bool) -> Self {
        if run_async {
            ExecutionTarget::Async
        } else {
            ExecutionTarget::Sync
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExecutionTarget::Sync => "sync",
            ExecutionTarget::Async => "async",
            ExecutionTarget::NextFrame => "next_frame",
            ExecutionTarget::NextPhysicsUpdate => "next_physics_update",
            ExecutionTarget::NextAsyncFrame => "next_async_frame",
        }
    }
}

impl fmt::Display for ExecutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExecutionTarget {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        ExecutionTarget::ALL
            .into_iter()
            .find(|target| target.label() == wanted)
            .ok_or_else(|| SchedulerError::UnknownTarget(s.to_string()))
    }
}

// Every critical section in the crate leaves its data consistent, so a
// poisoned lock is recovered instead of propagated.

pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T: ?Sized>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T: ?Sized>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn async_flag_selects_background_or_main_thread() {
        assert_eq!(ExecutionTarget::from_async_flag(true), ExecutionTarget::Async);
        assert_eq!(ExecutionTarget::from_async_flag(false), ExecutionTarget::Sync);
    }

    #[test]
    fn targets_parse_from_their_labels() {
        for target in ExecutionTarget::ALL {
            assert_eq!(target.label().parse::<ExecutionTarget>().unwrap(), target);
        }
        assert_eq!(
            "Next-Frame".parse::<ExecutionTarget>().unwrap(),
            ExecutionTarget::NextFrame
        );
        assert!(matches!(
            "render".parse::<ExecutionTarget>(),
            Err(SchedulerError::UnknownTarget(_))
        ));
    }

    #[test]
    fn task_ids_order_by_admission() {
        assert!(TaskId(1) < TaskId(2));
        assert_eq!(TaskId(7).to_string(), "#7");
    }
}
