//! The dispatch engine: decides, for one task at a time, whether to run it,
//! defer it, or purge it.
//!
//! The engine is stateless apart from the task itself, so every driver (the
//! background loop as well as host pulses) calls into the same code and may
//! do so as often as it likes. Decisions are evaluated in a fixed order and
//! the first matching rule wins:
//!
//! 1. cancelled or finished tasks are purged;
//! 2. detached tasks (reference no longer alive) are purged;
//! 3. tasks whose owner reports itself dead are left alone, and tasks whose
//!    owner has been dropped are purged;
//! 4. tasks whose start time lies in the future are deferred;
//! 5. tasks whose end time has passed are stamped finished and purged;
//! 6. periodic tasks that ran less than one period ago are deferred;
//! 7. everything else runs. One-shot tasks are then finished and purged.

use crate::common::ExecutionTarget;
use crate::components::task::{ScheduledTask, TaskAction, TaskHandle};
use crate::events::{PurgeReason, SchedulerEvent};
use crate::scheduler::SchedulerCore;
use crate::time::elapsed;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, trace};

/// What a single dispatch pass did with a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The task was removed from the task set without running.
    Purged(PurgeReason),
    /// The owner is currently dead. The task stays pending.
    OwnerNotAlive,
    /// The start time has not been reached.
    NotYetStarted,
    /// The period has not elapsed since the last run.
    TooSoon,
    /// Another driver is executing the task right now.
    Busy,
    /// The action ran. `finished` is set when the task was purged afterwards.
    Ran { failed: bool, finished: bool },
}

impl RunOutcome {
    pub fn ran(&self) -> bool {
        matches!(self, RunOutcome::Ran { .. })
    }
}

impl SchedulerCore {
    pub(crate) fn run_task(&self, task: &TaskHandle) -> RunOutcome {
        if task.is_cancelled() {
            return self.purge(task, PurgeReason::Cancelled);
        }
        if task.is_finished() {
            return self.purge(task, PurgeReason::Finished);
        }
        if !task.is_reference_alive() {
            return self.purge(task, PurgeReason::ReferenceDead);
        }
        match task.owner() {
            None => return self.purge(task, PurgeReason::OwnerDropped),
            Some(owner) if !owner.is_alive() => {
                trace!("Task {} '{}' waits on a dead owner.", task.id(), task.name());
                return RunOutcome::OwnerNotAlive;
            }
            Some(_) => {}
        }

        let Some(mut action) = task.try_lock_action() else {
            return RunOutcome::Busy;
        };
        // Another driver may have finished or cancelled the task while we waited.
        if task.is_cancelled() {
            return self.purge(task, PurgeReason::Cancelled);
        }
        if task.is_finished() {
            return self.purge(task, PurgeReason::Finished);
        }

        let now = self.clock.now();
        let timing = task.timing();
        if timing.start_time.is_some_and(|start| start > now) {
            return RunOutcome::NotYetStarted;
        }
        if timing.end_time.is_some_and(|end| end < now) {
            task.finish(now);
            return self.purge(task, PurgeReason::Expired);
        }
        if let (Some(period), Some(last_run)) = (task.period(), timing.last_run_time) {
            if elapsed(now, last_run) < period {
                return RunOutcome::TooSoon;
            }
        }

        let failed = self.execute(task, &mut action);
        if task.period().is_some() {
            return RunOutcome::Ran {
                failed,
                finished: false,
            };
        }
        // Finish before releasing the action so no other driver can rerun it.
        task.finish(self.clock.now());
        drop(action);
        self.purge(task, PurgeReason::Finished);
        RunOutcome::Ran {
            failed,
            finished: true,
        }
    }

    /// Dispatches every stored task targeted at `target`.
    pub(crate) fn run_pending(&self, target: ExecutionTarget) -> usize {
        self.tasks
            .for_target(target)
            .iter()
            .filter(|task| self.run_task(task).ran())
            .count()
    }

    /// Dispatches every stored task the background driver is responsible for.
    pub(crate) fn run_background_pass(&self) -> usize {
        self.tasks
            .snapshot_where(|task| self.config.runs_in_background(task.target()))
            .iter()
            .filter(|task| self.run_task(task).ran())
            .count()
    }

    /// Runs the action, capturing errors and panics. Returns `true` on failure.
    fn execute(&self, task: &ScheduledTask, action: &mut TaskAction) -> bool {
        trace!("Running task {} '{}'.", task.id(), task.name());
        let failed = match panic::catch_unwind(AssertUnwindSafe(|| action())) {
            Ok(Ok(())) => false,
            Ok(Err(err)) => {
                error!("An error occurred in task {} '{}': {:#}", task.id(), task.name(), err);
                true
            }
            Err(payload) => {
                error!(
                    "Task {} '{}' panicked: {}",
                    task.id(),
                    task.name(),
                    panic_message(payload.as_ref())
                );
                true
            }
        };
        task.record_run(self.clock.now());
        self.publish(SchedulerEvent::TaskRan {
            id: task.id(),
            failed,
        });
        failed
    }

    fn purge(&self, task: &ScheduledTask, reason: PurgeReason) -> RunOutcome {
        if self.tasks.remove(task) {
            debug!("Purged task {} '{}' ({:?}).", task.id(), task.name(), reason);
            self.publish(SchedulerEvent::TaskPurged {
                id: task.id(),
                reason,
            });
        }
        RunOutcome::Purged(reason)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
