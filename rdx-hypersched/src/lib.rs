//! # Hypersched
//!
//! A multi-target task scheduler with event-gated admission and owner-bound
//! task lifetimes.
//!
//! Hypersched admits actions on behalf of *owner* objects, lets an external
//! policy veto each admission through a cancellable event, and runs admitted
//! tasks when the driver for their execution target asks it to.
//!
//! ## Core Concepts
//!
//! - **Owner**: any `LifecycleObject`. Tasks hold only a weak reference to
//!   their owner and skip (or drop) themselves once it is no longer alive.
//! - **Execution Target**: `Sync`, `Async`, `NextFrame`, `NextPhysicsUpdate`
//!   or `NextAsyncFrame`. Background targets are run by the scheduler's own
//!   driver; the others are run whenever the host calls `run_pending` from
//!   the matching pulse of its main loop.
//! - **Gated Admission**: if the owner can emit events and an `EventBus` is
//!   registered, every new task is announced as a `TaskScheduledEvent` and
//!   only enters the task set if nobody cancels it.
//! - **Timing**: tasks may carry a start time, an end time and a period. The
//!   dispatch engine enforces them on every pass.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use hypersched::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Create and start the scheduler.
//!     let scheduler = TaskScheduler::launch(SchedulerConfig::default())?;
//!
//!     // 2. Tasks are scheduled on behalf of an owner.
//!     let owner = Arc::new(ManagedOwner::new("demo"));
//!
//!     // 3. A background task, every second.
//!     scheduler.schedule_periodically(&owner, "heartbeat", Duration::from_secs(1), None, true, || {
//!         println!("still here");
//!         Ok(())
//!     })?;
//!
//!     // 4. A one-off task for the next frame.
//!     scheduler.schedule_update(&owner, "spawn", ExecutionTarget::NextFrame, || Ok(()));
//!
//!     // 5. The host drives its own pulses.
//!     for _ in 0..3 {
//!         scheduler.run_pending(ExecutionTarget::Sync);
//!         scheduler.run_pending(ExecutionTarget::NextFrame);
//!         tokio::time::sleep(Duration::from_millis(16)).await;
//!     }
//!
//!     scheduler.shutdown().await;
//!     Ok(())
//! }
//! ```

pub const SCHEDULER_NAME: &str = "Hypersched";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod common;
pub mod components;
pub mod config;
pub mod dispatch;
mod driver;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod scheduler;
pub mod time;

/// A prelude module for easy importing of the most common Hypersched types.
pub mod prelude {
    pub use crate::common::{ExecutionTarget, TaskId};
    pub use crate::components::task::{ScheduledTask, TaskHandle};
    pub use crate::config::SchedulerConfig;
    pub use crate::dispatch::RunOutcome;
    pub use crate::error::SchedulerError;
    pub use crate::events::{
        EventBus, OnResolved, PurgeReason, SchedulerEvent, TaskScheduledEvent,
    };
    pub use crate::lifecycle::{EventEmitter, LifecycleObject, ManagedOwner};
    pub use crate::scheduler::TaskScheduler;
    pub use crate::time::{Clock, ManualClock, UtcClock};
}
