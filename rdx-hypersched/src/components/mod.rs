//! Contains the building blocks the scheduler is assembled from.
//!
//! This module provides the task record (the state and timing of a single
//! unit of work) and the task set (the shared arena admitted tasks live in).
//! The `TaskScheduler` owns one task set and hands out task handles.

pub mod task;
pub(crate) mod store;
