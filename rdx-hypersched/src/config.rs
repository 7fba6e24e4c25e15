//! Defines the configuration structure for the scheduler.
//!
//! The struct is designed to be deserialized with `serde`, so hosts can keep
//! scheduler tuning in a TOML file and override it through `HYPERSCHED_*`
//! environment variables.

use crate::common::ExecutionTarget;
use crate::error::Result;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// The top-level configuration for a `TaskScheduler`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Longest the background driver sleeps between scans when no new task
    /// wakes it, in milliseconds.
    pub poll_interval_ms: u64,

    /// Capacity of the `SchedulerEvent` broadcast channel.
    pub event_capacity: usize,

    /// Execution targets the background driver is responsible for.
    pub background_targets: Vec<ExecutionTarget>,
}

impl SchedulerConfig {
    /// Loads the configuration from an optional TOML file layered under
    /// `HYPERSCHED_*` environment variables.
    ///
    /// Missing keys fall back to their defaults. A list of background targets
    /// is given in the environment as a comma separated string, e.g.
    /// `HYPERSCHED_BACKGROUND_TARGETS=async,next_async_frame`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix("HYPERSCHED")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("background_targets"),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Whether tasks with `target` are run by the background driver.
    pub fn runs_in_background(&self, target: ExecutionTarget) -> bool {
        self.background_targets.contains(&target)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
            event_capacity: 256,
            background_targets: vec![ExecutionTarget::Async, ExecutionTarget::NextAsyncFrame],
        }
    }
}
