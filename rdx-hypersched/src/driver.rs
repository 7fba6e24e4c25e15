//! The background driver: the scheduler's own execution context for
//! background targets.

use crate::events::SchedulerEvent;
use crate::scheduler::SchedulerCore;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace};

/// Controls a running background driver.
pub(crate) struct DriverHandle {
    shutdown_tx: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

impl DriverHandle {
    /// Signals the loop to stop and waits for the current scan to finish.
    pub(crate) async fn stop(self) {
        if self.shutdown_tx.send(()).is_err() {
            trace!("Background driver had already exited.");
        }
        if let Err(e) = self.join.await {
            error!("Background driver terminated abnormally: {}", e);
        }
    }
}

pub(crate) fn spawn(core: Arc<SchedulerCore>, runtime: &Handle) -> DriverHandle {
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let join = runtime.spawn(driver_loop(core, shutdown_rx));
    DriverHandle { shutdown_tx, join }
}

/// Waits for a wake signal or the poll interval, then dispatches every
/// background task on tokio's blocking pool. Exits when the shutdown channel
/// fires or closes; a pass already in flight is awaited first.
async fn driver_loop(core: Arc<SchedulerCore>, mut shutdown_rx: broadcast::Receiver<()>) {
    let poll_interval = core.config.poll_interval();
    info!(
        "Background driver started, polling every {:?} for {:?}.",
        poll_interval, core.config.background_targets
    );
    core.publish(SchedulerEvent::DriverStarted {
        timestamp: core.clock.now(),
    });

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => break,
            _ = core.wake.notified() => trace!("Background driver woken by a new task."),
            _ = tokio::time::sleep(poll_interval) => {}
        }
        // Actions are plain blocking closures; keep them off the runtime's workers.
        let pass_core = Arc::clone(&core);
        match task::spawn_blocking(move || pass_core.run_background_pass()).await {
            Ok(0) => {}
            Ok(ran) => trace!("Background pass ran {} task(s).", ran),
            Err(e) => error!("Background pass terminated abnormally: {}", e),
        }
    }

    core.publish(SchedulerEvent::DriverStopped);
    info!("Background driver has stopped.");
}
