use anyhow::Result;
use colored::Colorize;
use hypersched::prelude::*;
use hypersched::{SCHEDULER_NAME, VERSION};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Approximate pulse rates of the simulated host.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const PHYSICS_INTERVAL: Duration = Duration::from_millis(20);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // 2. Load the configuration, optionally from the path given as first argument.
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = SchedulerConfig::load(config_path.as_deref())?;

    // 3. Create the scheduler and start its background driver.
    let scheduler = TaskScheduler::launch(config)?;
    info!("{} v{} is up.", SCHEDULER_NAME.cyan(), VERSION);

    // 4. Follow what the scheduler does.
    spawn_event_listener(&scheduler);

    // 5. Register a few demo tasks.
    let owner = Arc::new(ManagedOwner::new("schedev"));
    register_demo_tasks(&scheduler, &owner)?;

    // 6. Drive the host pulses until Ctrl+C.
    run_host_loop(&scheduler).await?;

    scheduler.shutdown().await;
    info!("{} has shut down.", SCHEDULER_NAME);
    Ok(())
}

fn spawn_event_listener(scheduler: &TaskScheduler) {
    let mut events = scheduler.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!("{} {:?}", "[SCHEDULER]".dimmed(), event);
        }
    });
}

fn register_demo_tasks(scheduler: &TaskScheduler, owner: &Arc<ManagedOwner>) -> Result<()> {
    let heartbeats = Arc::new(AtomicU32::new(0));

    let counter = heartbeats.clone();
    scheduler.schedule_periodically(owner, "heartbeat", Duration::from_secs(1), None, true, move || {
        let beat = counter.fetch_add(1, Ordering::Relaxed) + 1;
        info!("{} beat #{}", "[ASYNC]".green(), beat);
        Ok(())
    })?;

    scheduler.schedule_periodically(
        owner,
        "autosave",
        Duration::from_secs(5),
        Some(Duration::from_secs(2)),
        false,
        || {
            info!("{} autosaving...", "[SYNC]".yellow());
            Ok(())
        },
    )?;

    scheduler.schedule_at(owner, "greeting", scheduler.now() + chrono::Duration::seconds(3), false, || {
        info!("{} three seconds in.", "[SYNC]".yellow());
        Ok(())
    });

    scheduler.schedule_update(owner, "first-frame", ExecutionTarget::NextFrame, || {
        info!("{} first frame rendered.", "[FRAME]".magenta());
        Ok(())
    });

    scheduler.schedule_update(owner, "first-step", ExecutionTarget::NextPhysicsUpdate, || {
        info!("{} first physics step.", "[PHYSICS]".blue());
        Ok(())
    });

    let checks = heartbeats;
    scheduler.schedule_periodically(owner, "watchdog", Duration::from_secs(4), None, false, move || {
        if checks.load(Ordering::Relaxed) == 0 {
            anyhow::bail!("no heartbeat observed yet");
        }
        Ok(())
    })?;

    Ok(())
}

async fn run_host_loop(scheduler: &TaskScheduler) -> Result<()> {
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    let mut physics = tokio::time::interval(PHYSICS_INTERVAL);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("Host loop running. Press Ctrl+C to shut down.");
    loop {
        tokio::select! {
            biased;
            result = &mut shutdown => {
                result?;
                info!("Shutdown signal received.");
                return Ok(());
            }
            _ = frames.tick() => {
                scheduler.run_pending(ExecutionTarget::Sync);
                scheduler.run_pending(ExecutionTarget::NextFrame);
            }
            _ = physics.tick() => {
                scheduler.run_pending(ExecutionTarget::NextPhysicsUpdate);
            }
        }
    }
}
