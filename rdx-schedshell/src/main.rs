use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use hypersched::prelude::*;
use hypersched::{SCHEDULER_NAME, VERSION as LIB_VERSION};
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A custom helper struct for rustyline that enables syntax highlighting.
#[derive(Completer, Helper, Hinter, Validator)]
struct CommandHighlighter;

impl Highlighter for CommandHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            Cow::Owned(format!("{} {}", command.yellow().bold(), rest.yellow()))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

/// An event bus whose verdict is flipped from the shell with `veto on|off`.
struct ShellBus {
    veto: AtomicBool,
}

impl EventBus for ShellBus {
    fn emit(&self, source: &dyn EventEmitter, mut event: TaskScheduledEvent, on_resolved: OnResolved) {
        if self.veto.load(Ordering::Relaxed) {
            println!(
                "<-- [VETO] '{}' from {} was refused.",
                event.task().name(),
                source.emitter_name()
            );
            event.cancel();
        }
        // Resolve off the shell thread, as a real bus would.
        tokio::spawn(async move { on_resolved(event) });
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    let rule = "-".repeat(72);
    println!("{}", rule.dimmed());
    println!(
        "  {}   Shell v{:<8} Library v{:<8}",
        SCHEDULER_NAME.cyan().bold(),
        SHELL_VERSION,
        LIB_VERSION
    );
    println!(
        "{}",
        "  Distributed under the MIT OR Apache-2.0 license. Use at your own risk.".dimmed()
    );
    println!("{}", rule.dimmed());
}

fn spawn_event_listener(scheduler: &TaskScheduler) {
    let mut events = scheduler.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SchedulerEvent::TaskRan { id, failed: true } => {
                    println!("<-- {} task {} failed", "[RUN]".red(), id)
                }
                SchedulerEvent::TaskRejected { id } => {
                    println!("<-- {} task {} was not admitted", "[GATE]".red(), id)
                }
                SchedulerEvent::TaskPurged { id, reason } => {
                    println!("<-- {} task {} ({:?})", "[PURGE]".dimmed(), id, reason)
                }
                _ => {}
            }
        }
    });
}

fn announce(label: &'static str) -> impl FnMut() -> Result<()> + Send + 'static {
    let mut runs = 0u32;
    move || {
        runs += 1;
        println!("<-- {} '{}' ran (#{})", "[TASK]".green(), label, runs);
        Ok(())
    }
}

fn parse_ms(arg: Option<&&str>) -> Option<Duration> {
    arg.and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

/// `now + delay`, or `None` when the instant is not representable.
fn after(now: DateTime<Utc>, delay: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(delay)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
}

fn print_help() {
    println!("Available commands:");
    println!("  at <MS> [async]       - Runs a one-shot task MS milliseconds from now.");
    println!("  every <MS> [async]    - Runs a periodic task every MS milliseconds.");
    println!("  update <TARGET>       - Runs a task once on the next TARGET pulse.");
    println!("  pulse <TARGET>        - Fires one host pulse (sync, next_frame, ...).");
    println!("  cancel <ID>           - Cancels a task by id.");
    println!("  list                  - Shows the live tasks.");
    println!("  kill | revive         - Toggles the shell owner's liveness.");
    println!("  veto on|off           - Makes the event bus refuse new tasks.");
    println!("  exit                  - Quits the shell.");
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let scheduler = TaskScheduler::launch(SchedulerConfig::load(None)?)?;
    let bus = Arc::new(ShellBus {
        veto: AtomicBool::new(false),
    });
    scheduler.set_event_bus(bus.clone());
    spawn_event_listener(&scheduler);
    info!("{} started.", SCHEDULER_NAME);

    let owner = Arc::new(ManagedOwner::new("shell"));
    let mut handles: BTreeMap<u64, TaskHandle> = BTreeMap::new();

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CommandHighlighter));

    println!("{} is running. Type 'help' for commands or 'exit' to quit.", SCHEDULER_NAME.cyan());

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(_) => {
                println!("Exiting schedshell...");
                break;
            }
        };
        rl.add_history_entry(line.as_str())?;
        let args = line.split_whitespace().collect::<Vec<_>>();
        let Some(command) = args.first() else {
            continue;
        };
        let run_async = args.get(2) == Some(&"async");

        match *command {
            "at" => match parse_ms(args.get(1)) {
                Some(delay) => match after(scheduler.now(), delay) {
                    Some(when) => match scheduler.schedule_at(&owner, "at", when, run_async, announce("at")) {
                        Some(task) => {
                            println!("--> Scheduled task {} in {:?}.", task.id(), delay);
                            handles.insert(task.id().0, task);
                        }
                        None => println!("--> Owner is dead; nothing scheduled."),
                    },
                    None => println!("Error: {:?} from now is out of range.", delay),
                },
                None => println!("Usage: at <MS> [async]"),
            },
            "every" => match parse_ms(args.get(1)) {
                Some(period) => {
                    match scheduler.schedule_periodically(&owner, "every", period, None, run_async, announce("every")) {
                        Ok(Some(task)) => {
                            println!("--> Scheduled task {} every {:?}.", task.id(), period);
                            handles.insert(task.id().0, task);
                        }
                        Ok(None) => println!("--> Owner is dead; nothing scheduled."),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                None => println!("Usage: every <MS> [async]"),
            },
            "update" => match args.get(1).map(|s| s.parse::<ExecutionTarget>()) {
                Some(Ok(target)) => {
                    match scheduler.schedule_update(&owner, "update", target, announce("update")) {
                        Some(task) => {
                            println!("--> Scheduled task {} for the next {} pulse.", task.id(), target);
                            handles.insert(task.id().0, task);
                        }
                        None => println!("--> Owner is dead; nothing scheduled."),
                    }
                }
                Some(Err(e)) => println!("Error: {}", e),
                None => println!("Usage: update <TARGET>"),
            },
            "pulse" => match args.get(1).map(|s| s.parse::<ExecutionTarget>()) {
                Some(Ok(target)) => {
                    let ran = scheduler.run_pending(target);
                    println!("--> {} pulse ran {} task(s).", target, ran);
                }
                Some(Err(e)) => println!("Error: {}", e),
                None => println!("Usage: pulse <TARGET>"),
            },
            "cancel" => match args.get(1).and_then(|s| s.parse::<u64>().ok()) {
                Some(id) => match handles.get(&id) {
                    Some(task) if scheduler.cancel_task(task) => println!("--> Task #{} cancelled.", id),
                    Some(_) => println!("--> Task #{} already finished or cancelled.", id),
                    None => println!("Error: Unknown task #{}. Use 'list' to see live tasks.", id),
                },
                None => println!("Usage: cancel <ID>"),
            },
            "list" => {
                handles.retain(|_, task| scheduler.contains(task));
                let live = scheduler.tasks();
                println!("Live tasks ({} stored):", scheduler.stored_len());
                for task in &live {
                    println!(
                        "  {} {:<8} {:<20} period={:?} last_run={:?}",
                        task.id(),
                        task.name(),
                        task.target(),
                        task.period(),
                        task.last_run_time()
                    );
                }
            }
            "kill" => {
                owner.kill();
                println!("--> Owner '{}' is now dead.", owner.name());
            }
            "revive" => {
                owner.revive();
                println!("--> Owner '{}' is alive again.", owner.name());
            }
            "veto" => match args.get(1) {
                Some(&"on") => {
                    bus.veto.store(true, Ordering::Relaxed);
                    println!("--> New tasks will be vetoed.");
                }
                Some(&"off") => {
                    bus.veto.store(false, Ordering::Relaxed);
                    println!("--> New tasks will be admitted.");
                }
                _ => println!("Usage: veto on|off"),
            },
            "help" => print_help(),
            "exit" => break,
            _ => println!("Unknown command: '{}'. Type 'help'.", line),
        }
    }

    scheduler.shutdown().await;
    Ok(())
}
