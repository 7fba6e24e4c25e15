//! The scheduler that admits tasks and hands them to the drivers.

use crate::common::{lock, read, write, ExecutionTarget, TaskId};
use crate::components::store::TaskSet;
use crate::components::task::{ScheduledTask, TaskAction, TaskHandle};
use crate::config::SchedulerConfig;
use crate::dispatch::RunOutcome;
use crate::driver::{self, DriverHandle};
use crate::error::{Result, SchedulerError};
use crate::events::{EventBus, SchedulerEvent, TaskScheduledEvent};
use crate::lifecycle::LifecycleObject;
use crate::time::{Clock, UtcClock};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, Notify};
use tracing::{debug, info, warn};

/// Runs once a task's gate has resolved, with the event if one was emitted.
pub(crate) type GateCompletion = Box<dyn FnOnce(&TaskHandle, Option<&TaskScheduledEvent>) + Send>;

/// State shared by the scheduler handle, the background driver and the
/// gate continuations handed to event buses.
pub(crate) struct SchedulerCore {
    pub(crate) config: SchedulerConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) tasks: TaskSet,
    pub(crate) wake: Notify,
    events: broadcast::Sender<SchedulerEvent>,
    event_bus: RwLock<Option<Arc<dyn EventBus>>>,
    next_id: AtomicU64,
}

// Core implementation block for admission and gating.
impl SchedulerCore {
    fn new(config: SchedulerConfig, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            config,
            clock,
            tasks: TaskSet::default(),
            wake: Notify::new(),
            events,
            event_bus: RwLock::new(None),
            next_id: AtomicU64::new(0),
        }
    }

    pub(crate) fn publish(&self, event: SchedulerEvent) {
        self.events.send(event).ok();
    }

    fn next_task_id(&self) -> TaskId {
        TaskId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn create_task<O: LifecycleObject + 'static>(
        &self,
        owner: &Arc<O>,
        name: String,
        target: ExecutionTarget,
        action: TaskAction,
    ) -> Option<ScheduledTask> {
        if !owner.is_alive() {
            warn!("Refusing task '{}': owner is not alive.", name);
            return None;
        }
        let weak: Weak<dyn LifecycleObject> = Arc::downgrade(owner) as Weak<dyn LifecycleObject>;
        Some(ScheduledTask::new(self.next_task_id(), name, weak, target, action))
    }

    /// Passes a freshly created task through the admission gate.
    ///
    /// Never blocks: when an event bus is involved the task is admitted (or
    /// not) whenever the bus resolves the event.
    pub(crate) fn trigger_gate(
        self: &Arc<Self>,
        task: &TaskHandle,
        owner: &dyn LifecycleObject,
        on_complete: Option<GateCompletion>,
    ) {
        self.wake.notify_one();

        if !task.enter_gate() {
            warn!("Task {} '{}' already passed the gate.", task.id(), task.name());
            return;
        }

        let bus = read(&self.event_bus).clone();
        match (owner.as_event_emitter(), bus) {
            (Some(emitter), Some(bus)) => {
                debug!(
                    "Routing task {} '{}' through the event bus for '{}'.",
                    task.id(),
                    task.name(),
                    emitter.emitter_name()
                );
                let core = Arc::clone(self);
                let event = TaskScheduledEvent::new(Arc::clone(task));
                bus.emit(
                    emitter,
                    event,
                    Box::new(move |event| core.resolve_gate(event, on_complete)),
                );
            }
            _ => {
                self.admit(task);
                if let Some(on_complete) = on_complete {
                    on_complete(task, None);
                }
            }
        }
    }

    fn resolve_gate(&self, event: TaskScheduledEvent, on_complete: Option<GateCompletion>) {
        let task = Arc::clone(event.task());
        if event.is_cancelled() {
            task.mark_cancelled();
            warn!("Task {} '{}' was vetoed by its gating event.", task.id(), task.name());
            self.publish(SchedulerEvent::TaskRejected { id: task.id() });
        } else {
            self.admit(&task);
        }
        if let Some(on_complete) = on_complete {
            on_complete(&task, Some(&event));
        }
    }

    fn admit(&self, task: &TaskHandle) {
        self.tasks.insert(task);
        debug!("Admitted task {} '{}' ({}).", task.id(), task.name(), task.target());
        self.publish(SchedulerEvent::TaskAdmitted { id: task.id() });
    }
}

/// A multi-target task scheduler.
///
/// The scheduler admits tasks on behalf of owner objects, gates each
/// admission behind a cancellable `TaskScheduledEvent`, and runs admitted
/// tasks when a driver for their `ExecutionTarget` asks it to. Background
/// targets are driven by a tokio task started with `start`; every other
/// target is driven by the host calling `run_pending` from its own loop.
///
/// The handle is cheap to clone and every clone addresses the same scheduler.
#[derive(Clone)]
pub struct TaskScheduler {
    core: Arc<SchedulerCore>,
    driver: Arc<Mutex<Option<DriverHandle>>>,
}

impl TaskScheduler {
    /// Creates a scheduler on the wall clock. The background driver is not
    /// running until `start` is called.
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_clock(config, Arc::new(UtcClock))
    }

    /// Creates a scheduler whose timing decisions read `clock`.
    pub fn with_clock(config: SchedulerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            core: Arc::new(SchedulerCore::new(config, clock)),
            driver: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates a scheduler and starts its background driver on the current
    /// tokio runtime.
    pub fn launch(config: SchedulerConfig) -> Result<Self> {
        let scheduler = Self::new(config);
        scheduler.start()?;
        Ok(scheduler)
    }

    /// Spawns the background driver on the current tokio runtime.
    pub fn start(&self) -> Result<()> {
        let runtime = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;
        let mut slot = lock(&self.driver);
        if slot.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }
        *slot = Some(driver::spawn(Arc::clone(&self.core), &runtime));
        Ok(())
    }

    /// Stops the background driver and detaches every stored task.
    ///
    /// A scan already in progress is allowed to finish. Admissions still
    /// waiting on their gating event resolve as usual.
    pub async fn shutdown(&self) {
        let handle = lock(&self.driver).take();
        if let Some(handle) = handle {
            info!("Shutting down the background driver...");
            handle.stop().await;
        }
        self.core.tasks.invalidate_all();
    }

    pub fn is_running(&self) -> bool {
        lock(&self.driver).is_some()
    }
}

// Public scheduling API.
impl TaskScheduler {
    /// Schedules `action` to run once on the next pulse of `target`.
    ///
    /// A `Sync` update runs inline as soon as its gate opens; other targets
    /// wait for their driver. Returns `None` if `owner` is not alive.
    pub fn schedule_update<O, F>(
        &self,
        owner: &Arc<O>,
        name: impl Into<String>,
        target: ExecutionTarget,
        action: F,
    ) -> Option<TaskHandle>
    where
        O: LifecycleObject + 'static,
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let task = Arc::new(
            self.core
                .create_task(owner, name.into(), target, Box::new(action))?,
        );
        let core = Arc::clone(&self.core);
        let on_complete: GateCompletion = Box::new(move |task, _event| {
            if task.target() == ExecutionTarget::Sync && !task.is_cancelled() {
                core.run_task(task);
            }
        });
        self.core.trigger_gate(&task, &**owner, Some(on_complete));
        Some(task)
    }

    /// Schedules `action` to run once, no earlier than `when`.
    ///
    /// Returns `None` if `owner` is not alive.
    pub fn schedule_at<O, F>(
        &self,
        owner: &Arc<O>,
        name: impl Into<String>,
        when: DateTime<Utc>,
        run_async: bool,
        action: F,
    ) -> Option<TaskHandle>
    where
        O: LifecycleObject + 'static,
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let target = ExecutionTarget::from_async_flag(run_async);
        let task = Arc::new(
            self.core
                .create_task(owner, name.into(), target, Box::new(action))?
                .with_start_time(when),
        );
        self.core.trigger_gate(&task, &**owner, None);
        Some(task)
    }

    /// Schedules `action` to run every `period`, first after `delay` if given.
    ///
    /// Returns `Ok(None)` if `owner` is not alive.
    pub fn schedule_periodically<O, F>(
        &self,
        owner: &Arc<O>,
        name: impl Into<String>,
        period: Duration,
        delay: Option<Duration>,
        run_async: bool,
        action: F,
    ) -> Result<Option<TaskHandle>>
    where
        O: LifecycleObject + 'static,
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let start_time = match delay {
            Some(delay) => Some(self.delay_from_now(delay)?),
            None => None,
        };
        let target = ExecutionTarget::from_async_flag(run_async);
        let Some(mut task) = self
            .core
            .create_task(owner, name.into(), target, Box::new(action))
        else {
            return Ok(None);
        };
        task = task.with_period(period);
        if let Some(start_time) = start_time {
            task = task.with_start_time(start_time);
        }
        let task = Arc::new(task);
        self.core.trigger_gate(&task, &**owner, None);
        Ok(Some(task))
    }

    /// Requests cancellation of `task`.
    ///
    /// Returns `false` if the task already finished or was already cancelled.
    /// The task stays in storage until the next dispatch pass purges it.
    pub fn cancel_task(&self, task: &ScheduledTask) -> bool {
        let cancelled = task.mark_cancelled();
        if cancelled {
            debug!("Cancelled task {} '{}'.", task.id(), task.name());
        }
        cancelled
    }

    /// Runs the dispatch engine once for `task`, whatever its target.
    pub fn run_task(&self, task: &TaskHandle) -> RunOutcome {
        self.core.run_task(task)
    }

    /// Dispatches every stored task whose target is `target`.
    ///
    /// Hosts call this once per pulse: `Sync` from the main-thread tick,
    /// `NextFrame` from the frame callback and `NextPhysicsUpdate` from the
    /// physics step. Returns the number of tasks whose action ran.
    pub fn run_pending(&self, target: ExecutionTarget) -> usize {
        self.core.run_pending(target)
    }

    /// The live view: admitted tasks that are reference-alive, owner-alive
    /// and neither cancelled nor finished.
    pub fn tasks(&self) -> Vec<TaskHandle> {
        self.core.tasks.live()
    }

    /// The live view restricted to `target`.
    pub fn tasks_for(&self, target: ExecutionTarget) -> Vec<TaskHandle> {
        self.core
            .tasks
            .snapshot_where(|task| task.target() == target && task.is_live())
    }

    /// Number of tasks in raw storage, including ones awaiting a purge.
    pub fn stored_len(&self) -> usize {
        self.core.tasks.len()
    }

    /// Whether `task` is currently held in storage.
    pub fn contains(&self, task: &ScheduledTask) -> bool {
        self.core.tasks.contains(task)
    }

    /// Registers the bus used to route gating events. Resolved per admission.
    pub fn set_event_bus(&self, bus: Arc<dyn EventBus>) {
        *write(&self.core.event_bus) = Some(bus);
    }

    pub fn clear_event_bus(&self) {
        *write(&self.core.event_bus) = None;
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.core.events.subscribe()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.core.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.core.clock.now()
    }

    fn delay_from_now(&self, delay: Duration) -> Result<DateTime<Utc>> {
        chrono::Duration::from_std(delay)
            .ok()
            .and_then(|delta| self.now().checked_add_signed(delta))
            .ok_or(SchedulerError::DelayOutOfRange(delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PurgeReason;
    use crate::lifecycle::{EventEmitter, ManagedOwner};
    use crate::time::ManualClock;
    use std::sync::atomic::AtomicUsize;

    struct VetoBus;

    impl EventBus for VetoBus {
        fn emit(&self, _source: &dyn EventEmitter, mut event: TaskScheduledEvent, on_resolved: crate::events::OnResolved) {
            event.cancel();
            on_resolved(event);
        }
    }

    /// Holds events until the test resolves them.
    #[derive(Default)]
    struct HeldBus {
        held: Mutex<Vec<(TaskScheduledEvent, crate::events::OnResolved)>>,
    }

    impl HeldBus {
        fn resolve_all(&self, cancel: bool) {
            let held: Vec<_> = lock(&self.held).drain(..).collect();
            for (mut event, on_resolved) in held {
                event.set_cancelled(cancel);
                on_resolved(event);
            }
        }
    }

    impl EventBus for HeldBus {
        fn emit(&self, _source: &dyn EventEmitter, event: TaskScheduledEvent, on_resolved: crate::events::OnResolved) {
            lock(&self.held).push((event, on_resolved));
        }
    }

    fn scheduler() -> (TaskScheduler, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        (
            TaskScheduler::with_clock(SchedulerConfig::default(), clock.clone()),
            clock,
        )
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() -> anyhow::Result<()> + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn dead_owner_is_rejected_without_consuming_an_id() {
        let (scheduler, _clock) = scheduler();
        let owner = Arc::new(ManagedOwner::new("owner"));
        owner.kill();

        assert!(scheduler
            .schedule_at(&owner, "never", scheduler.now(), false, || Ok(()))
            .is_none());
        assert!(scheduler
            .schedule_update(&owner, "never", ExecutionTarget::Sync, || Ok(()))
            .is_none());
        assert!(scheduler
            .schedule_periodically(&owner, "never", Duration::from_secs(1), None, true, || Ok(()))
            .unwrap()
            .is_none());
        assert_eq!(scheduler.stored_len(), 0);

        owner.revive();
        let task = scheduler
            .schedule_at(&owner, "first", scheduler.now(), false, || Ok(()))
            .unwrap();
        assert_eq!(task.id(), TaskId(1));
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            lock(&*self.0).extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&lock(&*self.0)).into_owned()
        }
    }

    #[test]
    fn rejected_admissions_are_logged_as_warnings() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let (scheduler, _clock) = scheduler();
            let dead = Arc::new(ManagedOwner::new("dead"));
            dead.kill();
            assert!(scheduler
                .schedule_at(&dead, "refused", scheduler.now(), false, || Ok(()))
                .is_none());

            scheduler.set_event_bus(Arc::new(VetoBus));
            let owner = Arc::new(ManagedOwner::new("owner"));
            scheduler
                .schedule_at(&owner, "vetoed", scheduler.now(), false, || Ok(()))
                .unwrap();
        });

        let text = logs.text();
        assert!(text.contains("WARN"), "{text}");
        assert!(text.contains("Refusing task 'refused'"), "{text}");
        assert!(text.contains("was vetoed by its gating event"), "{text}");
    }

    #[test]
    fn ids_increase_monotonically() {
        let (scheduler, _clock) = scheduler();
        let owner = Arc::new(ManagedOwner::new("owner"));
        let ids: Vec<TaskId> = (0..5)
            .map(|i| {
                scheduler
                    .schedule_at(&owner, format!("t{i}"), scheduler.now(), i % 2 == 0, || Ok(()))
                    .unwrap()
                    .id()
            })
            .collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn timed_calls_pick_target_from_async_flag() {
        let (scheduler, _clock) = scheduler();
        let owner = Arc::new(ManagedOwner::new("owner"));
        let sync = scheduler
            .schedule_at(&owner, "sync", scheduler.now(), false, || Ok(()))
            .unwrap();
        let background = scheduler
            .schedule_periodically(&owner, "bg", Duration::from_millis(10), None, true, || Ok(()))
            .unwrap()
            .unwrap();
        assert_eq!(sync.target(), ExecutionTarget::Sync);
        assert_eq!(background.target(), ExecutionTarget::Async);
        assert_eq!(background.period(), Some(Duration::from_millis(10)));
        assert_eq!(background.start_time(), None);
    }

    #[test]
    fn periodic_delay_sets_start_time() {
        let (scheduler, _clock) = scheduler();
        let owner = Arc::new(ManagedOwner::new("owner"));
        let task = scheduler
            .schedule_periodically(
                &owner,
                "delayed",
                Duration::from_secs(1),
                Some(Duration::from_secs(5)),
                false,
                || Ok(()),
            )
            .unwrap()
            .unwrap();
        assert_eq!(
            task.start_time(),
            Some(scheduler.now() + chrono::Duration::seconds(5))
        );
    }

    #[test]
    fn unrepresentable_delay_is_an_error() {
        let (scheduler, _clock) = scheduler();
        let owner = Arc::new(ManagedOwner::new("owner"));
        let result = scheduler.schedule_periodically(
            &owner,
            "forever",
            Duration::from_secs(1),
            Some(Duration::MAX),
            false,
            || Ok(()),
        );
        assert!(matches!(result, Err(SchedulerError::DelayOutOfRange(_))));
        assert_eq!(scheduler.stored_len(), 0);
    }

    #[test]
    fn without_a_bus_tasks_are_admitted_immediately() {
        let (scheduler, _clock) = scheduler();
        let owner = Arc::new(ManagedOwner::new("owner"));
        let task = scheduler
            .schedule_at(&owner, "now", scheduler.now(), false, || Ok(()))
            .unwrap();
        assert!(scheduler.contains(&task));
        assert_eq!(scheduler.tasks().len(), 1);
    }

    #[test]
    fn owners_without_emitter_skip_the_bus() {
        let (scheduler, _clock) = scheduler();
        scheduler.set_event_bus(Arc::new(VetoBus));
        let owner = Arc::new(ManagedOwner::silent("quiet"));
        let task = scheduler
            .schedule_at(&owner, "now", scheduler.now(), false, || Ok(()))
            .unwrap();
        assert!(scheduler.contains(&task));
        assert!(!task.is_cancelled());
    }

    #[test]
    fn vetoed_tasks_are_never_admitted() {
        let (scheduler, _clock) = scheduler();
        scheduler.set_event_bus(Arc::new(VetoBus));
        let owner = Arc::new(ManagedOwner::new("owner"));
        let (count, action) = counter();
        let task = scheduler
            .schedule_update(&owner, "vetoed", ExecutionTarget::Sync, action)
            .unwrap();
        assert!(task.is_cancelled());
        assert!(!scheduler.contains(&task));
        assert_eq!(scheduler.run_pending(ExecutionTarget::Sync), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn admission_waits_for_the_bus_to_resolve() {
        let (scheduler, _clock) = scheduler();
        let bus = Arc::new(HeldBus::default());
        scheduler.set_event_bus(bus.clone());
        let owner = Arc::new(ManagedOwner::new("owner"));

        let task = scheduler
            .schedule_at(&owner, "held", scheduler.now(), false, || Ok(()))
            .unwrap();
        assert!(!scheduler.contains(&task));
        assert!(scheduler.tasks().is_empty());

        bus.resolve_all(false);
        assert!(scheduler.contains(&task));
        assert!(!task.is_cancelled());
    }

    #[test]
    fn sync_update_runs_inline_when_the_gate_opens() {
        let (scheduler, _clock) = scheduler();
        let bus = Arc::new(HeldBus::default());
        scheduler.set_event_bus(bus.clone());
        let owner = Arc::new(ManagedOwner::new("owner"));
        let (count, action) = counter();

        let task = scheduler
            .schedule_update(&owner, "inline", ExecutionTarget::Sync, action)
            .unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        bus.resolve_all(false);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(task.is_finished());
        assert!(!scheduler.contains(&task));
    }

    #[test]
    fn frame_update_waits_for_its_pulse() {
        let (scheduler, _clock) = scheduler();
        let owner = Arc::new(ManagedOwner::new("owner"));
        let (count, action) = counter();

        let task = scheduler
            .schedule_update(&owner, "frame", ExecutionTarget::NextFrame, action)
            .unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.run_pending(ExecutionTarget::NextPhysicsUpdate), 0);
        assert_eq!(scheduler.run_pending(ExecutionTarget::NextFrame), 1);
        assert_eq!(scheduler.run_pending(ExecutionTarget::NextFrame), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!scheduler.contains(&task));
    }

    #[test]
    fn cancel_twice_reports_failure_the_second_time() {
        let (scheduler, _clock) = scheduler();
        let owner = Arc::new(ManagedOwner::new("owner"));
        let task = scheduler
            .schedule_at(&owner, "cancel", scheduler.now(), false, || Ok(()))
            .unwrap();
        assert!(scheduler.cancel_task(&task));
        assert!(!scheduler.cancel_task(&task));

        // Still stored, but already out of the live view.
        assert!(scheduler.contains(&task));
        assert!(scheduler.tasks().is_empty());

        assert_eq!(
            scheduler.run_task(&task),
            RunOutcome::Purged(PurgeReason::Cancelled)
        );
        assert!(!scheduler.contains(&task));
    }

    #[test]
    fn admissions_are_published() {
        let (scheduler, _clock) = scheduler();
        let mut events = scheduler.subscribe_events();
        let owner = Arc::new(ManagedOwner::new("owner"));
        let task = scheduler
            .schedule_at(&owner, "observed", scheduler.now(), false, || Ok(()))
            .unwrap();
        match events.try_recv().unwrap() {
            SchedulerEvent::TaskAdmitted { id } => assert_eq!(id, task.id()),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn start_outside_a_runtime_fails() {
        let (scheduler, _clock) = scheduler();
        assert!(matches!(scheduler.start(), Err(SchedulerError::NoRuntime)));
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn start_twice_is_refused_and_shutdown_detaches_tasks() {
        let (scheduler, _clock) = scheduler();
        scheduler.start().unwrap();
        assert!(scheduler.is_running());
        assert!(matches!(scheduler.start(), Err(SchedulerError::AlreadyRunning)));

        let owner = Arc::new(ManagedOwner::new("owner"));
        let task = scheduler
            .schedule_at(&owner, "late", scheduler.now() + chrono::Duration::hours(1), false, || Ok(()))
            .unwrap();

        scheduler.shutdown().await;
        assert!(!scheduler.is_running());
        assert!(!task.is_reference_alive());
        assert!(scheduler.tasks().is_empty());
        assert_eq!(
            scheduler.run_task(&task),
            RunOutcome::Purged(PurgeReason::ReferenceDead)
        );
    }
}
