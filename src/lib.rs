// src/lib.rs

//! showrunner: a single-threaded, priority-ordered cooperative task queue
//! for client-side presentation work, plus a scenario-driven demo driver.
//!
//! The core (priority, task, queue) is synchronous and `Rc`-based; the
//! engine module wraps it in an async shell that feeds it ticks, timers,
//! simulated load completions, and scripted external happenings.

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod host;
pub mod logging;
pub mod priority;
pub mod queue;
pub mod task;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ScenarioFile, ScriptAction, TaskKind, TaskSpec};
use crate::engine::{Driver, DriverEvent, DriverOptions};
use crate::host::{
    Affordance, ContentLoader, EventBus, PresentationHost, SimLoader, TimerService, TokioTimers,
    TracingPresenter, TransitionLock,
};
use crate::priority::Priority;
use crate::queue::Queue;
use crate::task::{CallbackTask, EventWaitTask, ModalTask, Package, PreloadTask, Task};

/// Channel depth for driver events. Producers are tickers, timers, and the
/// script; none of them burst, so a small buffer suffices.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Load the scenario, wire up the hosts, and run the driver to completion.
pub async fn run(args: CliArgs) -> Result<()> {
    let scenario = config::load_and_validate(Path::new(&args.config))?;

    if args.dry_run {
        print_dry_run(&args.config, &scenario);
        return Ok(());
    }

    let (events_tx, events_rx) = mpsc::channel::<DriverEvent>(EVENT_CHANNEL_CAPACITY);

    // Host objects shared by every task.
    let lock = TransitionLock::new();
    let bus = EventBus::new();
    let timers: Rc<TokioTimers> = Rc::new(TokioTimers::new(events_tx.clone()));
    let loader: Rc<SimLoader> = Rc::new(SimLoader::new(
        Duration::from_millis(scenario.loader.latency_ms),
        scenario.loader.cached.iter().cloned(),
        scenario.loader.failing.iter().cloned(),
        events_tx.clone(),
    ));
    let presenter: Rc<TracingPresenter> = Rc::new(TracingPresenter::new());
    let queue = Queue::with_policy(scenario.queue.tick_policy);

    // One affordance per preload task, active until the script says otherwise.
    let affordances: HashMap<String, Affordance> = scenario
        .task
        .iter()
        .filter(|(_, spec)| spec.kind == TaskKind::Preload)
        .map(|(name, spec)| {
            let affordance = spec.affordance_name(name);
            (affordance.clone(), Affordance::new(affordance, true))
        })
        .collect();

    let builder = TaskBuilder {
        scenario: &scenario,
        lock: &lock,
        bus: &bus,
        timers: &timers,
        loader: &loader,
        presenter: &presenter,
        affordances: &affordances,
        queue: &queue,
        packages: RefCell::new(HashMap::new()),
    };

    let mut built: HashMap<String, Rc<dyn Task>> = HashMap::new();
    for name in scenario.task.keys() {
        builder.build(name, &mut built);
    }

    // Package members are inert payload, not queue entries: seed the queue
    // only with tasks no package claims.
    let claimed: HashSet<&str> = scenario
        .task
        .values()
        .filter(|spec| spec.kind == TaskKind::Package)
        .flat_map(|spec| spec.members.iter().map(String::as_str))
        .collect();

    for (name, task) in &built {
        if claimed.contains(name.as_str()) {
            continue;
        }
        if task.priority().is_type(crate::priority::PriorityTag::Singleton) {
            let swept = queue.remove_duplicates_of(task.as_ref(), &task::MatchKey::name(name));
            if swept > 0 {
                debug!(task = %name, swept, "singleton admission swept duplicates");
            }
        }
        queue.add(Rc::clone(task));
    }
    info!(tasks = queue.len(), "scenario tasks admitted");

    let packages = builder.packages.into_inner();

    spawn_script(&scenario, events_tx.clone());
    spawn_ticker(scenario.queue.tick_interval_ms, events_tx.clone());
    spawn_ctrl_c(events_tx);

    let driver = Driver::new(
        queue,
        lock,
        bus,
        timers,
        loader,
        packages,
        affordances,
        DriverOptions {
            exit_when_idle: args.once,
            max_ticks: args.ticks,
        },
        events_rx,
        scenario.script.step.len(),
    );
    driver.run().await?;

    Ok(())
}

struct TaskBuilder<'a> {
    scenario: &'a ScenarioFile,
    lock: &'a TransitionLock,
    bus: &'a EventBus,
    timers: &'a Rc<TokioTimers>,
    loader: &'a Rc<SimLoader>,
    presenter: &'a Rc<TracingPresenter>,
    affordances: &'a HashMap<String, Affordance>,
    queue: &'a Queue,
    /// Packages stay concrete so the driver can route readiness signals to
    /// them; the queue only ever sees them as `Rc<dyn Task>`.
    packages: RefCell<HashMap<String, Rc<Package>>>,
}

impl TaskBuilder<'_> {
    /// Build (or fetch the memoised) task for `name`.
    ///
    /// Packages recurse into their members first; validation already ruled
    /// out cycles and dangling names, so the recursion terminates.
    fn build(&self, name: &str, built: &mut HashMap<String, Rc<dyn Task>>) -> Rc<dyn Task> {
        if let Some(existing) = built.get(name) {
            return Rc::clone(existing);
        }

        let spec = &self.scenario.task[name];
        let priority = Priority::with_tags(spec.rating, &spec.tags);
        let task: Rc<dyn Task> = match spec.kind {
            TaskKind::Callback => {
                let message = spec
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("callback {name} ran"));
                CallbackTask::new(
                    name,
                    priority,
                    self.lock.clone(),
                    Rc::new(move || info!(message = %message, "callback fired")),
                )
            }
            TaskKind::Modal => ModalTask::new(
                name,
                priority,
                self.lock.clone(),
                spec.content.clone(),
                self.loader_handle(),
                self.presenter_handle(),
            ),
            TaskKind::Preload => {
                // Validation guarantees `content` and the affordance entry.
                let content = spec.content.clone().unwrap_or_default();
                let affordance = self
                    .affordances
                    .get(&spec.affordance_name(name))
                    .cloned()
                    .unwrap_or_else(|| Affordance::new(spec.affordance_name(name), true));
                PreloadTask::new(
                    name,
                    priority,
                    self.lock.clone(),
                    content,
                    affordance,
                    self.loader_handle(),
                )
            }
            TaskKind::Event => {
                let event = spec.event.clone().unwrap_or_default();
                let completion = event.clone();
                EventWaitTask::spawn(
                    name,
                    priority,
                    self.lock.clone(),
                    event,
                    Duration::from_millis(spec.timeout_ms),
                    self.bus.clone(),
                    self.timers_handle(),
                    self.queue,
                    Rc::new(move || info!(event = %completion, "event completion action ran")),
                )
            }
            TaskKind::Package => {
                let members: Vec<Rc<dyn Task>> = spec
                    .members
                    .iter()
                    .map(|member| self.build(member, built))
                    .collect();
                let package = Package::new(name, priority, self.lock.clone(), members);
                self.packages
                    .borrow_mut()
                    .insert(name.to_string(), Rc::clone(&package));
                package
            }
        };

        built.insert(name.to_string(), Rc::clone(&task));
        task
    }

    fn loader_handle(&self) -> Rc<dyn ContentLoader> {
        Rc::clone(self.loader) as Rc<dyn ContentLoader>
    }

    fn presenter_handle(&self) -> Rc<dyn PresentationHost> {
        Rc::clone(self.presenter) as Rc<dyn PresentationHost>
    }

    fn timers_handle(&self) -> Rc<dyn TimerService> {
        Rc::clone(self.timers) as Rc<dyn TimerService>
    }
}

fn spawn_script(scenario: &ScenarioFile, events_tx: mpsc::Sender<DriverEvent>) {
    for step in &scenario.script.step {
        // Validation already ran parse_action over every step.
        let Ok(action) = step.parse_action() else {
            continue;
        };
        let event = match action {
            ScriptAction::FireEvent { event } => DriverEvent::EventRaised { event },
            ScriptAction::MemberReady { package, member } => {
                DriverEvent::MemberReady { package, member }
            }
            ScriptAction::SetLock { held } => DriverEvent::LockChanged { held },
            ScriptAction::SetAffordance { affordance, active } => {
                DriverEvent::AffordanceChanged { affordance, active }
            }
            ScriptAction::Shutdown => DriverEvent::ShutdownRequested,
        };
        let delay = Duration::from_millis(step.after_ms);
        let tx = events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event).await;
        });
    }
}

fn spawn_ticker(interval_ms: u64, events_tx: mpsc::Sender<DriverEvent>) {
    let period = Duration::from_millis(interval_ms.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if events_tx.send(DriverEvent::Tick).await.is_err() {
                break;
            }
        }
    });
}

fn spawn_ctrl_c(events_tx: mpsc::Sender<DriverEvent>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = events_tx.send(DriverEvent::ShutdownRequested).await;
        }
    });
}

fn print_dry_run(path: &str, scenario: &ScenarioFile) {
    println!("Scenario: {path}");
    println!(
        "  queue: policy={:?} tick_interval_ms={}",
        scenario.queue.tick_policy, scenario.queue.tick_interval_ms
    );
    println!(
        "  loader: latency_ms={} cached={} failing={}",
        scenario.loader.latency_ms,
        scenario.loader.cached.len(),
        scenario.loader.failing.len()
    );
    println!("  tasks ({}):", scenario.task.len());
    for (name, spec) in &scenario.task {
        print_task_line(name, spec);
    }
    println!("  script steps: {}", scenario.script.step.len());
}

fn print_task_line(name: &str, spec: &TaskSpec) {
    let priority = Priority::with_tags(spec.rating, &spec.tags);
    println!(
        "    {name}: kind={:?} rating={} tags={:?}",
        spec.kind,
        priority.rating(),
        spec.tags
    );
}
