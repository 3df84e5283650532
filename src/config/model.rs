// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::priority::PriorityTag;
use crate::queue::TickPolicy;

/// Top-level scenario as read from a TOML file.
///
/// A scenario describes the tasks to admit at startup plus a timed script
/// of external happenings (events firing, members becoming ready, the lock
/// toggling), e.g.:
///
/// ```toml
/// [queue]
/// tick_policy = "single"
/// tick_interval_ms = 100
///
/// [task.welcome]
/// kind = "modal"
/// content = "dialogs/welcome"
/// rating = 10
/// tags = ["immediate", "singleton"]
///
/// [[script.step]]
/// after_ms = 300
/// action = "fire-event"
/// event = "jackpot"
/// ```
///
/// All sections are optional except `[task.*]` and have defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioFile {
    /// Queue behaviour from `[queue]`.
    #[serde(default)]
    pub queue: QueueSection,

    /// Simulated loader behaviour from `[loader]`.
    #[serde(default)]
    pub loader: LoaderSection,

    /// All tasks from `[task.<name>]`. Keys are the task descriptions.
    #[serde(default)]
    pub task: BTreeMap<String, TaskSpec>,

    /// Timed external happenings from `[[script.step]]`.
    #[serde(default)]
    pub script: ScriptSection,
}

/// `[queue]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueSection {
    /// `"single"` (default) or `"drain"`; see `TickPolicy`.
    #[serde(default)]
    pub tick_policy: TickPolicy,

    /// Interval between driver ticks, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    100
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            tick_policy: TickPolicy::default(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// `[loader]` section: behaviour of the simulated content loader.
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderSection {
    /// Simulated fetch latency, in milliseconds.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Paths that start out cached (resolve synchronously).
    #[serde(default)]
    pub cached: Vec<String>,

    /// Paths whose loads fail.
    #[serde(default)]
    pub failing: Vec<String>,
}

fn default_latency_ms() -> u64 {
    250
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            cached: Vec::new(),
            failing: Vec::new(),
        }
    }
}

/// Which task variant a `[task.<name>]` section describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Callback,
    Modal,
    Preload,
    Event,
    Package,
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSpec {
    pub kind: TaskKind,

    /// Base priority rating; tag weights are layered on top.
    #[serde(default)]
    pub rating: i64,

    /// Priority tags (`low`, `immediate`, `singleton`, `stack`).
    #[serde(default)]
    pub tags: Vec<PriorityTag>,

    /// `callback` only: message logged when the callback runs.
    #[serde(default)]
    pub message: Option<String>,

    /// `modal` / `preload`: content path to resolve. Optional for modals
    /// (missing content falls back to the generic dialog); required for
    /// preloads.
    #[serde(default)]
    pub content: Option<String>,

    /// `preload` only: name of the UI affordance gating the preload.
    /// Defaults to the task name.
    #[serde(default)]
    pub affordance: Option<String>,

    /// `event` only: named event to wait for.
    #[serde(default)]
    pub event: Option<String>,

    /// `event` only: timeout bound, in milliseconds.
    #[serde(default = "default_event_timeout_ms")]
    pub timeout_ms: u64,

    /// `package` only: names of the member tasks.
    #[serde(default)]
    pub members: Vec<String>,
}

fn default_event_timeout_ms() -> u64 {
    5000
}

impl TaskSpec {
    /// Effective affordance name for a preload spec.
    pub fn affordance_name(&self, task_name: &str) -> String {
        self.affordance
            .clone()
            .unwrap_or_else(|| task_name.to_string())
    }
}

/// `[script]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScriptSection {
    #[serde(default)]
    pub step: Vec<ScriptStep>,
}

/// One timed external happening.
///
/// Kept flat on the TOML side (an `action` string plus the fields that
/// action needs); [`ScriptStep::parse_action`] turns it into the typed
/// [`ScriptAction`], and validation runs that for every step up front.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptStep {
    /// Delay from scenario start, in milliseconds.
    pub after_ms: u64,

    /// One of: `fire-event`, `member-ready`, `set-lock`, `set-affordance`,
    /// `shutdown`.
    pub action: String,

    #[serde(default)]
    pub event: Option<String>,

    #[serde(default)]
    pub package: Option<String>,

    #[serde(default)]
    pub member: Option<String>,

    #[serde(default)]
    pub affordance: Option<String>,

    #[serde(default)]
    pub active: Option<bool>,

    #[serde(default)]
    pub held: Option<bool>,
}

/// Typed form of a script step's action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptAction {
    FireEvent { event: String },
    MemberReady { package: String, member: String },
    SetLock { held: bool },
    SetAffordance { affordance: String, active: bool },
    Shutdown,
}

impl ScriptStep {
    /// Parse the flat TOML fields into a [`ScriptAction`].
    pub fn parse_action(&self) -> Result<ScriptAction, String> {
        match self.action.trim() {
            "fire-event" => {
                let event = self
                    .event
                    .clone()
                    .ok_or("fire-event step requires `event`")?;
                Ok(ScriptAction::FireEvent { event })
            }
            "member-ready" => {
                let package = self
                    .package
                    .clone()
                    .ok_or("member-ready step requires `package`")?;
                let member = self
                    .member
                    .clone()
                    .ok_or("member-ready step requires `member`")?;
                Ok(ScriptAction::MemberReady { package, member })
            }
            "set-lock" => {
                let held = self.held.ok_or("set-lock step requires `held`")?;
                Ok(ScriptAction::SetLock { held })
            }
            "set-affordance" => {
                let affordance = self
                    .affordance
                    .clone()
                    .ok_or("set-affordance step requires `affordance`")?;
                let active = self
                    .active
                    .ok_or("set-affordance step requires `active`")?;
                Ok(ScriptAction::SetAffordance { affordance, active })
            }
            "shutdown" => Ok(ScriptAction::Shutdown),
            other => Err(format!(
                "invalid script action: {other} (expected \"fire-event\", \"member-ready\", \
                 \"set-lock\", \"set-affordance\" or \"shutdown\")"
            )),
        }
    }
}
