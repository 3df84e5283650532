#![allow(dead_code)]

use std::collections::BTreeMap;

use showrunner::config::{
    LoaderSection, QueueSection, ScenarioFile, ScriptSection, ScriptStep, TaskKind, TaskSpec,
};
use showrunner::priority::PriorityTag;

/// Builder for `ScenarioFile` to simplify test setup.
pub struct ScenarioFileBuilder {
    scenario: ScenarioFile,
}

impl ScenarioFileBuilder {
    pub fn new() -> Self {
        Self {
            scenario: ScenarioFile {
                queue: QueueSection::default(),
                loader: LoaderSection::default(),
                task: BTreeMap::new(),
                script: ScriptSection::default(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, spec: TaskSpec) -> Self {
        self.scenario.task.insert(name.to_string(), spec);
        self
    }

    pub fn with_cached(mut self, path: &str) -> Self {
        self.scenario.loader.cached.push(path.to_string());
        self
    }

    pub fn with_failing(mut self, path: &str) -> Self {
        self.scenario.loader.failing.push(path.to_string());
        self
    }

    pub fn with_step(mut self, step: ScriptStep) -> Self {
        self.scenario.script.step.push(step);
        self
    }

    pub fn build(self) -> ScenarioFile {
        self.scenario
    }
}

impl Default for ScenarioFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskSpec`.
pub struct TaskSpecBuilder {
    spec: TaskSpec,
}

impl TaskSpecBuilder {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            spec: TaskSpec {
                kind,
                rating: 0,
                tags: vec![],
                message: None,
                content: None,
                affordance: None,
                event: None,
                timeout_ms: 5000,
                members: vec![],
            },
        }
    }

    pub fn rating(mut self, rating: i64) -> Self {
        self.spec.rating = rating;
        self
    }

    pub fn tag(mut self, tag: PriorityTag) -> Self {
        self.spec.tags.push(tag);
        self
    }

    pub fn message(mut self, message: &str) -> Self {
        self.spec.message = Some(message.to_string());
        self
    }

    pub fn content(mut self, path: &str) -> Self {
        self.spec.content = Some(path.to_string());
        self
    }

    pub fn affordance(mut self, name: &str) -> Self {
        self.spec.affordance = Some(name.to_string());
        self
    }

    pub fn event(mut self, event: &str) -> Self {
        self.spec.event = Some(event.to_string());
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.spec.timeout_ms = ms;
        self
    }

    pub fn member(mut self, name: &str) -> Self {
        self.spec.members.push(name.to_string());
        self
    }

    pub fn build(self) -> TaskSpec {
        self.spec
    }
}

/// Script-step constructors matching the actions the driver understands.
pub fn fire_event_step(after_ms: u64, event: &str) -> ScriptStep {
    ScriptStep {
        after_ms,
        action: "fire-event".to_string(),
        event: Some(event.to_string()),
        package: None,
        member: None,
        affordance: None,
        active: None,
        held: None,
    }
}

pub fn member_ready_step(after_ms: u64, package: &str, member: &str) -> ScriptStep {
    ScriptStep {
        after_ms,
        action: "member-ready".to_string(),
        event: None,
        package: Some(package.to_string()),
        member: Some(member.to_string()),
        affordance: None,
        active: None,
        held: None,
    }
}

pub fn set_lock_step(after_ms: u64, held: bool) -> ScriptStep {
    ScriptStep {
        after_ms,
        action: "set-lock".to_string(),
        event: None,
        package: None,
        member: None,
        affordance: None,
        active: None,
        held: Some(held),
    }
}

pub fn set_affordance_step(after_ms: u64, affordance: &str, active: bool) -> ScriptStep {
    ScriptStep {
        after_ms,
        action: "set-affordance".to_string(),
        event: None,
        package: None,
        member: None,
        affordance: Some(affordance.to_string()),
        active: Some(active),
        held: None,
    }
}

pub fn shutdown_step(after_ms: u64) -> ScriptStep {
    ScriptStep {
        after_ms,
        action: "shutdown".to_string(),
        event: None,
        package: None,
        member: None,
        affordance: None,
        active: None,
        held: None,
    }
}
