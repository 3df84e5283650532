// src/config/mod.rs

//! Scenario model, loading, and validation.
//!
//! Split the same way throughout: `model` holds the serde types exactly as
//! they appear in TOML, `loader` does the disk IO, `validate` checks the
//! cross-references a type system can't.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_scenario_path, load_and_validate, load_from_path};
pub use model::{
    LoaderSection, QueueSection, ScenarioFile, ScriptAction, ScriptSection, ScriptStep, TaskKind,
    TaskSpec,
};
pub use validate::validate_scenario;
