// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::ScenarioFile;
use crate::config::validate::validate_scenario;
use crate::errors::Result;

/// Load a scenario file from a given path and return the parsed `ScenarioFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (package membership, script references, etc.). Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ScenarioFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let scenario: ScenarioFile = toml::from_str(&contents)?;

    Ok(scenario)
}

/// Load a scenario file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - per-kind required fields,
///   - unknown package members and cyclic membership,
///   - script steps referencing things that don't exist.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ScenarioFile> {
    let scenario = load_from_path(&path)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

/// Helper to resolve a default scenario path.
///
/// Currently this just returns `Showrunner.toml` in the current working
/// directory; it exists so discovery can later grow (env var, multiple
/// default locations) without touching call sites.
pub fn default_scenario_path() -> PathBuf {
    PathBuf::from("Showrunner.toml")
}
