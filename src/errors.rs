// src/errors.rs

//! Crate-wide error type and aliases.
//!
//! Scheduler-core paths are deliberately infallible: a task failure never
//! propagates out of `Queue::run`, it converges on fallback behaviour plus
//! removal. Errors here cover the surfaces around the core — scenario
//! loading, validation, and driver wiring.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShowrunnerError {
    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Unknown reference: {0}")]
    UnknownReference(String),

    #[error("Cycle detected in package membership: {0}")]
    Cycle(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ShowrunnerError>;
