// src/host/presenter.rs

use tracing::info;

use crate::host::{ContentHandle, PresentationHost};

/// Demo presentation host: logs what the real client would display.
#[derive(Debug, Default)]
pub struct TracingPresenter;

impl TracingPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl PresentationHost for TracingPresenter {
    fn present(&self, path: &str, content: &ContentHandle) {
        info!(path = %path, content = %content.path(), "presenting content");
    }

    fn present_fallback(&self, path: &str) {
        info!(path = %path, "presenting generic fallback content");
    }
}
