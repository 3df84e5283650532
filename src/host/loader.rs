// src/host/loader.rs

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::DriverEvent;
use crate::host::{ContentHandle, ContentLoader, LoadFailure, LoadSuccess};

struct PendingLoad {
    on_success: LoadSuccess,
    on_failure: LoadFailure,
}

/// Simulated content loader used by the demo driver.
///
/// A load resolves after a fixed latency: `load` parks the callbacks and
/// spawns a sleep that sends [`DriverEvent::LoadFinished`] back through the
/// driver channel; the driver then calls [`SimLoader::complete`] on the
/// scheduling thread, which invokes the parked callbacks.
///
/// Paths listed in `failing` resolve as failures; everything else succeeds
/// and becomes cached for subsequent `is_cached` checks.
pub struct SimLoader {
    latency: Duration,
    failing: HashSet<String>,
    cached: RefCell<HashSet<String>>,
    pending: RefCell<HashMap<String, Vec<PendingLoad>>>,
    events_tx: mpsc::Sender<DriverEvent>,
}

impl SimLoader {
    pub fn new(
        latency: Duration,
        cached: impl IntoIterator<Item = String>,
        failing: impl IntoIterator<Item = String>,
        events_tx: mpsc::Sender<DriverEvent>,
    ) -> Self {
        Self {
            latency,
            failing: failing.into_iter().collect(),
            cached: RefCell::new(cached.into_iter().collect()),
            pending: RefCell::new(HashMap::new()),
            events_tx,
        }
    }

    /// Number of loads still in flight (used for idle detection).
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().values().map(Vec::len).sum()
    }

    /// Resolve an in-flight load; called by the driver when the simulated
    /// latency elapses. Unknown paths are a no-op.
    pub fn complete(&self, path: &str, success: bool) {
        let Some(waiters) = self.pending.borrow_mut().remove(path) else {
            debug!(path = %path, "load completion for unknown path; ignoring");
            return;
        };

        if success {
            self.cached.borrow_mut().insert(path.to_string());
        } else {
            warn!(path = %path, "simulated load failed");
        }

        for waiter in waiters {
            if success {
                (waiter.on_success)(path, ContentHandle::new(path));
            } else {
                (waiter.on_failure)(path);
            }
        }
    }
}

impl ContentLoader for SimLoader {
    fn is_cached(&self, path: &str) -> bool {
        self.cached.borrow().contains(path)
    }

    fn load(&self, path: &str, on_success: LoadSuccess, on_failure: LoadFailure) {
        let first_request = {
            let mut pending = self.pending.borrow_mut();
            let waiters = pending.entry(path.to_string()).or_default();
            waiters.push(PendingLoad {
                on_success,
                on_failure,
            });
            waiters.len() == 1
        };

        // Coalesce concurrent requests for the same path into one fetch.
        if !first_request {
            debug!(path = %path, "load already in flight; attaching to it");
            return;
        }

        debug!(path = %path, latency = ?self.latency, "starting simulated load");
        let tx = self.events_tx.clone();
        let success = !self.failing.contains(path);
        let latency = self.latency;
        let path = path.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            let _ = tx.send(DriverEvent::LoadFinished { path, success }).await;
        });
    }
}
