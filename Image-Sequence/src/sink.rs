use std::sync::{Arc, Mutex};

use crate::types::{RunStatus, SequenceRun};

/// Receives a snapshot after every state change of a run.
///
/// Sinks are attached to the controller up front; any number can observe
/// the same run (UI, logging, metrics).
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, snapshot: &SequenceRun);
}

impl<F> ProgressSink for F
where
    F: Fn(&SequenceRun) + Send + Sync,
{
    fn on_progress(&self, snapshot: &SequenceRun) {
        self(snapshot)
    }
}

/// Logs every snapshot through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn on_progress(&self, snapshot: &SequenceRun) {
        let completed = snapshot.completed_images.len();
        match snapshot.status {
            RunStatus::Error => {
                let error = snapshot
                    .last_error
                    .as_ref()
                    .map(|e| e.message.as_str())
                    .unwrap_or("");
                tracing::warn!(completed, error, "{}", snapshot.progress_label());
            }
            status if status.is_terminal() => {
                tracing::info!(completed, "{}", snapshot.progress_label());
            }
            _ => {
                tracing::debug!(
                    step = snapshot.current_step_index,
                    total = snapshot.total_steps,
                    completed,
                    "{}",
                    snapshot.progress_label()
                );
            }
        }
    }
}

/// Keeps every snapshot it sees. Clones share the same history, so one
/// clone can be attached to a controller while another is read.
#[derive(Debug, Clone, Default)]
pub struct SnapshotHistory {
    snapshots: Arc<Mutex<Vec<SequenceRun>>>,
}

impl SnapshotHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// All snapshots recorded so far, oldest first.
    pub fn snapshots(&self) -> Vec<SequenceRun> {
        self.snapshots
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// The most recent snapshot.
    pub fn latest(&self) -> Option<SequenceRun> {
        self.snapshots
            .lock()
            .ok()
            .and_then(|s| s.last().cloned())
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut s) = self.snapshots.lock() {
            s.clear();
        }
    }
}

impl ProgressSink for SnapshotHistory {
    fn on_progress(&self, snapshot: &SequenceRun) {
        if let Ok(mut s) = self.snapshots.lock() {
            s.push(snapshot.clone());
        }
    }
}
