use std::sync::Arc;
use tokio::sync::watch;

/// Pause/resume handle given to a storing for a single `process` call.
///
/// Pauses nest: every [`pause`](Self::pause) needs its own [`resume`](Self::resume)
/// before the worker claims its next item. Clones share the same counter, so a clone
/// moved into a timer or I/O callback may resume after `process` has returned.
/// There is no timeout; a handle paused more often than resumed blocks its worker
/// for the rest of the run.
#[derive(Debug, Clone)]
pub struct ControlFlow {
    pauses: Arc<watch::Sender<usize>>,
}

impl ControlFlow {
    pub fn new() -> Self {
        let (pauses, _) = watch::channel(0);
        Self {
            pauses: Arc::new(pauses),
        }
    }

    pub fn pause(&self) {
        self.pauses.send_modify(|count| *count += 1);
    }

    /// Undoes one [`pause`](Self::pause). Resuming an unpaused handle does nothing.
    pub fn resume(&self) {
        // waiters only need waking on the transition back to zero
        self.pauses.send_if_modified(|count| {
            if *count == 0 {
                return false;
            }
            *count -= 1;
            *count == 0
        });
    }

    pub fn pause_count(&self) -> usize {
        *self.pauses.borrow()
    }

    pub fn is_paused(&self) -> bool {
        self.pause_count() > 0
    }

    /// Completes once the pause count is back to zero.
    pub async fn wait_until_resumed(&self) {
        let mut receiver = self.pauses.subscribe();
        // the sender lives in `self`, so the channel cannot close while we wait
        let _ = receiver.wait_for(|count| *count == 0).await;
    }
}

impl Default for ControlFlow {
    fn default() -> Self {
        Self::new()
    }
}
