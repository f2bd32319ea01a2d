use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::Generation;

/// Hands out generations. Shared between the caller-facing handle, which
/// stamps queries, and the local worker, which peeks at the latest value to
/// skip queued jobs that are already superseded.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    last: AtomicU64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next generation, strictly greater than every one issued before.
    pub fn issue(&self) -> Generation {
        Generation(self.last.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn latest(&self) -> Generation {
        Generation(self.last.load(Ordering::Acquire))
    }
}

struct PendingRemote {
    generation: Generation,
    timer: JoinHandle<()>,
}

/// Per-picker search state. Lives in the apply loop and is only mutated there.
#[derive(Default)]
struct SearchSession {
    active: Option<Generation>,
    pending_local: Option<Generation>,
    pending_remote: Option<PendingRemote>,
}

/// Decides which generation may publish, and delays the remote phase until
/// input has paused for the debounce window.
pub struct QuerySequencer {
    debounce: Duration,
    session: SearchSession,
}

impl QuerySequencer {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            session: SearchSession::default(),
        }
    }

    /// True iff `generation` is the one currently allowed to publish.
    /// Checked when results are about to be applied, not at dispatch.
    pub fn is_active(&self, generation: Generation) -> bool {
        self.session.active == Some(generation)
    }

    /// Make `generation` active, cancelling the remote timer of the previous
    /// one. Returns false (and changes nothing) for a generation that is not
    /// newer than the active one.
    pub fn activate(&mut self, generation: Generation) -> bool {
        if self.session.active.is_some_and(|active| generation <= active) {
            return false;
        }
        self.cancel_remote();
        self.session.pending_local = None;
        self.session.active = Some(generation);
        true
    }

    fn cancel_remote(&mut self) {
        if let Some(pending) = self.session.pending_remote.take() {
            log::debug!("cancelling debounced remote search {}", pending.generation);
            pending.timer.abort();
        }
    }

    pub fn local_dispatched(&mut self, generation: Generation) {
        self.session.pending_local = Some(generation);
    }

    /// Record a finished local search. Returns whether its result may be applied.
    pub fn local_finished(&mut self, generation: Generation) -> bool {
        if self.session.pending_local == Some(generation) {
            self.session.pending_local = None;
        }
        self.is_active(generation)
    }

    pub fn is_local_pending(&self) -> bool {
        self.session.pending_local.is_some()
    }

    pub fn is_remote_armed(&self) -> bool {
        self.session.pending_remote.is_some()
    }

    /// Start the debounce timer for `generation`; `on_due` runs once the
    /// window elapses unless a newer generation is activated first.
    pub fn arm_remote<F>(&mut self, generation: Generation, on_due: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel_remote();
        let delay = self.debounce;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_due();
        });
        self.session.pending_remote = Some(PendingRemote { generation, timer });
    }

    /// Called when a debounce timer fires. Returns true if the remote search
    /// for `generation` should be dispatched now.
    pub fn take_due(&mut self, generation: Generation) -> bool {
        let armed = self
            .session
            .pending_remote
            .as_ref()
            .is_some_and(|p| p.generation == generation);
        if armed && self.is_active(generation) {
            self.session.pending_remote = None;
            true
        } else {
            false
        }
    }
}

impl Drop for QuerySequencer {
    fn drop(&mut self) {
        self.cancel_remote();
    }
}
