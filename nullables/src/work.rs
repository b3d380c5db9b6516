//! Nullable local work source: real searches with scripted failures.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use lattice_types::{WorkDifficulty, WorkNonce};
use lattice_work::{WorkError, WorkGenerator, WorkSource};

#[derive(Default)]
struct WorkState {
    fail_after: Option<usize>,
    outcomes: Vec<Result<WorkNonce, WorkError>>,
}

/// A [`WorkSource`] that searches with [`WorkGenerator`] and records every outcome.
///
/// Clones share state, like [`NullLedger`](crate::NullLedger).
#[derive(Clone, Default)]
pub struct NullWork {
    state: Arc<Mutex<WorkState>>,
}

impl NullWork {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, WorkState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Serve `n` more searches, then fail every later one as cancelled.
    pub fn fail_after(&self, n: usize) {
        let mut state = self.state();
        state.fail_after = Some(state.outcomes.len() + n);
    }

    /// Result of every finished search, in completion order.
    pub fn outcomes(&self) -> Vec<Result<WorkNonce, WorkError>> {
        self.state().outcomes.clone()
    }
}

impl WorkSource for NullWork {
    fn search(
        &self,
        root: &[u8],
        threshold: WorkDifficulty,
        cancel: &AtomicBool,
    ) -> Result<WorkNonce, WorkError> {
        let scripted_failure = {
            let state = self.state();
            state.fail_after.is_some_and(|limit| state.outcomes.len() >= limit)
        };
        let outcome = if scripted_failure {
            debug!("scripted work failure");
            Err(WorkError::Cancelled)
        } else {
            WorkGenerator.search(root, threshold, cancel)
        };
        self.state().outcomes.push(outcome);
        outcome
    }
}
