//! PoW generation (multi-threaded CPU).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;
use tracing::debug;

use crate::{work_value, WorkError};
use lattice_types::{WorkDifficulty, WorkNonce};

/// A blocking proof-of-work search that gives up once `cancel` is raised.
pub trait WorkSource: Send + Sync {
    fn search(
        &self,
        root: &[u8],
        threshold: WorkDifficulty,
        cancel: &AtomicBool,
    ) -> Result<WorkNonce, WorkError>;
}

/// Generates proof-of-work on the rayon pool.
///
/// Each worker starts at a shared random offset plus its worker index and advances
/// by the worker count, so workers search disjoint residue classes of the nonce
/// space. The first acceptable nonce wins; the others observe the shared flag on
/// their next iteration and stop.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkGenerator;

impl WorkGenerator {
    /// Search until a nonce meets `threshold` for `root`.
    pub fn generate(&self, root: &[u8], threshold: WorkDifficulty) -> Result<WorkNonce, WorkError> {
        self.generate_cancellable(root, threshold, &AtomicBool::new(false))
    }

    /// Like [`generate`](Self::generate), but also stops when `cancel` is raised by
    /// the caller, returning [`WorkError::Cancelled`].
    pub fn generate_cancellable(
        &self,
        root: &[u8],
        threshold: WorkDifficulty,
        cancel: &AtomicBool,
    ) -> Result<WorkNonce, WorkError> {
        let workers = rayon::current_num_threads().max(1) as u64;
        let start: u64 = rand::random();
        let done = AtomicBool::new(false);
        let winner = Mutex::new(None);

        (0..workers).into_par_iter().for_each(|worker| {
            let mut nonce = start.wrapping_add(worker);
            while !done.load(Ordering::Relaxed) && !cancel.load(Ordering::Relaxed) {
                if work_value(root, WorkNonce(nonce)) >= threshold.value() {
                    if !done.swap(true, Ordering::AcqRel) {
                        if let Ok(mut slot) = winner.lock() {
                            *slot = Some(WorkNonce(nonce));
                        }
                    }
                    return;
                }
                nonce = nonce.wrapping_add(workers);
            }
        });

        let found = winner.into_inner().ok().flatten();
        match found {
            Some(nonce) => {
                debug!(%nonce, %threshold, workers, "work generated");
                Ok(nonce)
            }
            None => Err(WorkError::Cancelled),
        }
    }
}

impl WorkSource for WorkGenerator {
    fn search(
        &self,
        root: &[u8],
        threshold: WorkDifficulty,
        cancel: &AtomicBool,
    ) -> Result<WorkNonce, WorkError> {
        self.generate_cancellable(root, threshold, cancel)
    }
}
