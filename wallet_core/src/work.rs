//! Work acquisition for outgoing blocks.
//!
//! Local generation always starts. When a remote work service is configured it is
//! raced against the local search: a remote answer that validates cancels the local
//! workers, and a remote failure leaves the local search to finish.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use lattice_rpc::LedgerClient;
use lattice_types::{BlockHash, WorkDifficulty, WorkNonce};
use lattice_work::{validate_work, WorkGenerator, WorkSource};

use crate::WalletError;

/// Raises the local search's cancel flag when the request ends, however it ends.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Thresholds, the local search and the optional remote service.
pub struct WorkPolicy<C> {
    remote: Option<C>,
    local: Arc<dyn WorkSource>,
    send_difficulty: WorkDifficulty,
    receive_difficulty: WorkDifficulty,
}

impl<C: LedgerClient> WorkPolicy<C> {
    pub fn new(
        remote: Option<C>,
        send_difficulty: WorkDifficulty,
        receive_difficulty: WorkDifficulty,
    ) -> Self {
        Self {
            remote,
            local: Arc::new(WorkGenerator),
            send_difficulty,
            receive_difficulty,
        }
    }

    /// Replace the local search.
    pub fn with_local_source(mut self, local: Arc<dyn WorkSource>) -> Self {
        self.local = local;
        self
    }

    /// Work for a send or change block on `root`.
    pub async fn for_send(&self, root: BlockHash) -> Result<WorkNonce, WalletError> {
        self.generate(root, self.send_difficulty).await
    }

    /// Work for a receive block on `root`.
    pub async fn for_receive(&self, root: BlockHash) -> Result<WorkNonce, WalletError> {
        self.generate(root, self.receive_difficulty).await
    }

    /// Obtain work for `root` at `difficulty`.
    ///
    /// Dropping the returned future stops the local search.
    pub async fn generate(
        &self,
        root: BlockHash,
        difficulty: WorkDifficulty,
    ) -> Result<WorkNonce, WalletError> {
        let cancel = CancelOnDrop(Arc::new(AtomicBool::new(false)));
        let flag = Arc::clone(&cancel.0);
        let local_source = Arc::clone(&self.local);
        let mut local = tokio::task::spawn_blocking(move || {
            local_source.search(root.as_bytes(), difficulty, &flag)
        });

        let Some(remote) = &self.remote else {
            return Ok(local.await??);
        };

        tokio::select! {
            biased;
            remote_result = remote.work_generate(&root, difficulty) => match remote_result {
                Ok(work) if validate_work(root.as_bytes(), work, difficulty) => {
                    debug!(%root, %work, "remote work accepted");
                    return Ok(work);
                }
                Ok(work) => warn!(%root, %work, "remote work below threshold, using local"),
                Err(e) => warn!(%root, error = %e, "remote work failed, using local"),
            },
            local_result = &mut local => return Ok(local_result??),
        }

        Ok(local.await??)
    }
}
