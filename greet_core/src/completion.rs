//! One-shot completion signal between the receiver task and the
//! orchestrator.
//!
//! The receiver loop fires the signal exactly once when it stops
//! (end-of-stream or error); the orchestrator waits on it after the
//! sender loop returns. Firing before the wait is fine: the value is
//! buffered and the wait returns immediately, so there is no lost
//! wakeup. Single-fire is enforced by `fire` consuming the signal.

use std::time::Duration;

use tokio::sync::oneshot;

use crate::error::ReceiverError;

/// Writer side. Owned by the receiver task.
pub struct CompletionSignal {
    tx: oneshot::Sender<Result<(), ReceiverError>>,
}

/// Reader side. Owned by the orchestrator.
pub struct CompletionWait {
    rx: oneshot::Receiver<Result<(), ReceiverError>>,
}

/// Create a connected signal/wait pair.
pub fn completion_pair() -> (CompletionSignal, CompletionWait) {
    let (tx, rx) = oneshot::channel();
    (CompletionSignal { tx }, CompletionWait { rx })
}

impl CompletionSignal {
    /// Fire the signal with the receiver loop's result. Consumes the
    /// signal, so a second fire does not compile.
    pub fn fire(self, result: Result<(), ReceiverError>) {
        // The waiter may already be gone (orchestrator dropped the
        // call); nothing left to notify in that case.
        let _ = self.tx.send(result);
    }
}

impl CompletionWait {
    /// Wait for the signal to fire. If the signal side was dropped
    /// without firing (receiver task panicked or was aborted), reports
    /// `ReceiverError::TaskFailed` instead of hanging.
    pub async fn wait(self) -> Result<(), ReceiverError> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(ReceiverError::TaskFailed),
        }
    }

    /// Like [`wait`](Self::wait), but gives up after `timeout` if one
    /// is supplied. With `None` the wait is unbounded: a peer that
    /// never half-closes its send direction will block forever.
    pub async fn wait_with_timeout(
        self,
        timeout: Option<Duration>,
    ) -> Result<(), ReceiverError> {
        match timeout {
            None => self.wait().await,
            Some(limit) => match tokio::time::timeout(limit, self.wait()).await {
                Ok(result) => result,
                Err(_) => Err(ReceiverError::Timeout(limit)),
            },
        }
    }
}
