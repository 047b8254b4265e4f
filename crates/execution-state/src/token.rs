//! Cooperative step token handed to action loops

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::errors::StepError;
use crate::types::GateStatus;

/// Checked by an action loop before each discrete step.
///
/// A step already in flight is never interrupted; pausing only holds back the next one.
#[derive(Debug, Clone)]
pub struct ExecutionToken {
    status: watch::Receiver<GateStatus>,
    run: CancellationToken,
}

impl ExecutionToken {
    pub(crate) fn new(status: watch::Receiver<GateStatus>, run: CancellationToken) -> Self {
        Self { status, run }
    }

    /// Whether the next step may run right now.
    pub fn is_allowed(&self) -> bool {
        !self.run.is_cancelled() && self.status.borrow().allows_action()
    }

    /// Whether the run this token belongs to has ended.
    pub fn is_halted(&self) -> bool {
        self.run.is_cancelled()
    }

    /// Wait until the next step may run.
    ///
    /// Suspends while paused or blocked and re-checks after every wake-up. Fails once the run
    /// completes, fails or is reset.
    pub async fn checkpoint(&mut self) -> Result<(), StepError> {
        loop {
            let status = *self.status.borrow_and_update();
            if self.run.is_cancelled() {
                return Err(StepError::Halted(status.state));
            }
            if status.allows_action() {
                return Ok(());
            }
            if !status.state.is_suspended() {
                return Err(StepError::Halted(status.state));
            }

            tokio::select! {
                _ = self.run.cancelled() => {}
                changed = self.status.changed() => {
                    if changed.is_err() {
                        return Err(StepError::Halted(status.state));
                    }
                }
            }
        }
    }
}
