//! The execution state machine

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::TransitionError;
use crate::history::TransitionLog;
use crate::token::ExecutionToken;
use crate::types::{
    ActiveAction, ExecutionState, GateStatus, InterruptReason, StateSnapshot, TransitionKind,
    TransitionRecord,
};

/// Tracks one action pipeline's state; rejected transitions leave it untouched.
#[derive(Debug)]
pub struct ExecutionStateMachine {
    state: ExecutionState,
    action: Option<ActiveAction>,
    interrupt_reason: Option<InterruptReason>,
    blocking_reason: Option<String>,
    gate_open: bool,
    history: TransitionLog,
    updated_at: DateTime<Utc>,
    gate: watch::Sender<GateStatus>,
    run: CancellationToken,
}

impl Default for ExecutionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionStateMachine {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(GateStatus {
            state: ExecutionState::Idle,
            open: true,
        });
        debug!("Execution state machine initialized");
        Self {
            state: ExecutionState::Idle,
            action: None,
            interrupt_reason: None,
            blocking_reason: None,
            gate_open: true,
            history: TransitionLog::default(),
            updated_at: Utc::now(),
            gate,
            run: CancellationToken::new(),
        }
    }

    fn check(&self, kind: TransitionKind) -> Result<ExecutionState, TransitionError> {
        kind.target(self.state).ok_or_else(|| {
            warn!("Cannot {} action in state: {}", kind, self.state);
            TransitionError {
                transition: kind,
                from: self.state,
            }
        })
    }

    fn transition_to(&mut self, kind: TransitionKind, to: ExecutionState) {
        let from = self.state;
        self.state = to;
        self.gate_open = kind.opens_gate();
        self.updated_at = Utc::now();
        self.history.push(TransitionRecord {
            from,
            to,
            at: self.updated_at,
            action: self.action.as_ref().map(|a| a.action_type),
        });
        self.broadcast();
        debug!("State transition: {} -> {}", from, to);
    }

    fn broadcast(&self) {
        self.gate.send_replace(GateStatus {
            state: self.state,
            open: self.gate_open,
        });
    }

    /// Idle, Completed or Failed -> Running.
    pub fn start(&mut self, action: ActiveAction) -> Result<(), TransitionError> {
        let to = self.check(TransitionKind::Start)?;
        if self.run.is_cancelled() {
            self.run = CancellationToken::new();
        }
        info!("Action started: {} {}", action.action_type, action.target);
        self.action = Some(action);
        self.interrupt_reason = None;
        self.blocking_reason = None;
        self.transition_to(TransitionKind::Start, to);
        Ok(())
    }

    /// Running -> Paused.
    pub fn pause(&mut self, reason: InterruptReason) -> Result<(), TransitionError> {
        let to = self.check(TransitionKind::Pause)?;
        self.interrupt_reason = Some(reason);
        self.transition_to(TransitionKind::Pause, to);
        info!("Action paused: {}", reason);
        Ok(())
    }

    /// Paused -> Running.
    pub fn resume(&mut self) -> Result<(), TransitionError> {
        let to = self.check(TransitionKind::Resume)?;
        self.interrupt_reason = None;
        self.transition_to(TransitionKind::Resume, to);
        info!("Action resumed");
        Ok(())
    }

    /// Running or Paused -> Blocked; needs a human before it can go on.
    pub fn block(&mut self, reason: impl Into<String>) -> Result<(), TransitionError> {
        let to = self.check(TransitionKind::Block)?;
        let reason = reason.into();
        warn!("Action blocked: {}", reason);
        self.blocking_reason = Some(reason);
        self.transition_to(TransitionKind::Block, to);
        Ok(())
    }

    /// Blocked -> Paused; an explicit resume is still required.
    pub fn unblock(&mut self) -> Result<(), TransitionError> {
        let to = self.check(TransitionKind::Unblock)?;
        self.blocking_reason = None;
        self.transition_to(TransitionKind::Unblock, to);
        info!("Action unblocked, now paused awaiting resume");
        Ok(())
    }

    /// Running or Paused -> Completed (or Failed when `success` is false).
    pub fn complete(&mut self, success: bool) -> Result<(), TransitionError> {
        let kind = if success {
            TransitionKind::Complete
        } else {
            TransitionKind::Fail
        };
        let to = self.check(kind)?;
        self.transition_to(kind, to);
        self.run.cancel();
        info!("Action {}", if success { "completed" } else { "failed" });
        Ok(())
    }

    /// Back to Idle from anywhere; live tokens halt. Not recorded in the history.
    pub fn reset(&mut self) {
        self.run.cancel();
        self.state = ExecutionState::Idle;
        self.action = None;
        self.interrupt_reason = None;
        self.blocking_reason = None;
        self.gate_open = true;
        self.updated_at = Utc::now();
        self.broadcast();
        info!("Execution state reset to idle");
    }

    pub fn is_action_allowed(&self) -> bool {
        self.state == ExecutionState::Running && self.gate_open
    }

    pub fn is_running(&self) -> bool {
        self.state == ExecutionState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state == ExecutionState::Paused
    }

    pub fn is_blocked(&self) -> bool {
        self.state == ExecutionState::Blocked
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    pub fn active_action(&self) -> Option<&ActiveAction> {
        self.action.as_ref()
    }

    pub fn interrupt_reason(&self) -> Option<InterruptReason> {
        self.interrupt_reason
    }

    pub fn blocking_reason(&self) -> Option<&str> {
        self.blocking_reason.as_deref()
    }

    pub fn current(&self) -> StateSnapshot {
        StateSnapshot {
            state: self.state,
            action: self.action.clone(),
            interrupt_reason: self.interrupt_reason,
            blocking_reason: self.blocking_reason.clone(),
            timestamp: self.updated_at,
        }
    }

    /// Most recent `limit` transitions, oldest first.
    pub fn history(&self, limit: usize) -> Vec<TransitionRecord> {
        self.history.recent(limit)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Token bound to the current run; halts once it ends.
    pub fn step_token(&self) -> ExecutionToken {
        ExecutionToken::new(self.gate.subscribe(), self.run.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<GateStatus> {
        self.gate.subscribe()
    }
}
