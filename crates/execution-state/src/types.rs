//! States, transitions and the records kept about them

use std::fmt;

use chrono::{DateTime, Utc};
use navis_core_types::ActionType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    #[default]
    Idle,
    Running,
    Paused,
    Blocked,
    Completed,
    Failed,
}

impl ExecutionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionState::Idle => "idle",
            ExecutionState::Running => "running",
            ExecutionState::Paused => "paused",
            ExecutionState::Blocked => "blocked",
            ExecutionState::Completed => "completed",
            ExecutionState::Failed => "failed",
        }
    }

    /// Waiting for a resume or unblock rather than finished.
    pub fn is_suspended(&self) -> bool {
        matches!(self, ExecutionState::Paused | ExecutionState::Blocked)
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Start,
    Pause,
    Resume,
    Block,
    Unblock,
    Complete,
    Fail,
}

impl TransitionKind {
    /// States this transition may be taken from.
    pub fn sources(&self) -> &'static [ExecutionState] {
        use ExecutionState::*;
        match self {
            TransitionKind::Start => &[Idle, Completed, Failed],
            TransitionKind::Pause => &[Running],
            TransitionKind::Resume => &[Paused],
            TransitionKind::Block => &[Running, Paused],
            TransitionKind::Unblock => &[Blocked],
            TransitionKind::Complete | TransitionKind::Fail => &[Running, Paused],
        }
    }

    pub fn destination(&self) -> ExecutionState {
        match self {
            TransitionKind::Start | TransitionKind::Resume => ExecutionState::Running,
            TransitionKind::Pause | TransitionKind::Unblock => ExecutionState::Paused,
            TransitionKind::Block => ExecutionState::Blocked,
            TransitionKind::Complete => ExecutionState::Completed,
            TransitionKind::Fail => ExecutionState::Failed,
        }
    }

    /// Whether the allow-gate is open after this transition.
    pub fn opens_gate(&self) -> bool {
        match self {
            TransitionKind::Start | TransitionKind::Resume => true,
            TransitionKind::Complete | TransitionKind::Fail => true,
            TransitionKind::Pause | TransitionKind::Block | TransitionKind::Unblock => false,
        }
    }

    /// Target state when taken from `from`, if allowed.
    pub fn target(&self, from: ExecutionState) -> Option<ExecutionState> {
        self.sources()
            .contains(&from)
            .then(|| self.destination())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Start => "start",
            TransitionKind::Pause => "pause",
            TransitionKind::Resume => "resume",
            TransitionKind::Block => "block",
            TransitionKind::Unblock => "unblock",
            TransitionKind::Complete => "complete",
            TransitionKind::Fail => "fail",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a running action was paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptReason {
    MouseMovement,
    CursorActivity,
    UserRequest,
    BlockingDetected,
    Error,
}

impl InterruptReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterruptReason::MouseMovement => "mouse_movement",
            InterruptReason::CursorActivity => "cursor_activity",
            InterruptReason::UserRequest => "user_request",
            InterruptReason::BlockingDetected => "blocking_detected",
            InterruptReason::Error => "error",
        }
    }
}

impl fmt::Display for InterruptReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The action a run was started for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveAction {
    pub id: String,
    pub action_type: ActionType,
    pub target: String,
    pub started_at: DateTime<Utc>,
}

impl ActiveAction {
    pub fn new(action_type: ActionType, target: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            action_type,
            target: target.into(),
            started_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: ExecutionState,
    pub to: ExecutionState,
    pub at: DateTime<Utc>,
    pub action: Option<ActionType>,
}

/// What the gate broadcasts to execution tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateStatus {
    pub state: ExecutionState,
    pub open: bool,
}

impl GateStatus {
    pub fn allows_action(&self) -> bool {
        self.state == ExecutionState::Running && self.open
    }
}

/// Point-in-time view of the machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub state: ExecutionState,
    pub action: Option<ActiveAction>,
    pub interrupt_reason: Option<InterruptReason>,
    pub blocking_reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [ExecutionState; 6] = [
        ExecutionState::Idle,
        ExecutionState::Running,
        ExecutionState::Paused,
        ExecutionState::Blocked,
        ExecutionState::Completed,
        ExecutionState::Failed,
    ];

    #[test]
    fn test_unblock_never_goes_straight_to_running() {
        assert_eq!(
            TransitionKind::Unblock.target(ExecutionState::Blocked),
            Some(ExecutionState::Paused)
        );
        for state in ALL_STATES {
            assert_ne!(TransitionKind::Unblock.target(state), Some(ExecutionState::Running));
        }
    }

    #[test]
    fn test_start_only_from_rest_states() {
        let allowed: Vec<_> = ALL_STATES
            .into_iter()
            .filter(|s| TransitionKind::Start.target(*s).is_some())
            .collect();
        assert_eq!(
            allowed,
            vec![
                ExecutionState::Idle,
                ExecutionState::Completed,
                ExecutionState::Failed
            ]
        );
    }

    #[test]
    fn test_gate_allows_only_open_running() {
        let running_open = GateStatus {
            state: ExecutionState::Running,
            open: true,
        };
        let completed_open = GateStatus {
            state: ExecutionState::Completed,
            open: true,
        };
        assert!(running_open.allows_action());
        assert!(!completed_open.allows_action());
        assert!(!GateStatus::default().allows_action());
    }

    #[test]
    fn test_interrupt_reason_names() {
        let json = serde_json::to_string(&InterruptReason::MouseMovement).unwrap();
        assert_eq!(json, "\"mouse_movement\"");
        assert_eq!(InterruptReason::BlockingDetected.to_string(), "blocking_detected");
    }
}
