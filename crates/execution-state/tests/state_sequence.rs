use std::time::Duration;

use execution_state::{
    ActiveAction, ExecutionState, ExecutionStateMachine, InterruptReason, StepError,
};
use navis_core_types::ActionType;

fn login_click() -> ActiveAction {
    ActiveAction::new(ActionType::Click, "Login")
}

#[test]
fn test_block_unblock_resume_sequence() {
    let mut machine = ExecutionStateMachine::new();

    machine.start(login_click()).unwrap();
    machine.pause(InterruptReason::UserRequest).unwrap();
    machine.block("login wall").unwrap();
    machine.unblock().unwrap();
    assert!(machine.is_paused());
    assert!(!machine.is_action_allowed());
    machine.resume().unwrap();
    machine.complete(true).unwrap();

    assert_eq!(machine.state(), ExecutionState::Completed);
    let history = machine.history(100);
    assert_eq!(history.len(), 6);
    assert_eq!(history.last().unwrap().to, ExecutionState::Completed);

    let path: Vec<ExecutionState> = history.iter().map(|r| r.to).collect();
    assert_eq!(
        path,
        vec![
            ExecutionState::Running,
            ExecutionState::Paused,
            ExecutionState::Blocked,
            ExecutionState::Paused,
            ExecutionState::Running,
            ExecutionState::Completed,
        ]
    );
    assert!(history.windows(2).all(|w| w[0].to == w[1].from));
}

#[test]
fn test_snapshot_serializes_for_collaborators() {
    let mut machine = ExecutionStateMachine::new();
    machine.start(login_click()).unwrap();
    machine.block("captcha").unwrap();

    let json = serde_json::to_value(machine.current()).unwrap();
    assert_eq!(json["state"], "blocked");
    assert_eq!(json["blocking_reason"], "captcha");
    assert_eq!(json["action"]["action_type"], "click");
}

#[tokio::test]
async fn test_checkpoint_passes_while_running() {
    let mut machine = ExecutionStateMachine::new();
    machine.start(login_click()).unwrap();
    let mut token = machine.step_token();
    assert!(token.is_allowed());
    assert_eq!(token.checkpoint().await, Ok(()));
}

#[tokio::test]
async fn test_checkpoint_waits_for_resume() {
    let mut machine = ExecutionStateMachine::new();
    machine.start(login_click()).unwrap();
    machine.pause(InterruptReason::MouseMovement).unwrap();

    let mut token = machine.step_token();
    let waiter = tokio::spawn(async move { token.checkpoint().await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    machine.resume().unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("checkpoint should wake after resume")
        .unwrap();
    assert_eq!(outcome, Ok(()));
}

#[tokio::test]
async fn test_unblock_alone_keeps_the_step_waiting() {
    let mut machine = ExecutionStateMachine::new();
    machine.start(login_click()).unwrap();
    machine.block("login wall").unwrap();

    let mut token = machine.step_token();
    let waiter = tokio::spawn(async move { token.checkpoint().await });

    machine.unblock().unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    machine.resume().unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("checkpoint should wake after resume")
        .unwrap();
    assert_eq!(outcome, Ok(()));
}

#[tokio::test]
async fn test_completion_halts_waiting_steps() {
    let mut machine = ExecutionStateMachine::new();
    machine.start(login_click()).unwrap();
    machine.pause(InterruptReason::UserRequest).unwrap();

    let mut token = machine.step_token();
    let waiter = tokio::spawn(async move { token.checkpoint().await });
    tokio::time::sleep(Duration::from_millis(10)).await;

    machine.complete(false).unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("checkpoint should wake after completion")
        .unwrap();
    assert_eq!(outcome, Err(StepError::Halted(ExecutionState::Failed)));
}

#[tokio::test]
async fn test_old_tokens_stay_halted_after_restart() {
    let mut machine = ExecutionStateMachine::new();
    machine.start(login_click()).unwrap();
    let mut stale = machine.step_token();
    machine.reset();
    machine.start(login_click()).unwrap();

    assert!(stale.is_halted());
    assert!(stale.checkpoint().await.is_err());
    assert!(machine.step_token().checkpoint().await.is_ok());
}
