use std::sync::Arc;
use std::time::Duration;

use learning_agent::JsonFileSnapshotStore;
use navis_cli::{
    ActionType, AgentConfig, Element, ExecutionState, Intent, InterruptReason, NavisConfig,
    PageContext, PageSnapshot, SessionRegistry,
};

fn config() -> NavisConfig {
    let mut config = NavisConfig::default();
    config.agent = AgentConfig::default().with_exploration(0.0, 0.0).with_seed(17);
    config.gate.min_score = 0.5;
    config
}

fn search_page() -> PageSnapshot {
    PageSnapshot::new(
        Intent::new("search for shoes", ActionType::Click).with_keywords(["search"]),
        PageContext::new("https://shop.example.com", 3),
        vec![
            Element::new("button")
                .with_type("submit")
                .with_text("Search")
                .with_aria_label("Search")
                .at(600.0, 40.0)
                .sized(90.0, 36.0)
                .visible(),
            Element::new("a")
                .with_text("Gift cards")
                .at(10.0, 900.0)
                .sized(80.0, 16.0)
                .visible(),
            Element::new("button")
                .with_text("Sign in")
                .at(900.0, 10.0)
                .sized(70.0, 30.0)
                .visible(),
        ],
    )
}

#[tokio::test]
async fn test_step_waits_while_user_is_active() {
    let registry = SessionRegistry::new(config()).unwrap();
    let (_, shared) = registry.create().unwrap();

    let mut token = {
        let mut session = shared.lock();
        let evaluation = session.evaluate(&search_page()).clone();
        let best = evaluation.ranked[0].index;
        let token = session.begin(best).unwrap();
        session.pause(InterruptReason::MouseMovement).unwrap();
        token
    };

    let step = tokio::spawn(async move { token.checkpoint().await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!step.is_finished());

    shared.lock().resume().unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(1), step)
        .await
        .expect("step should continue after resume")
        .unwrap();
    assert!(outcome.is_ok());

    let reward = shared.lock().report_outcome(true, None).unwrap();
    assert_eq!(reward, 1.0);
    assert_eq!(shared.lock().machine().state(), ExecutionState::Completed);
}

#[tokio::test]
async fn test_sessions_learn_independently_across_tasks() {
    let registry = Arc::new(SessionRegistry::new(config()).unwrap());
    let mut handles = Vec::new();

    for successes in 1..=4usize {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            let (id, shared) = registry.create().unwrap();
            for _ in 0..successes {
                let mut session = shared.lock();
                let best = session.evaluate(&search_page()).ranked[0].index;
                session.begin(best).unwrap();
                session.report_outcome(true, None).unwrap();
            }
            (id, successes)
        }));
    }

    for handle in handles {
        let (id, successes) = handle.await.unwrap();
        let shared = registry.get(&id).unwrap();
        let session = shared.lock();
        assert_eq!(session.agent().total_recorded(), successes as u64);
        assert_eq!(session.statistics().history_entries, 1);
    }
    assert_eq!(registry.len(), 4);
}

#[test]
fn test_restored_session_scores_with_saved_history() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileSnapshotStore::new(dir.path().join("agent.json"));

    let before = {
        let registry = SessionRegistry::new(config()).unwrap();
        let (_, shared) = registry.create().unwrap();
        let mut session = shared.lock();
        let best = session.evaluate(&search_page()).ranked[0].clone();
        session.begin(best.index).unwrap();
        session.report_outcome(true, None).unwrap();
        session.save(&store).unwrap();
        best
    };
    assert_eq!(before.scores.interaction_history, 0.5);

    let registry = SessionRegistry::new(config()).unwrap();
    let (_, shared) = registry.create().unwrap();
    let mut session = shared.lock();
    assert!(session.restore(&store));
    assert_eq!(session.statistics().history_entries, 1);

    let evaluation = session.evaluate(&search_page());
    let rescored = evaluation.find(before.index).unwrap();
    assert!(rescored.scores.interaction_history > 0.5);
    assert!(rescored.total_score > before.total_score);
}

#[test]
fn test_empty_page_asks_the_user() {
    let registry = SessionRegistry::new(config()).unwrap();
    let (_, shared) = registry.create().unwrap();
    let mut session = shared.lock();

    let page = PageSnapshot::new(
        Intent::new("search", ActionType::Click),
        PageContext::new("about:blank", 0),
        Vec::new(),
    );
    let evaluation = session.evaluate(&page);
    assert!(evaluation.decision.requires_user_selection());
    assert!(evaluation.candidates.is_empty());
    assert!(evaluation.decision.chosen().is_none());
}
