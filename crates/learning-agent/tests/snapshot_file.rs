use learning_agent::{
    AgentConfig, DecisionState, JsonFileSnapshotStore, LearningAgent, SnapshotStore,
};
use navis_core_types::{ActionType, Element, Intent, PageContext, ScoreBreakdown, ScoredElement};
use tempfile::tempdir;

fn login() -> ScoredElement {
    ScoredElement {
        element: Element::new("button").with_type("submit").with_text("Login"),
        index: 0,
        scores: ScoreBreakdown {
            text_match: 1.0,
            semantic_relevance: 1.0,
            contextual_position: 0.8,
            visual_prominence: 0.58,
            interaction_history: 0.5,
        },
        total_score: 0.85,
        confidence: 0.81,
        rank: 1,
    }
}

fn state() -> DecisionState {
    DecisionState::new(
        Intent::new("log in", ActionType::Click),
        PageContext::new("https://example.com/login", 5),
    )
}

#[test]
fn test_snapshot_survives_a_restart() {
    let dir = tempdir().unwrap();
    let store = JsonFileSnapshotStore::new(dir.path().join("agent").join("snapshot.json"));

    let mut agent = LearningAgent::new(AgentConfig::default().with_seed(1)).unwrap();
    for _ in 0..12 {
        agent.record(&state(), &login(), 1.0, None, None);
    }
    agent.save_to(&store).unwrap();
    assert!(store.path().exists());

    let mut restarted = LearningAgent::new(AgentConfig::default().with_seed(2)).unwrap();
    assert!(restarted.restore_from(&store));
    assert_eq!(restarted.value_table(), agent.value_table());
    assert_eq!(restarted.feature_weights(), agent.feature_weights());
    assert!((restarted.exploration_rate() - agent.exploration_rate()).abs() < 1e-12);
    assert_eq!(restarted.success_rate(&login().signature()), 1.0);
}

#[test]
fn test_missing_file_is_not_an_error() {
    let dir = tempdir().unwrap();
    let store = JsonFileSnapshotStore::new(dir.path().join("absent.json"));
    assert!(store.load().unwrap().is_none());

    let mut agent = LearningAgent::default();
    assert!(!agent.restore_from(&store));
}

#[test]
fn test_corrupt_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, b"{ not json").unwrap();
    let store = JsonFileSnapshotStore::new(&path);

    assert!(store.load().is_err());
    let mut agent = LearningAgent::default();
    assert!(!agent.restore_from(&store));
    assert!(agent.value_table().is_empty());
    assert_eq!(agent.exploration_rate(), 0.1);
}
