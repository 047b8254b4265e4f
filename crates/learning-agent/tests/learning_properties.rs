use learning_agent::{AgentConfig, DecisionState, Feedback, FeedbackKind, LearningAgent};
use navis_core_types::{ActionType, Element, Intent, PageContext, ScoreBreakdown, ScoredElement};
use proptest::prelude::*;

fn scored(text: &str, scores: ScoreBreakdown) -> ScoredElement {
    ScoredElement {
        element: Element::new("a").with_text(text),
        index: 0,
        scores,
        total_score: scores.mean(),
        confidence: scores.mean(),
        rank: 1,
    }
}

fn arb_scores() -> impl Strategy<Value = ScoreBreakdown> {
    (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0).prop_map(
        |(t, s, c, v, h)| ScoreBreakdown {
            text_match: t,
            semantic_relevance: s,
            contextual_position: c,
            visual_prominence: v,
            interaction_history: h,
        },
    )
}

fn arb_feedback() -> impl Strategy<Value = Option<Feedback>> {
    prop::option::of(
        prop::sample::select(vec![
            FeedbackKind::CorrectAction,
            FeedbackKind::WrongAction,
            FeedbackKind::BetterAlternative,
            FeedbackKind::UserSelection,
            FeedbackKind::UserCorrection,
        ])
        .prop_map(Feedback::new),
    )
}

#[derive(Debug, Clone)]
struct Step {
    url: usize,
    action: usize,
    reward: f64,
    scores: ScoreBreakdown,
    feedback: Option<Feedback>,
    chained: bool,
}

fn arb_step() -> impl Strategy<Value = Step> {
    (
        0usize..4,
        0usize..5,
        -3.0f64..3.0,
        arb_scores(),
        arb_feedback(),
        any::<bool>(),
    )
        .prop_map(|(url, action, reward, scores, feedback, chained)| Step {
            url,
            action,
            reward,
            scores,
            feedback,
            chained,
        })
}

fn state_for(url: usize) -> DecisionState {
    DecisionState::new(
        Intent::new("browse", ActionType::Navigate),
        PageContext::new(format!("https://site.example/{url}"), url * 3),
    )
}

proptest! {
    #[test]
    fn test_prop_learning_invariants_hold(steps in prop::collection::vec(arb_step(), 1..60)) {
        let mut agent = LearningAgent::new(AgentConfig::default().with_seed(3)).unwrap();
        let mut last_rate = agent.exploration_rate();
        let mut last_size = 0usize;

        for step in &steps {
            let state = state_for(step.url);
            let next = state_for((step.url + 1) % 4);
            let action = scored(&format!("link {}", step.action), step.scores);
            let next_ref = if step.chained { Some(&next) } else { None };

            let reward = agent.record(&state, &action, step.reward, next_ref, step.feedback.clone());
            prop_assert!((-1.0..=1.0).contains(&reward));

            let rate = agent.exploration_rate();
            prop_assert!(rate <= last_rate);
            prop_assert!(rate >= agent.config().min_exploration_rate);
            last_rate = rate;

            let size = agent.value_table().len();
            prop_assert!(size >= last_size);
            last_size = size;

            prop_assert!((agent.feature_weights().sum() - 1.0).abs() < 1e-9);
        }
    }
}

#[test]
fn test_seeded_agents_explore_identically() {
    let config = AgentConfig::default().with_exploration(0.5, 0.5).with_seed(99);
    let mut a = LearningAgent::new(config.clone()).unwrap();
    let mut b = LearningAgent::new(config).unwrap();
    let state = state_for(0);
    let candidates: Vec<ScoredElement> = (0..5)
        .map(|i| {
            let mut c = scored(&format!("item {i}"), ScoreBreakdown::default());
            c.index = i;
            c.rank = i + 1;
            c
        })
        .collect();

    for _ in 0..20 {
        let left = a.select(&candidates, &state.intent, &state.context).unwrap();
        let right = b.select(&candidates, &state.intent, &state.context).unwrap();
        assert_eq!(left.candidate.index, right.candidate.index);
        assert_eq!(left.method, right.method);
    }
}

#[test]
fn test_statistics_report_learning_progress() {
    let mut agent = LearningAgent::new(AgentConfig::default().with_seed(5)).unwrap();
    let state = state_for(1);
    let good = scored("checkout", ScoreBreakdown::default());
    let bad = scored("cancel", ScoreBreakdown::default());

    agent.record(&state, &good, 1.0, None, Some(Feedback::new(FeedbackKind::CorrectAction)));
    agent.record(&state, &bad, -1.0, None, None);

    let stats = agent.statistics();
    assert_eq!(stats.experience_count, 2);
    assert_eq!(stats.total_recorded, 2);
    assert_eq!(stats.value_table_size, 2);
    assert_eq!(stats.success_history_size, 2);
    assert_eq!(stats.success_rates[&good.signature()], 1.0);
    assert_eq!(stats.success_rates[&bad.signature()], 0.0);
    assert!(stats.mean_value_estimate.abs() < 1e-12);
    assert_eq!(stats.feature_weights.len(), 5);
}
