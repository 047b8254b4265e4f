//! Per-session decision pipeline and the registry that owns sessions
//!
//! A session owns its scorer, gate, agent and execution state machine outright; nothing is
//! shared between sessions. Callers that hand a session to several tasks go through the
//! registry's mutex, which keeps every mutating call single-writer.

use std::sync::Arc;

use dashmap::DashMap;
use decision_gate::{Decision, DecisionGate, GateStatistics};
use element_scorer::{top_candidates, ElementScorer};
use execution_state::{
    ActiveAction, ExecutionStateMachine, ExecutionToken, InterruptReason, StateSnapshot,
};
use learning_agent::{DecisionState, Feedback, FeedbackKind, LearningAgent, SnapshotStore};
use navis_core_types::{ActionType, InteractionHistory, ScoredElement, SessionId};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{CandidateConfig, NavisConfig};
use crate::errors::{NavisError, Result};
use crate::metrics;
use crate::page::PageSnapshot;

/// Result of running one page snapshot through the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub state: DecisionState,
    /// Every element that could be scored, best first
    pub ranked: Vec<ScoredElement>,
    /// The shortlist handed to the gate
    pub candidates: Vec<ScoredElement>,
    pub decision: Decision,
}

impl Evaluation {
    /// Look up a scored element by its position in the page snapshot.
    pub fn find(&self, index: usize) -> Option<&ScoredElement> {
        self.ranked.iter().find(|c| c.index == index)
    }

    /// What the user was shown: the disambiguation list, or the shortlist.
    pub fn shown(&self) -> &[ScoredElement] {
        match &self.decision {
            Decision::Disambiguation { top_candidates, .. } if !top_candidates.is_empty() => {
                top_candidates
            }
            _ => &self.candidates,
        }
    }

    fn require(&self, index: usize) -> Result<ScoredElement> {
        self.find(index)
            .cloned()
            .ok_or(NavisError::UnknownCandidate(index))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatistics {
    pub session: SessionId,
    pub gate: GateStatistics,
    pub execution: StateSnapshot,
    pub history_entries: usize,
}

#[derive(Debug)]
pub struct DecisionSession {
    id: SessionId,
    scorer: ElementScorer,
    gate: DecisionGate,
    machine: ExecutionStateMachine,
    history: InteractionHistory,
    candidates: CandidateConfig,
    last: Option<Evaluation>,
    active: Option<ScoredElement>,
}

impl DecisionSession {
    pub fn new(config: &NavisConfig) -> Result<Self> {
        let agent = LearningAgent::new(config.agent.clone())?;
        Self::with_agent(config, agent)
    }

    /// Build a session around an existing (for example restored) agent.
    pub fn with_agent(config: &NavisConfig, agent: LearningAgent) -> Result<Self> {
        config.validate()?;
        let scorer = ElementScorer::with_weights(config.scoring)?;
        let gate = DecisionGate::new(config.gate.clone(), agent)?;
        let id = SessionId::new();
        info!(session = %id, "Decision session created");
        Ok(Self {
            id,
            scorer,
            gate,
            machine: ExecutionStateMachine::new(),
            history: InteractionHistory::new(),
            candidates: config.candidates.clone(),
            last: None,
            active: None,
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn gate(&self) -> &DecisionGate {
        &self.gate
    }

    pub fn agent(&self) -> &LearningAgent {
        self.gate.agent()
    }

    pub fn machine(&self) -> &ExecutionStateMachine {
        &self.machine
    }

    pub fn history(&self) -> &InteractionHistory {
        &self.history
    }

    pub fn last_evaluation(&self) -> Option<&Evaluation> {
        self.last.as_ref()
    }

    pub fn active_candidate(&self) -> Option<&ScoredElement> {
        self.active.as_ref()
    }

    /// Score the page, shortlist the best candidates and let the gate decide.
    pub fn evaluate(&mut self, page: &PageSnapshot) -> &Evaluation {
        let ranked = self
            .scorer
            .score(&page.elements, &page.intent, Some(&self.history));
        let candidates = top_candidates(&ranked, self.candidates.limit, self.candidates.min_score);
        let decision = self.gate.decide(&candidates, &page.intent, &page.context);
        metrics::record_decision(&decision);
        info!(
            session = %self.id,
            reason = %decision.reason(),
            confidence = decision.confidence(),
            "Page evaluated: {} scored, {} shortlisted",
            ranked.len(),
            candidates.len()
        );

        self.active = None;
        self.last.insert(Evaluation {
            state: page.decision_state(),
            ranked,
            candidates,
            decision,
        })
    }

    /// Start executing the evaluated element at `index`; the token gates each step.
    pub fn begin(&mut self, index: usize) -> Result<ExecutionToken> {
        let evaluation = self.last.as_ref().ok_or(NavisError::NoEvaluation)?;
        let candidate = evaluation.require(index)?;
        let action = ActiveAction::new(evaluation.state.intent.action_type, candidate.label());
        self.machine.start(action)?;
        debug!(session = %self.id, "Executing {}", candidate.label());
        self.active = Some(candidate);
        Ok(self.machine.step_token())
    }

    /// The user answered a disambiguation request by picking `index`.
    pub fn select(&mut self, index: usize) -> Result<f64> {
        let evaluation = self.last.as_ref().ok_or(NavisError::NoEvaluation)?;
        let selected = evaluation.require(index)?;
        let shown = evaluation.shown().to_vec();
        let state = evaluation.state.clone();

        let reward = self.gate.record_user_selection(&shown, &selected, &state);
        metrics::record_user_selection();
        self.refresh_history(state.intent.action_type, &selected);
        Ok(reward)
    }

    /// Finish the running action and learn from how it went.
    pub fn report_outcome(&mut self, success: bool, feedback: Option<Feedback>) -> Result<f64> {
        let state = self
            .last
            .as_ref()
            .map(|e| e.state.clone())
            .ok_or(NavisError::NoEvaluation)?;
        if self.active.is_none() {
            return Err(NavisError::NoActiveAction);
        }
        self.machine.complete(success)?;
        let action = self.active.take().ok_or(NavisError::NoActiveAction)?;

        let reward = self
            .gate
            .record_action_result(&action, &state, success, None, feedback);
        metrics::record_outcome(success);
        self.refresh_history(state.intent.action_type, &action);
        Ok(reward)
    }

    /// Explicit feedback on the element at `index`, optionally naming a better one.
    pub fn feedback(
        &mut self,
        index: usize,
        kind: FeedbackKind,
        alternative: Option<usize>,
    ) -> Result<f64> {
        let evaluation = self.last.as_ref().ok_or(NavisError::NoEvaluation)?;
        let action = evaluation.require(index)?;
        let alternative = alternative.map(|i| evaluation.require(i)).transpose()?;
        let state = evaluation.state.clone();

        let reward = self
            .gate
            .record_feedback(&action, &state, kind, alternative.as_ref());
        metrics::record_feedback(kind);
        self.refresh_history(state.intent.action_type, &action);
        if let Some(alt) = &alternative {
            self.refresh_history(state.intent.action_type, alt);
        }
        Ok(reward)
    }

    pub fn pause(&mut self, reason: InterruptReason) -> Result<()> {
        Ok(self.machine.pause(reason)?)
    }

    pub fn resume(&mut self) -> Result<()> {
        Ok(self.machine.resume()?)
    }

    pub fn block(&mut self, reason: impl Into<String>) -> Result<()> {
        Ok(self.machine.block(reason)?)
    }

    pub fn unblock(&mut self) -> Result<()> {
        Ok(self.machine.unblock()?)
    }

    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        Ok(self.gate.set_threshold(threshold)?)
    }

    /// Load learned state and interaction history from `store`; a missing or unreadable
    /// snapshot keeps defaults.
    pub fn restore(&mut self, store: &dyn SnapshotStore) -> bool {
        match self.gate.agent_mut().load_from(store) {
            Some(history) => {
                debug!(session = %self.id, "Restored {} history entries", history.len());
                self.history = history;
                true
            }
            None => false,
        }
    }

    pub fn save(&self, store: &dyn SnapshotStore) -> Result<()> {
        let mut snapshot = self.gate.agent().snapshot();
        snapshot.interaction_history = self.history.clone();
        Ok(store.save(&snapshot)?)
    }

    pub fn statistics(&self) -> SessionStatistics {
        SessionStatistics {
            session: self.id.clone(),
            gate: self.gate.statistics(),
            execution: self.machine.current(),
            history_entries: self.history.len(),
        }
    }

    // The scorer reads past success through the interaction history.
    fn refresh_history(&mut self, action_type: ActionType, candidate: &ScoredElement) {
        let signature = candidate.signature();
        let rate = self.gate.agent().success_rate(&signature);
        debug!("History updated: {} {} = {:.2}", action_type, signature, rate);
        self.history.record(action_type, signature, rate);
    }
}

pub type SharedSession = Arc<Mutex<DecisionSession>>;

/// Live sessions by id; each one is built from the same configuration.
#[derive(Debug)]
pub struct SessionRegistry {
    config: NavisConfig,
    sessions: DashMap<SessionId, SharedSession>,
}

impl SessionRegistry {
    pub fn new(config: NavisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sessions: DashMap::new(),
        })
    }

    pub fn config(&self) -> &NavisConfig {
        &self.config
    }

    pub fn create(&self) -> Result<(SessionId, SharedSession)> {
        let agent = LearningAgent::new(self.config.agent.clone())?;
        self.create_with_agent(agent)
    }

    pub fn create_with_agent(&self, agent: LearningAgent) -> Result<(SessionId, SharedSession)> {
        let session = DecisionSession::with_agent(&self.config, agent)?;
        let id = session.id().clone();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.insert(id.clone(), Arc::clone(&shared));
        Ok((id, shared))
    }

    pub fn get(&self, id: &SessionId) -> Result<SharedSession> {
        self.sessions
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| NavisError::UnknownSession(id.clone()))
    }

    pub fn remove(&self, id: &SessionId) -> Option<SharedSession> {
        let removed = self.sessions.remove(id).map(|(_, session)| session);
        if removed.is_some() {
            info!(session = %id, "Decision session closed");
        }
        removed
    }

    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
