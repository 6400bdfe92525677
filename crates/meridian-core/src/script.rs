//! A collaborator that replays recorded answers from a JSON script.
//!
//! Useful for dry runs, demos and tests: every collaborator role reads its
//! answers from one [`Script`]. Score and mutation entries are kept as raw
//! JSON and parsed when consumed, so a malformed entry goes through the same
//! retry-with-feedback path a live model response would.
//!
//! ```json
//! {
//!   "initial_plan": {"steps": [{"goal": "Find", "instructions": "Search"}]},
//!   "scores": [{"effectiveness": 2, "completeness": 2, "executability": 3}],
//!   "default_score": {"effectiveness": 1, "completeness": 1, "executability": 1},
//!   "mutations": [{"action": "keep", "action_params": {"position": -1}}],
//!   "choices": [0, null],
//!   "step_results": {"Find": "Final answer: Paris"},
//!   "final_answer": "Paris"
//! }
//! ```

use std::{
    collections::{HashMap, VecDeque},
    path::Path,
    sync::Mutex,
};

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{MeridianError, Result},
    models::{ActionType, CompletedStep, Modification, Plan, PlanScore, Step},
    operations::read_json_file,
    oracle::{
        Choice, ChoiceOracle, FinalizeOracle, PlanMutator, PlanProposer, PlanScorer,
        StepExecutor,
    },
    retry::{retry_with_feedback, AttemptError, RetryPolicy},
};

/// Recorded answers for every collaborator role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub initial_plan: Plan,

    /// Raw score entries, consumed one per scoring call
    #[serde(default)]
    pub scores: Vec<Value>,

    /// Score used once `scores` runs out
    #[serde(default)]
    pub default_score: Option<PlanScore>,

    /// Raw modification entries, consumed one per mutation call
    #[serde(default)]
    pub mutations: Vec<Value>,

    /// Zero-based choices; `null` declines to choose
    #[serde(default)]
    pub choices: Vec<Option<usize>>,

    /// Step results keyed by goal
    #[serde(default)]
    pub step_results: HashMap<String, String>,

    #[serde(default)]
    pub default_step_result: Option<String>,

    #[serde(default)]
    pub final_answer: Option<String>,
}

impl Script {
    /// Reads a script from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        read_json_file(path)
    }
}

/// Plays back a [`Script`] for all six collaborator roles.
pub struct ScriptedCollaborator {
    initial_plan: Plan,
    scores: Mutex<VecDeque<Value>>,
    default_score: Option<PlanScore>,
    mutations: Mutex<VecDeque<Value>>,
    choices: Mutex<VecDeque<Option<usize>>>,
    step_results: HashMap<String, String>,
    default_step_result: Option<String>,
    final_answer: Option<String>,
    retry: RetryPolicy,
}

impl ScriptedCollaborator {
    pub fn new(script: Script) -> Self {
        Self {
            initial_plan: script.initial_plan,
            scores: Mutex::new(script.scores.into()),
            default_score: script.default_score,
            mutations: Mutex::new(script.mutations.into()),
            choices: Mutex::new(script.choices.into()),
            step_results: script.step_results,
            default_step_result: script.default_step_result,
            final_answer: script.final_answer,
            retry: RetryPolicy::immediate(3),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Script::from_path(path).map(Self::new)
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    fn next_entry<T>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
        match queue.lock() {
            Ok(mut guard) => guard.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        }
    }
}

fn parse_score(raw: Value) -> std::result::Result<PlanScore, String> {
    let score: PlanScore =
        serde_json::from_value(raw).map_err(|e| format!("score is not well formed: {e}"))?;
    score.validate().map_err(|e| e.to_string())?;
    Ok(score)
}

fn parse_modification(raw: Value) -> std::result::Result<Modification, String> {
    let modification: Modification = serde_json::from_value(raw)
        .map_err(|e| format!("modification is not well formed: {e}"))?;
    let params = &modification.action_params;
    let needs_step = matches!(modification.action, ActionType::Add | ActionType::Update);
    if needs_step && (params.goal.is_none() || params.instructions.is_none()) {
        return Err("Action parameters missing".to_string());
    }
    Ok(modification)
}

#[async_trait]
impl PlanProposer for ScriptedCollaborator {
    async fn propose(&self, _question: &str) -> Result<Plan> {
        Ok(self.initial_plan.clone())
    }
}

#[async_trait]
impl PlanScorer for ScriptedCollaborator {
    async fn score(&self, _question: &str, plan: &Plan) -> Result<PlanScore> {
        retry_with_feedback(self.retry, "plan scorer", |feedback| {
            if let Some(reason) = &feedback {
                debug!("Re-scoring a {}-step plan after: {reason}", plan.len());
            }
            let entry = Self::next_entry(&self.scores);
            let fallback = self.default_score;
            async move {
                match entry {
                    Some(raw) => parse_score(raw).map_err(AttemptError::Rejected),
                    None => fallback.ok_or_else(|| {
                        AttemptError::Fatal(MeridianError::collaborator(
                            "plan scorer",
                            "script has no scores left and no default score",
                        ))
                    }),
                }
            }
        })
        .await
    }
}

#[async_trait]
impl PlanMutator for ScriptedCollaborator {
    async fn mutate(&self, _question: &str, _plan: &Plan) -> Result<Modification> {
        retry_with_feedback(self.retry, "plan mutator", |_| {
            let entry = Self::next_entry(&self.mutations);
            async move {
                match entry {
                    Some(raw) => parse_modification(raw).map_err(AttemptError::Rejected),
                    None => Ok(Modification::keep()),
                }
            }
        })
        .await
    }
}

#[async_trait]
impl ChoiceOracle for ScriptedCollaborator {
    async fn choose(
        &self,
        _question: &str,
        _completed: &[CompletedStep],
        _candidates: &[Step],
    ) -> Result<Choice> {
        Ok(match Self::next_entry(&self.choices) {
            Some(Some(index)) => Choice::Index(index),
            Some(None) => Choice::NoChoice,
            None => Choice::Index(0),
        })
    }
}

#[async_trait]
impl FinalizeOracle for ScriptedCollaborator {
    async fn finalize(&self, _question: &str, completed: &[CompletedStep]) -> Result<String> {
        Ok(self.final_answer.clone().unwrap_or_else(|| {
            completed
                .last()
                .map(|done| done.result.clone())
                .unwrap_or_default()
        }))
    }
}

#[async_trait]
impl StepExecutor for ScriptedCollaborator {
    async fn execute(
        &self,
        _question: &str,
        step: &Step,
        _completed: &[CompletedStep],
    ) -> Result<String> {
        Ok(self
            .step_results
            .get(&step.goal)
            .or(self.default_step_result.as_ref())
            .cloned()
            .unwrap_or_else(|| format!("Completed: {}", step.goal)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn collaborator(script: Value) -> ScriptedCollaborator {
        ScriptedCollaborator::new(serde_json::from_value(script).unwrap())
    }

    #[tokio::test]
    async fn test_malformed_score_consumes_next_entry() {
        let scripted = collaborator(json!({
            "initial_plan": {"steps": []},
            "scores": [
                {"effectiveness": 9, "completeness": 1, "executability": 1},
                {"effectiveness": 3, "completeness": 2, "executability": 2}
            ]
        }));

        let score = scripted.score("q", &Plan::default()).await.unwrap();
        assert_eq!(score.total(), 7);
    }

    #[tokio::test]
    async fn test_scores_fall_back_to_default_then_fail() {
        let scripted = collaborator(json!({
            "initial_plan": {"steps": []},
            "default_score": {"effectiveness": 1, "completeness": 1, "executability": 1}
        }));
        assert_eq!(scripted.score("q", &Plan::default()).await.unwrap().total(), 3);

        let bare = collaborator(json!({"initial_plan": {"steps": []}}));
        let err = bare.score("q", &Plan::default()).await.unwrap_err();
        assert!(matches!(err, MeridianError::Collaborator { role: "plan scorer", .. }));
    }

    #[tokio::test]
    async fn test_repeated_malformed_mutations_exhaust_retries() {
        let scripted = collaborator(json!({
            "initial_plan": {"steps": []},
            "mutations": [
                {"action": "add", "action_params": {"position": 0}},
                {"action": "shuffle"},
                {"action": "update", "action_params": {"position": 1, "goal": "g"}}
            ]
        }));

        let err = scripted.mutate("q", &Plan::default()).await.unwrap_err();
        match err {
            MeridianError::RetriesExhausted { attempts, last_reason, .. } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_reason, "Action parameters missing");
            }
            other => panic!("unexpected error: {other}"),
        }
        // queue is drained, so the next call keeps the plan
        let next = scripted.mutate("q", &Plan::default()).await.unwrap();
        assert_eq!(next.action, ActionType::Keep);
    }

    #[tokio::test]
    async fn test_choices_and_step_results_replay_in_order() {
        let scripted = collaborator(json!({
            "initial_plan": {"steps": [{"goal": "A", "instructions": "a"}]},
            "choices": [1, null],
            "step_results": {"A": "found it"},
            "default_step_result": "nothing new"
        }));

        assert_eq!(scripted.choose("q", &[], &[]).await.unwrap(), Choice::Index(1));
        assert_eq!(scripted.choose("q", &[], &[]).await.unwrap(), Choice::NoChoice);
        assert_eq!(scripted.choose("q", &[], &[]).await.unwrap(), Choice::Index(0));

        let a = Step::new("A", "a");
        assert_eq!(scripted.execute("q", &a, &[]).await.unwrap(), "found it");
        let b = Step::new("B", "b");
        assert_eq!(scripted.execute("q", &b, &[]).await.unwrap(), "nothing new");
        assert_eq!(scripted.propose("q").await.unwrap().steps, vec![a]);
    }

    #[tokio::test]
    async fn test_finalize_without_answer_uses_last_result() {
        let scripted = collaborator(json!({"initial_plan": {"steps": []}}));
        let completed = vec![CompletedStep {
            step: Step::new("A", "a"),
            result: "42".to_string(),
        }];
        assert_eq!(scripted.finalize("q", &completed).await.unwrap(), "42");
    }

    #[test]
    fn test_script_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Script::from_path(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, MeridianError::FileSystem { .. }));
    }
}
