//! Stub collaborators with call counters for unit tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    error::{MeridianError, Result},
    models::{CompletedStep, Modification, Plan, PlanScore, Step},
    oracle::{Choice, ChoiceOracle, FinalizeOracle, PlanMutator, PlanScorer, StepExecutor},
};

pub(crate) fn step(n: u32) -> Step {
    Step::new(format!("Goal {n}"), format!("Instructions {n}"))
}

pub(crate) fn plan(ns: &[u32]) -> Plan {
    Plan::new(ns.iter().map(|&n| step(n)).collect())
}

pub(crate) fn score(total_hint: u8) -> PlanScore {
    // spreads a 3..=9 total over the three dimensions
    let base = total_hint / 3;
    let extra = total_hint % 3;
    PlanScore {
        effectiveness: base + u8::from(extra > 0),
        completeness: base + u8::from(extra > 1),
        executability: base,
    }
}

#[derive(Default)]
pub(crate) struct QueueMutator {
    queue: Mutex<VecDeque<Modification>>,
    pub calls: AtomicUsize,
}

impl QueueMutator {
    pub fn new(modifications: Vec<Modification>) -> Self {
        Self {
            queue: Mutex::new(modifications.into()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PlanMutator for QueueMutator {
    async fn mutate(&self, _question: &str, _plan: &Plan) -> Result<Modification> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.queue.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(Modification::keep))
    }
}

pub(crate) struct QueueScorer {
    queue: Mutex<VecDeque<PlanScore>>,
    fallback: Option<PlanScore>,
    pub calls: AtomicUsize,
}

impl QueueScorer {
    pub fn new(scores: Vec<PlanScore>, fallback: Option<PlanScore>) -> Self {
        Self {
            queue: Mutex::new(scores.into()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PlanScorer for QueueScorer {
    async fn score(&self, _question: &str, _plan: &Plan) -> Result<PlanScore> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.queue.lock().unwrap().pop_front();
        next.or(self.fallback)
            .ok_or_else(|| MeridianError::collaborator("plan scorer", "no score left"))
    }
}

pub(crate) struct QueueChooser {
    queue: Mutex<VecDeque<Choice>>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<Vec<Step>>>,
}

impl QueueChooser {
    pub fn new(choices: Vec<Choice>) -> Self {
        Self {
            queue: Mutex::new(choices.into()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChoiceOracle for QueueChooser {
    async fn choose(
        &self,
        _question: &str,
        _completed: &[CompletedStep],
        candidates: &[Step],
    ) -> Result<Choice> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(candidates.to_vec());
        Ok(self
            .queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Choice::Index(0)))
    }
}

/// Answers with the goals of the completed steps joined by commas.
#[derive(Default)]
pub(crate) struct JoiningFinalizer {
    pub calls: AtomicUsize,
}

#[async_trait]
impl FinalizeOracle for JoiningFinalizer {
    async fn finalize(&self, _question: &str, completed: &[CompletedStep]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(completed
            .iter()
            .map(|done| done.step.goal.as_str())
            .collect::<Vec<_>>()
            .join(","))
    }
}

/// Returns `done: <goal>` unless an override is registered for the goal.
#[derive(Default)]
pub(crate) struct MapExecutor {
    overrides: HashMap<String, String>,
    pub calls: AtomicUsize,
    pub context_sizes: Mutex<Vec<usize>>,
}

impl MapExecutor {
    pub fn with_override(mut self, goal: &str, result: &str) -> Self {
        self.overrides.insert(goal.to_string(), result.to_string());
        self
    }
}

#[async_trait]
impl StepExecutor for MapExecutor {
    async fn execute(
        &self,
        _question: &str,
        step: &Step,
        completed: &[CompletedStep],
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.context_sizes.lock().unwrap().push(completed.len());
        Ok(self
            .overrides
            .get(&step.goal)
            .cloned()
            .unwrap_or_else(|| format!("done: {}", step.goal)))
    }
}
