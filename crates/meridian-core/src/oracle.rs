//! Contracts for the external collaborators the core drives.
//!
//! The core never produces plans, scores or step results itself. It asks
//! these collaborators and only decides how their answers are combined,
//! selected and scheduled. Implementations own their retry policy: by the
//! time a call returns `Ok`, the value is well formed (see
//! [`crate::retry`]).

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{CompletedStep, Modification, Plan, PlanScore, Step},
};

/// Outcome of asking the choice oracle to pick among ready steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Zero-based index into the candidate list
    Index(usize),
    /// The oracle declined to pick a step
    NoChoice,
}

/// Produces the initial plan for a question.
#[async_trait]
pub trait PlanProposer: Send + Sync {
    async fn propose(&self, question: &str) -> Result<Plan>;
}

/// Scores a plan for a question.
#[async_trait]
pub trait PlanScorer: Send + Sync {
    async fn score(&self, question: &str, plan: &Plan) -> Result<PlanScore>;
}

/// Proposes exactly one modification of a plan.
#[async_trait]
pub trait PlanMutator: Send + Sync {
    async fn mutate(&self, question: &str, plan: &Plan) -> Result<Modification>;
}

/// Picks the next step when several are ready.
#[async_trait]
pub trait ChoiceOracle: Send + Sync {
    async fn choose(
        &self,
        question: &str,
        completed: &[CompletedStep],
        candidates: &[Step],
    ) -> Result<Choice>;
}

/// Turns the accumulated step results into the final answer.
#[async_trait]
pub trait FinalizeOracle: Send + Sync {
    async fn finalize(&self, question: &str, completed: &[CompletedStep]) -> Result<String>;
}

/// Carries out one step, free to call search or browse tools internally.
#[async_trait]
pub trait StepExecutor: Send + Sync {
    async fn execute(
        &self,
        question: &str,
        step: &Step,
        completed: &[CompletedStep],
    ) -> Result<String>;
}

/// Handles to every collaborator a full solve needs.
#[derive(Clone)]
pub struct Collaborators {
    pub proposer: Arc<dyn PlanProposer>,
    pub scorer: Arc<dyn PlanScorer>,
    pub mutator: Arc<dyn PlanMutator>,
    pub chooser: Arc<dyn ChoiceOracle>,
    pub finalizer: Arc<dyn FinalizeOracle>,
    pub executor: Arc<dyn StepExecutor>,
}

impl Collaborators {
    /// Uses one implementation for every role.
    pub fn uniform<T>(collaborator: Arc<T>) -> Self
    where
        T: PlanProposer
            + PlanScorer
            + PlanMutator
            + ChoiceOracle
            + FinalizeOracle
            + StepExecutor
            + 'static,
    {
        Self {
            proposer: collaborator.clone(),
            scorer: collaborator.clone(),
            mutator: collaborator.clone(),
            chooser: collaborator.clone(),
            finalizer: collaborator.clone(),
            executor: collaborator,
        }
    }
}
