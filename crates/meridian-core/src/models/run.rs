//! Run report and archive models.

use std::str::FromStr;

use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Plan, Step};

/// Why a scheduling run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// END was reached and the finalize oracle produced the answer
    Finalized,
    /// A step result carried the early-answer marker
    EarlyAnswer,
    /// The execution-step cap was hit and the run was finalized
    StepBudgetExhausted,
    /// Nothing was left on the frontier and END was never reached
    FrontierExhausted,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::Finalized => "finalized",
            Termination::EarlyAnswer => "early_answer",
            Termination::StepBudgetExhausted => "step_budget_exhausted",
            Termination::FrontierExhausted => "frontier_exhausted",
        }
    }
}

impl FromStr for Termination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "finalized" => Ok(Termination::Finalized),
            "early_answer" => Ok(Termination::EarlyAnswer),
            "step_budget_exhausted" => Ok(Termination::StepBudgetExhausted),
            "frontier_exhausted" => Ok(Termination::FrontierExhausted),
            _ => Err(format!("Invalid termination: {s}")),
        }
    }
}

/// Whether a step was run or cleared from a stalled frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Executed,
    Skipped,
}

/// One entry of the ordered execution trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct StepOutcome {
    pub step: Step,
    pub status: OutcomeStatus,
    pub result: String,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RunReport {
    pub question: String,

    /// Plans merged into the execution graph
    pub top_plans: Vec<Plan>,

    /// Number of nodes in the search tree when search halted
    pub tree_size: usize,

    /// Mermaid source of the merged graph as it stood at termination
    pub mermaid_graph: String,

    /// Steps in the order they were executed or skipped
    pub steps: Vec<StepOutcome>,

    pub final_answer: String,

    pub termination: Termination,

    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub started_at: Timestamp,

    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub finished_at: Timestamp,
}

impl RunReport {
    pub fn executed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|outcome| outcome.status == OutcomeStatus::Executed)
            .count()
    }
}

/// A report stored in the run archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: u64,
    pub created_at: Timestamp,
    pub report: RunReport,
}

/// Compact listing entry for archived runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: u64,
    pub question: String,
    pub final_answer: String,
    pub termination: Termination,
    pub step_count: u32,
    pub created_at: Timestamp,
}
