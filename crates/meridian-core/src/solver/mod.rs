//! End-to-end solving of one question.
//!
//! [`Solver`] wires the three stages together:
//!
//! ```text
//! ┌──────────────┐  top plans  ┌──────────────┐   frontier   ┌───────────────┐
//! │  SearchTree  │────────────▶│  PlanGraph   │◀────────────▶│ StepScheduler │
//! │ select/expand│             │ merge, dedup │   results    │ choose, run   │
//! └──────────────┘             └──────────────┘              └───────────────┘
//! ```
//!
//! Every decision goes through the [`Collaborators`] handed to the builder;
//! the solver holds no global state and can be shared across tasks, one
//! question per call.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::{path::Path, sync::Arc};
//!
//! use meridian_core::{oracle::Collaborators, script::ScriptedCollaborator, SolverBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scripted = ScriptedCollaborator::from_path(Path::new("script.json"))?;
//! let solver = SolverBuilder::new(Collaborators::uniform(Arc::new(scripted)))
//!     .with_top_k(Some(2))
//!     .build()?;
//!
//! let report = solver.solve("What is the capital of France?").await?;
//! println!("{}", report.final_answer);
//! # Ok(())
//! # }
//! ```

pub mod builder;

use jiff::Timestamp;
use log::info;

pub use builder::SolverBuilder;

use crate::{
    display::Mermaid,
    error::Result,
    graph::PlanGraph,
    models::{Plan, RunReport},
    oracle::Collaborators,
    scheduler::{SchedulerConfig, StepScheduler, DEFAULT_FINAL_ANSWER_MARKER},
    search::{SearchTree, DEFAULT_MAX_CHILDREN, DEFAULT_MAX_DEPTH},
};

/// Execution iterations allowed per question unless configured otherwise.
pub const DEFAULT_MAX_EXECUTION_STEPS: usize = 50;

/// Which plans leave the search tree for merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanSelection {
    /// Every plan sharing the best total score
    #[default]
    AllTop,
    /// A fixed-size set of high scorers
    TopK(usize),
}

/// Settings of a [`Solver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    pub max_depth: usize,
    pub max_children: usize,
    pub selection: PlanSelection,
    /// Upper bound on select/expand rounds; `None` runs until `select` is empty
    pub max_expansions: Option<usize>,
    pub scheduler: SchedulerConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_children: DEFAULT_MAX_CHILDREN,
            selection: PlanSelection::AllTop,
            max_expansions: None,
            scheduler: SchedulerConfig {
                max_execution_steps: Some(DEFAULT_MAX_EXECUTION_STEPS),
                final_answer_marker: Some(DEFAULT_FINAL_ANSWER_MARKER.to_string()),
            },
        }
    }
}

/// Searches, merges and executes plans for one question at a time.
#[derive(Clone)]
pub struct Solver {
    collaborators: Collaborators,
    config: SolverConfig,
}

impl Solver {
    pub(crate) fn new(collaborators: Collaborators, config: SolverConfig) -> Self {
        Self {
            collaborators,
            config,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Proposes and scores the initial plan, then expands the tree until
    /// selection runs dry or the expansion cap is reached.
    pub async fn search(&self, question: &str) -> Result<SearchTree> {
        let initial = self.collaborators.proposer.propose(question).await?;
        let score = self.collaborators.scorer.score(question, &initial).await?;
        score.validate()?;
        info!(
            "Initial plan has {} steps (score {})",
            initial.len(),
            score.total()
        );

        let mut tree = SearchTree::new(question, initial, Some(score))
            .with_limits(self.config.max_depth, self.config.max_children);

        let mut expansions = 0usize;
        while let Some(node) = tree.select() {
            if self
                .config
                .max_expansions
                .is_some_and(|cap| expansions >= cap)
            {
                info!("Stopping search at the cap of {expansions} expansions");
                break;
            }
            tree.expand(
                node,
                self.collaborators.mutator.as_ref(),
                self.collaborators.scorer.as_ref(),
            )
            .await?;
            expansions += 1;
        }

        info!("Search finished with {} nodes", tree.len());
        Ok(tree)
    }

    /// Plans chosen for merging under the configured selection policy.
    pub fn select_plans(&self, tree: &SearchTree) -> Vec<Plan> {
        match self.config.selection {
            PlanSelection::AllTop => tree.select_top_plans(),
            PlanSelection::TopK(k) => tree.select_top_k(k),
        }
    }

    /// Runs search, merge and execution for `question`.
    ///
    /// # Errors
    ///
    /// Any collaborator failure aborts the run and is returned unchanged.
    pub async fn solve(&self, question: &str) -> Result<RunReport> {
        let started_at = Timestamp::now();

        let tree = self.search(question).await?;
        let top_plans = self.select_plans(&tree);
        info!("Merging {} selected plans", top_plans.len());

        let graph = PlanGraph::from_plans(&top_plans);
        let mut scheduler = StepScheduler::new(question, graph, self.config.scheduler.clone());
        let outcome = scheduler
            .run(
                self.collaborators.chooser.as_ref(),
                self.collaborators.executor.as_ref(),
                self.collaborators.finalizer.as_ref(),
            )
            .await?;

        Ok(RunReport {
            question: question.to_string(),
            top_plans,
            tree_size: tree.len(),
            mermaid_graph: Mermaid(scheduler.graph()).to_string(),
            steps: outcome.steps,
            final_answer: outcome.final_answer,
            termination: outcome.termination,
            started_at,
            finished_at: Timestamp::now(),
        })
    }
}
