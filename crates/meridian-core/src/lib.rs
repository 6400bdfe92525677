//! Core library of meridian: plan search, plan merging and step scheduling.
//!
//! A question is solved in three stages, each driven by external
//! collaborators (see [`oracle`]) that propose, score and mutate plans, pick
//! among ready steps, run steps and write the final answer:
//!
//! 1. [`search`] grows a tree of plan variants, one mutation per node, and
//!    keeps the best-scoring plans;
//! 2. [`graph`] merges those plans into one step graph, sharing identical
//!    steps;
//! 3. [`scheduler`] walks the graph frontier until END is reached.
//!
//! [`Solver`] runs all three for one question and returns a
//! [`models::RunReport`], which [`RunArchive`] can store in SQLite.
//! [`batch`] solves many questions concurrently, one solver each.
//!
//! # Quick Start
//!
//! ```rust
//! use meridian_core::{graph::PlanGraph, models::{Plan, Step}};
//!
//! let a = Plan::new(vec![Step::new("Find", "Search"), Step::new("Check", "Verify")]);
//! let b = Plan::new(vec![Step::new("Find", "Search"), Step::new("Ask", "Email")]);
//!
//! let graph = PlanGraph::from_plans(&[a, b]);
//! assert_eq!(graph.step_count(), 3);
//!
//! // only the shared first step is ready
//! let frontier = graph.next_exec_steps();
//! assert_eq!(frontier.len(), 1);
//! ```

pub mod archive;
pub mod batch;
pub mod db;
pub mod display;
pub mod error;
pub mod graph;
pub mod models;
pub mod operations;
pub mod oracle;
pub mod params;
pub mod retry;
pub mod scheduler;
pub mod script;
pub mod search;
pub mod solver;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use archive::{ArchiveBuilder, RunArchive};
pub use batch::{BatchRunner, BatchTask, TaskResult, TaskSpec, TaskStatus};
pub use db::Database;
pub use display::{
    BatchResults, LocalDateTime, Mermaid, OperationStatus, Plans, RunSummaries, TreeView,
};
pub use error::{MeridianError, Result};
pub use graph::PlanGraph;
pub use models::{Modification, Plan, PlanScore, RunReport, Step};
pub use params::{ApplyModifications, Id, ListRuns, MergePlans};
pub use scheduler::{SchedulerConfig, StepScheduler};
pub use script::ScriptedCollaborator;
pub use search::SearchTree;
pub use solver::{PlanSelection, Solver, SolverBuilder, SolverConfig};
