//! Data models for plans, steps, scores and run reports.
//!
//! [`Plan`] and [`Step`] are plain values: they are created once and never
//! mutated in place. Edits go through [`Plan::apply_modifications`], which
//! returns a fresh plan.
//!
//! ```rust
//! use meridian_core::models::{Modification, Plan, Step};
//!
//! let plan = Plan::new(vec![
//!     Step::new("Find the capital", "Search reliable sources"),
//!     Step::new("Verify the capital", "Cross-check with a second source"),
//! ]);
//!
//! let edited = plan.apply_modifications(&[
//!     Modification::add(1, Step::new("Check recent news", "Look for changes")),
//!     Modification::remove(99),
//! ]);
//! assert_eq!(edited.len(), 3);
//! assert_eq!(edited.steps[1].goal, "Check recent news");
//! ```
//!
//! Display implementations live in [`crate::display::models`].

pub mod plan;
pub mod run;
pub mod score;
pub mod step;

#[cfg(test)]
mod tests;

pub use plan::{ActionParams, ActionType, Modification, Plan};
pub use run::{OutcomeStatus, RunRecord, RunReport, RunSummary, StepOutcome, Termination};
pub use score::PlanScore;
pub use step::{CompletedStep, Step};
