//! Builder for creating and configuring Solver instances.

use super::{PlanSelection, Solver, SolverConfig};
use crate::{
    error::{MeridianError, Result},
    oracle::Collaborators,
};

/// Builder for creating and configuring [`Solver`] instances.
#[derive(Clone)]
pub struct SolverBuilder {
    collaborators: Collaborators,
    config: SolverConfig,
}

impl SolverBuilder {
    /// Creates a builder with default limits around the given collaborators.
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            config: SolverConfig::default(),
        }
    }

    /// Depth below which the search stops expanding.
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        if let Some(depth) = depth {
            self.config.max_depth = depth;
        }
        self
    }

    /// Children per node after which it counts as fully expanded.
    pub fn with_max_children(mut self, children: Option<usize>) -> Self {
        if let Some(children) = children {
            self.config.max_children = children;
        }
        self
    }

    /// Merges a `k`-sized set instead of every top-scoring plan.
    pub fn with_top_k(mut self, k: Option<usize>) -> Self {
        self.config.selection = k.map_or(PlanSelection::AllTop, PlanSelection::TopK);
        self
    }

    pub fn with_max_expansions(mut self, expansions: Option<usize>) -> Self {
        self.config.max_expansions = expansions;
        self
    }

    /// Caps execution iterations; `None` keeps the default of 50.
    pub fn with_max_execution_steps(mut self, steps: Option<usize>) -> Self {
        if let Some(steps) = steps {
            self.config.scheduler.max_execution_steps = Some(steps);
        }
        self
    }

    /// Replaces the early-answer marker; `None` disables early answers.
    pub fn with_final_answer_marker(mut self, marker: Option<String>) -> Self {
        self.config.scheduler.final_answer_marker = marker;
        self
    }

    /// Builds the configured solver.
    ///
    /// # Errors
    ///
    /// Returns `MeridianError::InvalidInput` for a zero `max_children`, a zero
    /// `k` or a zero execution-step cap, none of which can produce an answer.
    pub fn build(self) -> Result<Solver> {
        if self.config.max_children == 0 {
            return Err(MeridianError::invalid_input("max_children")
                .with_reason("must allow at least one child per node"));
        }
        if self.config.selection == PlanSelection::TopK(0) {
            return Err(MeridianError::invalid_input("top_k")
                .with_reason("must select at least one plan"));
        }
        if self.config.scheduler.max_execution_steps == Some(0) {
            return Err(MeridianError::invalid_input("max_execution_steps")
                .with_reason("must allow at least one execution step"));
        }

        Ok(Solver::new(self.collaborators, self.config))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        models::Plan,
        script::{Script, ScriptedCollaborator},
    };

    fn collaborators() -> Collaborators {
        Collaborators::uniform(Arc::new(ScriptedCollaborator::new(Script {
            initial_plan: Plan::default(),
            ..Script::default()
        })))
    }

    #[test]
    fn test_defaults() {
        let solver = SolverBuilder::new(collaborators()).build().unwrap();
        let config = solver.config();
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.max_children, 2);
        assert_eq!(config.selection, PlanSelection::AllTop);
        assert_eq!(config.max_expansions, None);
        assert_eq!(config.scheduler.max_execution_steps, Some(50));
        assert_eq!(
            config.scheduler.final_answer_marker.as_deref(),
            Some("Final answer: ")
        );
    }

    #[test]
    fn test_overrides_apply_only_when_given() {
        let solver = SolverBuilder::new(collaborators())
            .with_max_depth(Some(3))
            .with_max_children(None)
            .with_top_k(Some(2))
            .with_max_expansions(Some(4))
            .with_max_execution_steps(Some(10))
            .with_final_answer_marker(None)
            .build()
            .unwrap();
        let config = solver.config();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_children, 2);
        assert_eq!(config.selection, PlanSelection::TopK(2));
        assert_eq!(config.max_expansions, Some(4));
        assert_eq!(config.scheduler.max_execution_steps, Some(10));
        assert_eq!(config.scheduler.final_answer_marker, None);
    }

    #[test]
    fn test_rejects_unusable_limits() {
        for builder in [
            SolverBuilder::new(collaborators()).with_max_children(Some(0)),
            SolverBuilder::new(collaborators()).with_top_k(Some(0)),
            SolverBuilder::new(collaborators()).with_max_execution_steps(Some(0)),
        ] {
            let err = builder.build().err().unwrap();
            assert!(matches!(err, MeridianError::InvalidInput { .. }));
        }
    }
}
