//! Collection wrapper types for displaying groups of domain objects.

use std::fmt;

use crate::{
    batch::{TaskResult, TaskStatus},
    models::{Plan, RunSummary},
};

/// Newtype wrapper for displaying archived run summaries.
///
/// ```rust
/// use meridian_core::{display::RunSummaries, models::{RunSummary, Termination}};
/// use jiff::Timestamp;
///
/// let runs = RunSummaries(vec![RunSummary {
///     id: 1,
///     question: "Who wrote Dune?".to_string(),
///     final_answer: "Frank Herbert".to_string(),
///     termination: Termination::Finalized,
///     step_count: 3,
///     created_at: Timestamp::now(),
/// }]);
/// assert!(runs.to_string().contains("Frank Herbert"));
/// ```
pub struct RunSummaries(pub Vec<RunSummary>);

impl RunSummaries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RunSummary> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a RunSummaries {
    type Item = &'a RunSummary;
    type IntoIter = std::slice::Iter<'a, RunSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for RunSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No runs found.");
        }
        for summary in &self.0 {
            write!(f, "{summary}")?;
        }
        Ok(())
    }
}

/// Numbered list of plans, one section each.
pub struct Plans<'a>(pub &'a [Plan]);

impl fmt::Display for Plans<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No plans.");
        }
        for (index, plan) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(f, "## Plan {}\n", index + 1)?;
            write!(f, "{plan}")?;
        }
        Ok(())
    }
}

/// Per-task outcome of a batch run followed by a tally.
pub struct BatchResults<'a>(pub &'a [TaskResult]);

impl fmt::Display for BatchResults<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No tasks.");
        }
        for result in self.0 {
            writeln!(f, "## {}: {}\n", result.task_id, result.question)?;
            writeln!(f, "- Status: {}", result.status.as_str())?;
            if let Some(report) = &result.report {
                writeln!(f, "- Answer: {}", report.final_answer)?;
                writeln!(f, "- Termination: {}", report.termination.as_str())?;
            }
            if let Some(error) = &result.error {
                writeln!(f, "- Error: {error}")?;
            }
            writeln!(f)?;
        }
        let completed = self
            .0
            .iter()
            .filter(|result| result.status == TaskStatus::Completed)
            .count();
        writeln!(
            f,
            "{completed} completed, {} failed out of {} tasks",
            self.0.len() - completed,
            self.0.len()
        )
    }
}
