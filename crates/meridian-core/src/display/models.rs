//! Display implementations for domain models.
//!
//! Output is markdown, rendered by the CLI's terminal renderer and returned
//! verbatim by the MCP server.

use std::fmt;

use super::datetime::{Elapsed, LocalDateTime};
use crate::models::{
    ActionType, Modification, OutcomeStatus, Plan, PlanScore, RunRecord, RunReport, RunSummary,
    Step, StepOutcome, Termination,
};

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl OutcomeStatus {
    fn icon(self) -> &'static str {
        match self {
            OutcomeStatus::Executed => "✓",
            OutcomeStatus::Skipped => "⊘",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "**{}**", self.goal)?;
        if !self.instructions.is_empty() {
            write!(f, ": {}", self.instructions)?;
        }
        Ok(())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return writeln!(f, "No steps in this plan.");
        }
        for (index, step) in self.steps.iter().enumerate() {
            writeln!(f, "{}. {step}", index + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for PlanScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/9 (effectiveness {}, completeness {}, executability {})",
            self.total(),
            self.effectiveness,
            self.completeness,
            self.executability
        )
    }
}

impl fmt::Display for Modification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = &self.action_params;
        match self.action {
            ActionType::Keep => write!(f, "keep")?,
            ActionType::Remove => write!(f, "remove at {}", params.position)?,
            ActionType::Add | ActionType::Update => write!(
                f,
                "{} at {}: \"{}\"",
                self.action,
                params.position,
                params.goal.as_deref().unwrap_or_default()
            )?,
        }
        if !self.rationale.is_empty() {
            write!(f, " ({})", self.rationale)?;
        }
        Ok(())
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} **{}**: {}",
            self.status.icon(),
            self.step.goal,
            self.result
        )
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.question)?;
        writeln!(f)?;
        writeln!(f, "- Termination: {}", self.termination)?;
        writeln!(f, "- Started: {}", LocalDateTime(&self.started_at))?;
        writeln!(
            f,
            "- Duration: {}",
            Elapsed {
                from: &self.started_at,
                to: &self.finished_at,
            }
        )?;
        writeln!(f, "- Search tree: {} nodes", self.tree_size)?;
        writeln!(f, "- Plans merged: {}", self.top_plans.len())?;
        writeln!(
            f,
            "- Steps: {} executed, {} skipped",
            self.executed_count(),
            self.steps.len() - self.executed_count()
        )?;

        writeln!(f, "\n## Answer\n")?;
        writeln!(f, "{}", self.final_answer)?;

        if !self.steps.is_empty() {
            writeln!(f, "\n## Steps\n")?;
            for (index, outcome) in self.steps.iter().enumerate() {
                writeln!(f, "{}. {outcome}", index + 1)?;
            }
        }

        for (index, plan) in self.top_plans.iter().enumerate() {
            writeln!(f, "\n## Plan {}\n", index + 1)?;
            write!(f, "{plan}")?;
        }
        Ok(())
    }
}

impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Run {} archived {}\n",
            self.id,
            LocalDateTime(&self.created_at)
        )?;
        write!(f, "{}", self.report)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {}. {}", self.id, self.question)?;
        writeln!(f)?;
        writeln!(f, "- Answer: {}", self.final_answer)?;
        writeln!(f, "- Termination: {}", self.termination)?;
        writeln!(f, "- Steps: {}", self.step_count)?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)
    }
}
