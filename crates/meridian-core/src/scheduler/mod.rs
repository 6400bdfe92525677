//! Walking a merged plan graph to an answer.
//!
//! Each iteration runs SELECT, then DISPATCH, then RECORD:
//!
//! 1. read the frontier of the graph;
//! 2. pick one ready step, directly when it is the only candidate and
//!    through the choice oracle otherwise;
//! 3. run it with the step executor and write its result back.
//!
//! The run ends when END becomes selectable, when a step result carries the
//! early-answer marker, when the frontier runs dry, or when the optional
//! iteration cap is hit. Every path except the early answer asks the
//! finalize oracle for the answer and stores it on END.

use log::{debug, info, warn};

use crate::{
    error::{MeridianError, Result},
    graph::{PlanGraph, StepNodeId},
    models::{OutcomeStatus, Step, StepOutcome, Termination},
    oracle::{Choice, ChoiceOracle, FinalizeOracle, StepExecutor},
};

#[cfg(test)]
mod tests;

/// Result written to candidates cleared after the choice oracle declined.
pub const SKIPPED_RESULT: &str = "Skipped by meta agent";
/// Marker that ends a run early when it appears in a step result.
pub const DEFAULT_FINAL_ANSWER_MARKER: &str = "Final answer: ";

/// Knobs of one scheduling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Maximum number of SELECT iterations; `None` runs until END
    pub max_execution_steps: Option<usize>,
    /// Early-answer marker; `None` disables early answers
    pub final_answer_marker: Option<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_execution_steps: None,
            final_answer_marker: Some(DEFAULT_FINAL_ANSWER_MARKER.to_string()),
        }
    }
}

/// Decision taken by one SELECT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Run this step next
    Dispatch(StepNodeId),
    /// END is ready; produce the final answer
    Finish,
    /// The oracle declined; clear these candidates
    Skip(Vec<StepNodeId>),
    /// Nothing is ready and END is unreachable
    Exhausted,
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub final_answer: String,
    pub termination: Termination,
    /// Executed and skipped steps in order
    pub steps: Vec<StepOutcome>,
}

/// Drives one question's execution over its merged graph.
pub struct StepScheduler {
    question: String,
    graph: PlanGraph,
    config: SchedulerConfig,
    trace: Vec<StepOutcome>,
}

impl StepScheduler {
    pub fn new(question: impl Into<String>, graph: PlanGraph, config: SchedulerConfig) -> Self {
        Self {
            question: question.into(),
            graph,
            config,
            trace: Vec::new(),
        }
    }

    pub fn graph(&self) -> &PlanGraph {
        &self.graph
    }

    pub fn into_graph(self) -> PlanGraph {
        self.graph
    }

    fn step_of(&self, id: StepNodeId) -> Result<Step> {
        self.graph
            .node(id)
            .map(|node| node.step().clone())
            .ok_or_else(|| {
                MeridianError::invalid_input("node").with_reason(format!("no graph node {id}"))
            })
    }

    /// Runs SELECT once against the current frontier.
    ///
    /// A single candidate is taken without consulting `chooser`. END among
    /// several candidates finishes the run. An index outside the candidate
    /// list counts as [`Choice::NoChoice`].
    pub async fn select_next(&self, chooser: &dyn ChoiceOracle) -> Result<Selection> {
        let candidates = self.graph.next_exec_steps();

        let selection = match candidates.as_slice() {
            [] => Selection::Exhausted,
            [only] if *only == PlanGraph::END => Selection::Finish,
            [only] => Selection::Dispatch(*only),
            several if several.contains(&PlanGraph::END) => Selection::Finish,
            several => {
                let steps = several
                    .iter()
                    .map(|&id| self.step_of(id))
                    .collect::<Result<Vec<Step>>>()?;
                let completed = self.graph.current_exec_results();
                match chooser.choose(&self.question, &completed, &steps).await? {
                    Choice::Index(index) if index < several.len() => {
                        Selection::Dispatch(several[index])
                    }
                    Choice::Index(index) => {
                        warn!(
                            "Choice index {index} is outside {} candidates; skipping them",
                            several.len()
                        );
                        Selection::Skip(several.to_vec())
                    }
                    Choice::NoChoice => Selection::Skip(several.to_vec()),
                }
            }
        };

        debug!(
            "Frontier of {} candidates gave {selection:?}",
            candidates.len()
        );
        Ok(selection)
    }

    /// Marks every listed candidate as skipped.
    fn skip(&mut self, candidates: &[StepNodeId]) -> Result<()> {
        for &id in candidates {
            let step = self.step_of(id)?;
            self.graph.record_result(id, SKIPPED_RESULT)?;
            info!("Skipped step '{}'", step.goal);
            self.trace.push(StepOutcome {
                step,
                status: OutcomeStatus::Skipped,
                result: SKIPPED_RESULT.to_string(),
            });
        }
        Ok(())
    }

    /// Executes one step and records its result.
    ///
    /// Returns the early answer when the result carries the marker.
    async fn dispatch(
        &mut self,
        id: StepNodeId,
        executor: &dyn StepExecutor,
    ) -> Result<Option<String>> {
        let step = self.step_of(id)?;
        let completed = self.graph.current_exec_results();

        info!("Executing step '{}'", step.goal);
        let result = executor.execute(&self.question, &step, &completed).await?;

        let early = self
            .config
            .final_answer_marker
            .as_deref()
            .filter(|marker| !marker.is_empty())
            .and_then(|marker| result.split(marker).nth(1))
            .map(|answer| answer.trim().to_string());

        self.graph.record_result(id, result.clone())?;
        self.trace.push(StepOutcome {
            step,
            status: OutcomeStatus::Executed,
            result,
        });
        Ok(early)
    }

    async fn finish(
        &mut self,
        finalizer: &dyn FinalizeOracle,
        termination: Termination,
    ) -> Result<RunOutcome> {
        let completed = self.graph.current_exec_results();
        let answer = finalizer.finalize(&self.question, &completed).await?;
        self.conclude(answer, termination)
    }

    fn conclude(&mut self, answer: String, termination: Termination) -> Result<RunOutcome> {
        self.graph.finalize(answer.clone())?;
        info!(
            "Run ended ({}) after {} steps",
            termination.as_str(),
            self.trace.len()
        );
        Ok(RunOutcome {
            final_answer: answer,
            termination,
            steps: std::mem::take(&mut self.trace),
        })
    }

    /// Runs the SELECT/DISPATCH/RECORD loop until the run terminates.
    ///
    /// Collaborator failures propagate unchanged; the scheduler does not
    /// retry them.
    pub async fn run(
        &mut self,
        chooser: &dyn ChoiceOracle,
        executor: &dyn StepExecutor,
        finalizer: &dyn FinalizeOracle,
    ) -> Result<RunOutcome> {
        let mut iterations = 0usize;

        loop {
            if self
                .config
                .max_execution_steps
                .is_some_and(|cap| iterations >= cap)
            {
                warn!("Reached the cap of {iterations} execution steps; finalizing");
                return self
                    .finish(finalizer, Termination::StepBudgetExhausted)
                    .await;
            }
            iterations += 1;

            match self.select_next(chooser).await? {
                Selection::Finish => return self.finish(finalizer, Termination::Finalized).await,
                Selection::Exhausted => {
                    warn!("Frontier is empty and END is unreachable; finalizing");
                    return self
                        .finish(finalizer, Termination::FrontierExhausted)
                        .await;
                }
                Selection::Skip(candidates) => self.skip(&candidates)?,
                Selection::Dispatch(id) => {
                    if let Some(answer) = self.dispatch(id, executor).await? {
                        info!("Step result carried an early answer");
                        return self.conclude(answer, Termination::EarlyAnswer);
                    }
                }
            }
        }
    }
}
