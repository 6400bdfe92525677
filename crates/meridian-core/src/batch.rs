//! Solving many independent questions in one process.
//!
//! Every [`BatchTask`] carries its own [`Solver`], so no search tree, plan
//! graph or collaborator handle is shared between questions. Tasks run on
//! the tokio runtime with at most `workers` solving at once, and a failing
//! task is reported without stopping the others.
//!
//! A batch file is a JSON array of [`TaskSpec`] entries:
//!
//! ```json
//! [
//!   {
//!     "task_id": "capital-fr",
//!     "question": "What is the capital of France?",
//!     "script": {"initial_plan": {"steps": []}, "final_answer": "Paris"}
//!   }
//! ]
//! ```

use std::{path::Path, sync::Arc};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::{sync::Semaphore, task::JoinSet};

use crate::{
    error::{MeridianError, Result},
    models::RunReport,
    operations::read_json_file,
    script::Script,
    solver::Solver,
};

/// Questions solved at once unless configured otherwise.
pub const DEFAULT_WORKERS: usize = 4;

/// One entry of a batch file: a question and its recorded collaborator answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub task_id: String,
    pub question: String,
    pub script: Script,
}

impl TaskSpec {
    /// Reads every task of a batch file.
    pub fn read_all(path: &Path) -> Result<Vec<TaskSpec>> {
        read_json_file(path)
    }
}

/// A question paired with the solver dedicated to it.
pub struct BatchTask {
    pub task_id: String,
    pub question: String,
    pub solver: Solver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

/// Outcome of one batch task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,
    pub question: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<RunReport>,
    /// Why the task failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskResult {
    pub fn final_answer(&self) -> Option<&str> {
        self.report.as_ref().map(|report| report.final_answer.as_str())
    }
}

/// Runs batch tasks with bounded concurrency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRunner {
    workers: usize,
    max_tasks: Option<usize>,
}

impl BatchRunner {
    /// Creates a runner solving at most `workers` questions at once.
    ///
    /// # Errors
    ///
    /// Returns `MeridianError::InvalidInput` when `workers` is zero.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(MeridianError::invalid_input("workers")
                .with_reason("must allow at least one concurrent task"));
        }
        Ok(Self {
            workers: workers.min(Semaphore::MAX_PERMITS),
            max_tasks: None,
        })
    }

    /// Only the first `max_tasks` tasks are run; `None` runs them all.
    pub fn with_max_tasks(mut self, max_tasks: Option<usize>) -> Self {
        self.max_tasks = max_tasks;
        self
    }

    /// Solves every task and returns the results in input order.
    ///
    /// # Errors
    ///
    /// Task failures are reported in their [`TaskResult`]. An error is
    /// returned only when a task could not be joined.
    pub async fn run(&self, tasks: Vec<BatchTask>) -> Result<Vec<TaskResult>> {
        let limit = self.max_tasks.unwrap_or(tasks.len());
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut set = JoinSet::new();

        for (index, task) in tasks.into_iter().take(limit).enumerate() {
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => solve_task(task).await,
                    Err(closed) => failed(task, closed.to_string()),
                };
                (index, result)
            });
        }
        info!(
            "Solving {} tasks with {} workers",
            set.len(),
            self.workers
        );

        let mut indexed = Vec::with_capacity(set.len());
        while let Some(joined) = set.join_next().await {
            indexed.push(joined.map_err(MeridianError::join)?);
        }
        indexed.sort_by_key(|(index, _)| *index);

        let results: Vec<TaskResult> = indexed.into_iter().map(|(_, result)| result).collect();
        let completed = results
            .iter()
            .filter(|result| result.status == TaskStatus::Completed)
            .count();
        info!(
            "Batch finished: {completed} completed, {} failed",
            results.len() - completed
        );
        Ok(results)
    }
}

async fn solve_task(task: BatchTask) -> TaskResult {
    debug!("Solving task {}", task.task_id);
    match task.solver.solve(&task.question).await {
        Ok(report) => TaskResult {
            task_id: task.task_id,
            question: task.question,
            status: TaskStatus::Completed,
            report: Some(report),
            error: None,
        },
        Err(error) => {
            warn!("Task {} failed: {error}", task.task_id);
            failed(task, error.to_string())
        }
    }
}

fn failed(task: BatchTask, error: String) -> TaskResult {
    TaskResult {
        task_id: task.task_id,
        question: task.question,
        status: TaskStatus::Failed,
        report: None,
        error: Some(error),
    }
}
