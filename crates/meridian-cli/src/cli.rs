//! Command handlers
//!
//! Each handler converts its clap arguments into core parameters, calls the
//! core and renders the markdown the core's Display implementations
//! produce. The MCP server renders the same values, so both front ends
//! print identical text.

use std::{path::Path, sync::Arc};

use anyhow::{bail, Context, Result};
use log::debug;
use meridian_core::{
    batch::{BatchRunner, BatchTask, TaskSpec},
    display::{BatchResults, OperationStatus, Plans, RunSummaries, TreeView},
    operations,
    oracle::Collaborators,
    params::{ApplyModifications, Id, ListRuns, MergePlans},
    RunArchive, ScriptedCollaborator, Solver, SolverBuilder,
};

use crate::{
    args::{
        BatchArgs, DeleteRunArgs, GraphArgs, HistoryCommands, PlanCommands, RunArgs,
        SearchArgs, SearchOptions,
    },
    renderer::TerminalRenderer,
};

pub struct Cli {
    archive: RunArchive,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(archive: RunArchive, renderer: TerminalRenderer) -> Self {
        Self { archive, renderer }
    }

    pub fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        match command {
            PlanCommands::Apply(args) => {
                let params = ApplyModifications::try_from(args)
                    .context("Failed to read plan or modifications")?;
                let plan = operations::apply_modifications(&params);
                debug!(
                    "Applied {} modifications, plan now has {} steps",
                    params.modifications.len(),
                    plan.len()
                );
                self.renderer.render(&plan.to_string());
                Ok(())
            }
        }
    }

    pub fn merge_plans(&self, args: GraphArgs) -> Result<()> {
        let params = MergePlans::try_from(args).context("Failed to read plans")?;
        let output = operations::merge_plans(&params);
        if params.mermaid {
            self.renderer.render_raw(&output);
        } else {
            self.renderer.render(&output);
        }
        Ok(())
    }

    pub async fn search(&self, args: SearchArgs) -> Result<()> {
        let solver = build_solver(&args.script, &args.options, None)?;
        let tree = solver
            .search(&args.question)
            .await
            .context("Plan search failed")?;
        let plans = solver.select_plans(&tree);

        self.renderer.render(&TreeView(&tree).to_string());
        self.renderer
            .render(&format!("\n# Selected plans\n\n{}", Plans(&plans)));
        Ok(())
    }

    pub async fn run(&self, args: RunArgs) -> Result<()> {
        let solver = build_solver(&args.script, &args.options, args.max_steps)?;
        let report = solver
            .solve(&args.question)
            .await
            .context("Run failed")?;

        let record = if args.no_save {
            None
        } else {
            Some(
                self.archive
                    .save(&report)
                    .await
                    .context("Failed to archive run")?,
            )
        };

        if args.json {
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize run report")?;
            self.renderer.render_raw(&json);
            return Ok(());
        }

        self.renderer.render(&report.to_string());
        if let Some(record) = record {
            let status = OperationStatus::success(format!("Archived as run {}", record.id));
            self.renderer.render(&format!("\n{status}"));
        }
        Ok(())
    }

    pub async fn batch(&self, args: BatchArgs) -> Result<()> {
        let runner = BatchRunner::new(args.workers)
            .context("Invalid batch settings")?
            .with_max_tasks(args.max_tasks);
        let entries = TaskSpec::read_all(&args.tasks)
            .with_context(|| format!("Failed to read tasks {}", args.tasks.display()))?;

        let tasks = entries
            .into_iter()
            .map(|entry| {
                let scripted = ScriptedCollaborator::new(entry.script);
                Ok(BatchTask {
                    task_id: entry.task_id,
                    question: entry.question,
                    solver: solver_for(scripted, &args.options, args.max_steps)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let results = runner.run(tasks).await.context("Batch run failed")?;

        let mut archived = Vec::new();
        if !args.no_save {
            for report in results.iter().filter_map(|result| result.report.as_ref()) {
                let record = self
                    .archive
                    .save(report)
                    .await
                    .context("Failed to archive run")?;
                archived.push(record.id.to_string());
            }
        }

        if args.json {
            let json = serde_json::to_string_pretty(&results)
                .context("Failed to serialize task results")?;
            self.renderer.render_raw(&json);
            return Ok(());
        }

        self.renderer
            .render(&format!("# Batch results\n\n{}", BatchResults(&results)));
        if !archived.is_empty() {
            let status =
                OperationStatus::success(format!("Archived as runs {}", archived.join(", ")));
            self.renderer.render(&format!("\n{status}"));
        }
        Ok(())
    }

    pub async fn handle_history_command(&self, command: HistoryCommands) -> Result<()> {
        match command {
            HistoryCommands::List(args) => self.list_runs(&args.into()).await,
            HistoryCommands::Show(args) => self.show_run(&args.into()).await,
            HistoryCommands::Delete(args) => self.delete_run(args).await,
        }
    }

    pub async fn list_runs(&self, params: &ListRuns) -> Result<()> {
        let runs = RunSummaries(
            self.archive
                .list(params)
                .await
                .context("Failed to list runs")?,
        );

        if runs.is_empty() {
            self.renderer.render(&runs.to_string());
        } else {
            self.renderer.render(&format!("# Runs\n\n{runs}"));
        }
        Ok(())
    }

    async fn show_run(&self, params: &Id) -> Result<()> {
        match self
            .archive
            .get(params)
            .await
            .context("Failed to get run")?
        {
            Some(record) => self.renderer.render(&record.to_string()),
            None => bail!("Run with ID {} not found", params.id),
        }
        Ok(())
    }

    async fn delete_run(&self, args: DeleteRunArgs) -> Result<()> {
        if !args.confirm {
            bail!(
                "Deleting run {} cannot be undone; pass --confirm to proceed",
                args.id
            );
        }

        let record = self
            .archive
            .delete(&Id { id: args.id })
            .await
            .with_context(|| format!("Failed to delete run {}", args.id))?;

        let status = OperationStatus::success(format!(
            "Deleted run {} ('{}')",
            record.id, record.report.question
        ));
        self.renderer.render(&status.to_string());
        Ok(())
    }
}

/// Builds a solver whose six collaborator roles replay `script`.
fn build_solver(script: &Path, options: &SearchOptions, max_steps: Option<usize>) -> Result<Solver> {
    let scripted = ScriptedCollaborator::from_path(script)
        .with_context(|| format!("Failed to load script {}", script.display()))?;
    solver_for(scripted, options, max_steps)
}

fn solver_for(
    scripted: ScriptedCollaborator,
    options: &SearchOptions,
    max_steps: Option<usize>,
) -> Result<Solver> {
    SolverBuilder::new(Collaborators::uniform(Arc::new(scripted)))
        .with_max_depth(options.max_depth)
        .with_max_children(options.max_children)
        .with_top_k(options.top_k)
        .with_max_expansions(options.max_expansions)
        .with_max_execution_steps(max_steps)
        .build()
        .context("Invalid solver settings")
}
