//! Command-line interface definitions using clap
//!
//! Every command that maps onto a core operation has its own argument struct
//! with a conversion into the matching type from `meridian_core::params`:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Core Operation
//! ```
//!
//! Arguments that name JSON files are read during the conversion, so those
//! conversions are `TryFrom` and fail with the core's file or parse error.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use meridian_core::{
    batch::DEFAULT_WORKERS,
    models::{Modification, Plan},
    operations::read_json_file,
    params::{ApplyModifications, Id, ListRuns, MergePlans},
    MeridianError,
};

/// Plan search, plan merging and step scheduling for question solving
///
/// Meridian refines a proposed plan with a bounded tree search, merges the
/// best plans into one execution graph and walks that graph step by step.
/// Runs are driven by a JSON script standing in for the model-backed
/// collaborators, and every finished run is kept in a local archive.
#[derive(Parser)]
#[command(version, about, name = "mrd")]
pub struct Args {
    /// Path to the SQLite run archive. Defaults to
    /// $XDG_DATA_HOME/meridian/runs.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Meridian CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Work with individual plans
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Merge plans into an execution graph and show it
    #[command(alias = "g")]
    Graph(GraphArgs),
    /// Run only the plan search and show the resulting tree
    Search(SearchArgs),
    /// Solve a question end to end with a scripted collaborator
    #[command(alias = "r")]
    Run(RunArgs),
    /// Solve every question of a batch file concurrently
    #[command(alias = "b")]
    Batch(BatchArgs),
    /// Browse and manage archived runs
    #[command(alias = "h")]
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Start the MCP server
    Serve,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Apply modifications to a plan and print the result
    #[command(alias = "a")]
    Apply(ApplyArgs),
}

/// Apply modifications to a plan
///
/// Modifications are applied in order. Positions outside the plan are
/// ignored, except that `add` past the end appends.
#[derive(ClapArgs)]
pub struct ApplyArgs {
    #[arg(help = "JSON file holding the plan, e.g. {\"steps\": [...]}")]
    pub plan: PathBuf,
    #[arg(help = "JSON file holding an array of modifications")]
    pub modifications: PathBuf,
}

impl TryFrom<ApplyArgs> for ApplyModifications {
    type Error = MeridianError;

    fn try_from(val: ApplyArgs) -> Result<Self, Self::Error> {
        Ok(ApplyModifications {
            plan: read_json_file::<Plan>(&val.plan)?,
            modifications: read_json_file::<Vec<Modification>>(&val.modifications)?,
        })
    }
}

/// Merge plans into one execution graph
///
/// Identical steps (same goal and instructions) share a node. The output
/// lists steps, edges and the current frontier, or Mermaid flowchart source
/// with --mermaid.
#[derive(ClapArgs)]
pub struct GraphArgs {
    #[arg(help = "JSON file holding an array of plans")]
    pub plans: PathBuf,
    #[arg(long, help = "Print Mermaid flowchart source instead of markdown")]
    pub mermaid: bool,
}

impl TryFrom<GraphArgs> for MergePlans {
    type Error = MeridianError;

    fn try_from(val: GraphArgs) -> Result<Self, Self::Error> {
        Ok(MergePlans {
            plans: read_json_file::<Vec<Plan>>(&val.plans)?,
            mermaid: val.mermaid,
        })
    }
}

/// Search limits shared by `search`, `run` and `batch`
#[derive(ClapArgs)]
pub struct SearchOptions {
    #[arg(long, help = "Depth below which the search stops expanding [default: 2]")]
    pub max_depth: Option<usize>,
    #[arg(long, help = "Children per node before it counts as fully expanded [default: 2]")]
    pub max_children: Option<usize>,
    #[arg(long, help = "Merge the k best plans instead of every top-scoring plan")]
    pub top_k: Option<usize>,
    #[arg(long, help = "Stop the search after this many expansions")]
    pub max_expansions: Option<usize>,
}

/// Run only the plan search
#[derive(ClapArgs)]
pub struct SearchArgs {
    #[arg(help = "JSON script with the collaborator answers")]
    pub script: PathBuf,
    #[arg(help = "Question to plan for")]
    pub question: String,
    #[command(flatten)]
    pub options: SearchOptions,
}

/// Solve a question end to end
///
/// Searches for plans, merges the selected ones and executes the merged
/// graph. The report is archived unless --no-save is given.
#[derive(ClapArgs)]
pub struct RunArgs {
    #[arg(help = "JSON script with the collaborator answers")]
    pub script: PathBuf,
    #[arg(help = "Question to solve")]
    pub question: String,
    #[command(flatten)]
    pub options: SearchOptions,
    #[arg(long, help = "Execution iterations before the run is finalized [default: 50]")]
    pub max_steps: Option<usize>,
    #[arg(long, help = "Do not archive the run report")]
    pub no_save: bool,
    #[arg(long, help = "Print the run report as JSON")]
    pub json: bool,
}

/// Solve many questions in one go
///
/// The batch file is a JSON array of {"task_id", "question", "script"}
/// entries. Every task gets its own collaborators, search tree and graph.
/// Completed reports are archived unless --no-save is given; failed tasks
/// are listed with their error.
#[derive(ClapArgs)]
pub struct BatchArgs {
    #[arg(help = "JSON file holding the tasks")]
    pub tasks: PathBuf,
    #[arg(long, default_value_t = DEFAULT_WORKERS, help = "Questions solved at once")]
    pub workers: usize,
    #[arg(long, help = "Only run the first N tasks")]
    pub max_tasks: Option<usize>,
    #[command(flatten)]
    pub options: SearchOptions,
    #[arg(long, help = "Execution iterations before a run is finalized [default: 50]")]
    pub max_steps: Option<usize>,
    #[arg(long, help = "Do not archive the run reports")]
    pub no_save: bool,
    #[arg(long, help = "Print the task results as JSON")]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List archived runs, most recent first
    #[command(aliases = ["l", "ls"])]
    List(ListRunsArgs),
    /// Show the full report of an archived run
    #[command(alias = "s")]
    Show(ShowRunArgs),
    /// Delete an archived run permanently
    #[command(aliases = ["d", "rm"])]
    Delete(DeleteRunArgs),
}

#[derive(ClapArgs)]
pub struct ListRunsArgs {
    #[arg(short, long, help = "Maximum number of runs to list")]
    pub limit: Option<u32>,
}

impl From<ListRunsArgs> for ListRuns {
    fn from(val: ListRunsArgs) -> Self {
        ListRuns { limit: val.limit }
    }
}

#[derive(ClapArgs)]
pub struct ShowRunArgs {
    #[arg(help = "ID of the archived run to show")]
    pub id: u64,
}

impl From<ShowRunArgs> for Id {
    fn from(val: ShowRunArgs) -> Self {
        Id { id: val.id }
    }
}

#[derive(ClapArgs)]
pub struct DeleteRunArgs {
    #[arg(help = "ID of the archived run to delete")]
    pub id: u64,
    /// Confirm the deletion (required to prevent accidental deletion)
    #[arg(long)]
    pub confirm: bool,
}
