//! Meridian CLI Application
//!
//! Command-line interface for the meridian question solver: plan and graph
//! utilities, scripted end-to-end runs, the run archive and an MCP server.

mod args;
mod cli;
mod mcp;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{run_stdio_server, MeridianMcpServer};
use meridian_core::{params::ListRuns, ArchiveBuilder};
use renderer::TerminalRenderer;
use Commands::*;

/// Runs listed when no subcommand is given
const RECENT_RUNS: u32 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        command,
    } = Args::parse();

    let archive = ArchiveBuilder::new()
        .with_database_path(database_file)
        .build()
        .await
        .context("Failed to initialize run archive")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("Meridian started");

    match command {
        Some(Plan { command }) => Cli::new(archive, renderer).handle_plan_command(command),
        Some(Graph(args)) => Cli::new(archive, renderer).merge_plans(args),
        Some(Search(args)) => Cli::new(archive, renderer).search(args).await,
        Some(Run(args)) => Cli::new(archive, renderer).run(args).await,
        Some(Batch(args)) => Cli::new(archive, renderer).batch(args).await,
        Some(History { command }) => {
            Cli::new(archive, renderer)
                .handle_history_command(command)
                .await
        }
        Some(Serve) => {
            info!("Starting Meridian MCP server");
            run_stdio_server(MeridianMcpServer::new(archive))
                .await
                .context("MCP server failed")
        }
        None => {
            Cli::new(archive, renderer)
                .list_runs(&ListRuns {
                    limit: Some(RECENT_RUNS),
                })
                .await
        }
    }
}
