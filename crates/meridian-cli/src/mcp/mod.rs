//! MCP server implementation for Meridian
//!
//! Exposes the pure plan and graph operations and the run archive over the
//! Model Context Protocol on stdio. Solving itself needs model-backed
//! collaborators and is not offered as a tool.

use anyhow::Result;
use log::{debug, error, info};
use meridian_core::RunArchive;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use tokio::signal::unix::{signal, SignalKind};

pub mod errors;
pub mod handlers;

pub use handlers::{ApplyModifications, Id, ListRuns, McpResult, MergePlans};

const INSTRUCTIONS: &str = r#"Meridian solves research questions by searching over multi-step plans, merging the best plans into one execution graph and running that graph step by step. This server exposes the plan utilities and the archive of finished runs.

## Core Concepts
- **Plan**: an ordered list of steps, each with a `goal` and `instructions`
- **Modification**: an edit to a plan with `action` one of add, remove, update or keep, and `action_params` holding `position` plus `goal`/`instructions` for add and update
- **Plan graph**: plans merged so identical steps share a node, framed by START and END
- **Run**: an archived end-to-end solve with its answer, executed steps and merged graph

## Tools
- **Plans**: apply_modifications, merge_plans
- **Run archive**: list_runs, show_run, delete_run

## Tips
- Out-of-range positions are ignored, except that add past the end appends
- Use merge_plans with mermaid=true to get a flowchart of the merged graph
- Runs are listed most recent first"#;

/// MCP server for Meridian
#[derive(Clone)]
pub struct MeridianMcpServer {
    archive: RunArchive,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl MeridianMcpServer {
    pub fn new(archive: RunArchive) -> Self {
        Self {
            archive,
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> handlers::McpHandlers {
        handlers::McpHandlers::new(self.archive.clone())
    }

    #[tool(
        name = "apply_modifications",
        description = "Apply a list of modifications to a plan, in order, and return the resulting plan. Each modification has an action (add, remove, update, keep) and action_params with a zero-based position; add and update also take goal and instructions. Positions outside the plan are ignored, except that add past the end appends. The input plan is not changed."
    )]
    async fn apply_modifications(&self, params: Parameters<ApplyModifications>) -> McpResult {
        self.handlers().apply_modifications(params)
    }

    #[tool(
        name = "merge_plans",
        description = "Merge several plans into one execution graph where identical steps (same goal and instructions) share a node. Returns the steps, the edges and the current frontier as markdown, or Mermaid flowchart source when mermaid=true."
    )]
    async fn merge_plans(&self, params: Parameters<MergePlans>) -> McpResult {
        self.handlers().merge_plans(params)
    }

    #[tool(
        name = "list_runs",
        description = "List archived runs, most recent first, with question, answer, termination reason and step count. Use limit to cap the number of runs returned."
    )]
    async fn list_runs(&self, params: Parameters<ListRuns>) -> McpResult {
        self.handlers().list_runs(params).await
    }

    #[tool(
        name = "show_run",
        description = "Show the full report of an archived run: answer, termination reason, every executed or skipped step with its result, and the plans that were merged. Use the run ID from list_runs."
    )]
    async fn show_run(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_run(params).await
    }

    #[tool(
        name = "delete_run",
        description = "Permanently delete an archived run. This operation cannot be undone."
    )]
    async fn delete_run(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().delete_run(params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for MeridianMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "meridian".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport until the client disconnects or
/// the process receives SIGINT or SIGTERM
pub async fn run_stdio_server(server: MeridianMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Meridian MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(reason) => info!("MCP server stopped: {reason:?}"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
