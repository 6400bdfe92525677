//! MCP tool handlers implementation

use log::debug;
use meridian_core::{
    display::{OperationStatus, RunSummaries},
    operations, params as core, RunArchive,
};
use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    ErrorData,
};
use schemars::JsonSchema;
use serde::Deserialize;

use super::errors::to_mcp_error;

// Core parameter types stay free of MCP concerns. This transparent wrapper
// adds the Deserialize/JsonSchema plumbing rmcp needs and hands the inner
// value through unchanged.

/// Generic MCP wrapper for core parameter types
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

pub type Id = McpParams<core::Id>;
pub type ListRuns = McpParams<core::ListRuns>;
pub type ApplyModifications = McpParams<core::ApplyModifications>;
pub type MergePlans = McpParams<core::MergePlans>;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn text(body: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(body.into())])
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    archive: RunArchive,
}

impl McpHandlers {
    pub fn new(archive: RunArchive) -> Self {
        Self { archive }
    }

    pub fn apply_modifications(
        &self,
        Parameters(params): Parameters<ApplyModifications>,
    ) -> McpResult {
        debug!("apply_modifications: {:?}", params);

        let plan = operations::apply_modifications(params.as_ref());
        Ok(text(format!("# Modified plan\n\n{plan}")))
    }

    pub fn merge_plans(&self, Parameters(params): Parameters<MergePlans>) -> McpResult {
        debug!("merge_plans: {:?}", params);

        Ok(text(operations::merge_plans(params.as_ref())))
    }

    pub async fn list_runs(&self, Parameters(params): Parameters<ListRuns>) -> McpResult {
        debug!("list_runs: {:?}", params);

        let runs = RunSummaries(
            self.archive
                .list(params.as_ref())
                .await
                .map_err(|e| to_mcp_error("Failed to list runs", &e))?,
        );

        if runs.is_empty() {
            Ok(text(runs.to_string()))
        } else {
            Ok(text(format!("# Runs\n\n{runs}")))
        }
    }

    pub async fn show_run(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_run: {:?}", params);

        let record = self
            .archive
            .get(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get run", &e))?
            .ok_or_else(|| {
                ErrorData::internal_error(
                    format!("Run with ID {} not found", params.as_ref().id),
                    None,
                )
            })?;

        Ok(text(record.to_string()))
    }

    pub async fn delete_run(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("delete_run: {:?}", params);

        let record = self
            .archive
            .delete(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to delete run", &e))?;

        let status = OperationStatus::success(format!(
            "Permanently deleted run {} ('{}'). This action cannot be undone.",
            record.id, record.report.question
        ));
        Ok(text(status.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use meridian_core::{
        models::{Modification, Plan, Step},
        ArchiveBuilder,
    };
    use tempfile::TempDir;

    use super::*;

    async fn handlers() -> (TempDir, McpHandlers) {
        let dir = TempDir::new().unwrap();
        let archive = ArchiveBuilder::new()
            .with_database_path(Some(dir.path().join("runs.db")))
            .build()
            .await
            .unwrap();
        (dir, McpHandlers::new(archive))
    }

    fn body(result: &CallToolResult) -> String {
        serde_json::to_string(result).unwrap()
    }

    #[tokio::test]
    async fn test_apply_modifications_tool() {
        let (_dir, handlers) = handlers().await;
        let params = McpParams(core::ApplyModifications {
            plan: Plan::new(vec![Step::new("Find", "Search")]),
            modifications: vec![Modification::add(5, Step::new("Verify", "Check"))],
        });

        let result = handlers.apply_modifications(Parameters(params)).unwrap();
        let text = body(&result);
        assert!(text.contains("# Modified plan"));
        assert!(text.contains("2. **Verify**: Check"));
    }

    #[tokio::test]
    async fn test_merge_plans_tool_renders_mermaid() {
        let (_dir, handlers) = handlers().await;
        let params = McpParams(core::MergePlans {
            plans: vec![Plan::new(vec![Step::new("Find", "Search")])],
            mermaid: true,
        });

        let result = handlers.merge_plans(Parameters(params)).unwrap();
        assert!(body(&result).contains("flowchart TD"));
    }

    #[tokio::test]
    async fn test_archive_tools_on_empty_archive() {
        let (_dir, handlers) = handlers().await;

        let listed = handlers
            .list_runs(Parameters(McpParams(core::ListRuns::default())))
            .await
            .unwrap();
        assert!(body(&listed).contains("No runs found."));

        let missing = handlers
            .show_run(Parameters(McpParams(core::Id { id: 9 })))
            .await
            .unwrap_err();
        assert!(missing.message.contains("Run with ID 9 not found"));

        let deleted = handlers
            .delete_run(Parameters(McpParams(core::Id { id: 9 })))
            .await
            .unwrap_err();
        assert!(deleted.message.contains("Failed to delete run"));
    }
}
