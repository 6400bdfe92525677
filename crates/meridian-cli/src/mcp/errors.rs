//! Error handling utilities for the MCP server

use meridian_core::MeridianError;
use rmcp::ErrorData;

/// Converts a core error into an MCP internal error, prefixed with context
pub fn to_mcp_error(message: &str, error: &MeridianError) -> ErrorData {
    ErrorData::internal_error(format!("{message}: {error}"), None)
}
