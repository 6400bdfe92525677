//! Parameter structures shared by the CLI and the MCP server.
//!
//! These stay free of interface frameworks. The CLI wraps them in `clap`
//! argument structs and converts with `From`; the MCP server deserializes
//! them directly and, with the `schema` feature, advertises their JSON
//! schema.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (this module)   │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{Modification, Plan};

/// Generic parameters for operations requiring just an ID.
///
/// Used by show_run and delete_run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    /// The ID of the archived run
    pub id: u64,
}

/// Parameters for listing archived runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListRuns {
    /// Maximum number of runs to return, most recent first
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Parameters for applying modifications to a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ApplyModifications {
    /// The plan to start from
    pub plan: Plan,
    /// Modifications applied in order; out-of-range positions are ignored
    #[serde(default)]
    pub modifications: Vec<Modification>,
}

/// Parameters for merging plans into one execution graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct MergePlans {
    /// Plans merged in order; identical steps share one node
    pub plans: Vec<Plan>,
    /// Return Mermaid flowchart source instead of the markdown summary
    #[serde(default)]
    pub mermaid: bool,
}
