//! Operations shared by the CLI and the MCP server.
//!
//! Both front ends accept the same inputs (plans, modifications, scripts)
//! and must render them the same way, so the glue lives here.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{
    display::Mermaid,
    error::{MeridianError, Result},
    graph::PlanGraph,
    models::Plan,
    params::{ApplyModifications, MergePlans},
};

/// Reads and parses a JSON file.
///
/// # Errors
///
/// Returns `MeridianError::FileSystem` if the file cannot be read and
/// `MeridianError::Serialization` if it is not valid JSON for `T`.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path).map_err(|source| MeridianError::FileSystem {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Applies the requested modifications and returns the new plan.
///
/// ```rust
/// # use meridian_core::{models::{Modification, Plan, Step}, operations::apply_modifications, params::ApplyModifications};
/// let params = ApplyModifications {
///     plan: Plan::new(vec![Step::new("Find", "Search")]),
///     modifications: vec![Modification::remove(5)],
/// };
/// assert_eq!(apply_modifications(&params), params.plan);
/// ```
pub fn apply_modifications(params: &ApplyModifications) -> Plan {
    params.plan.apply_modifications(&params.modifications)
}

/// Merges the plans and renders the graph as markdown or Mermaid source.
pub fn merge_plans(params: &MergePlans) -> String {
    let graph = PlanGraph::from_plans(&params.plans);
    if params.mermaid {
        Mermaid(&graph).to_string()
    } else {
        graph.to_string()
    }
}
