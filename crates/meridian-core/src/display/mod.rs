//! Display formatting for models, trees and graphs.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! views that need context or a second format are newtype wrappers:
//!
//! - [`collections`]: [`RunSummaries`], [`Plans`] and [`BatchResults`]
//! - [`tree`]: [`TreeView`] of a search tree
//! - [`graph`]: markdown for [`crate::graph::PlanGraph`] and the [`Mermaid`]
//!   flowchart
//! - [`status`]: [`OperationStatus`] confirmations
//! - [`datetime`]: [`LocalDateTime`] and [`Elapsed`]
//!
//! Everything renders markdown, which the CLI passes through its terminal
//! renderer and the MCP server returns as text.

pub mod collections;
pub mod datetime;
pub mod graph;
pub mod models;
pub mod status;
pub mod tree;

pub use collections::{BatchResults, Plans, RunSummaries};
pub use datetime::{Elapsed, LocalDateTime};
pub use graph::Mermaid;
pub use status::OperationStatus;
pub use tree::TreeView;
