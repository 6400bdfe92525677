//! Step model definition.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One unit of work inside a plan.
///
/// Steps have no identity of their own: two steps are the same step when
/// both the goal and the instructions match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Step {
    /// What the step should achieve
    pub goal: String,

    /// How the goal should be achieved
    pub instructions: String,
}

impl Step {
    pub fn new(goal: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            instructions: instructions.into(),
        }
    }
}

/// A step paired with the result it produced, in execution context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CompletedStep {
    pub step: Step,
    pub result: String,
}
