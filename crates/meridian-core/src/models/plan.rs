//! Plan model and single-step modifications.

use std::str::FromStr;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Step;

/// Ordered sequence of steps; order is execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Plan {
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns a copy of this plan with `modifications` applied in order.
    ///
    /// Removals and updates at positions outside the current plan are
    /// ignored. Insertions follow list-insert semantics: a position past the
    /// end appends and a negative position counts back from the end.
    pub fn apply_modifications(&self, modifications: &[Modification]) -> Plan {
        let mut modified = self.clone();
        for modification in modifications {
            modified.apply(modification);
        }
        modified
    }

    fn apply(&mut self, modification: &Modification) {
        let params = &modification.action_params;
        match modification.action {
            ActionType::Add => {
                let index = insert_index(params.position, self.steps.len());
                self.steps.insert(index, params.to_step());
            }
            ActionType::Remove => {
                if let Some(index) = existing_index(params.position, self.steps.len()) {
                    self.steps.remove(index);
                }
            }
            ActionType::Update => {
                if let Some(index) = existing_index(params.position, self.steps.len()) {
                    self.steps[index] = params.to_step();
                }
            }
            ActionType::Keep => {}
        }
    }
}

impl From<Vec<Step>> for Plan {
    fn from(steps: Vec<Step>) -> Self {
        Self::new(steps)
    }
}

fn insert_index(position: i64, len: usize) -> usize {
    if position < 0 {
        let back = usize::try_from(position.unsigned_abs()).unwrap_or(usize::MAX);
        len.saturating_sub(back)
    } else {
        usize::try_from(position).map_or(len, |p| p.min(len))
    }
}

fn existing_index(position: i64, len: usize) -> Option<usize> {
    usize::try_from(position).ok().filter(|&p| p < len)
}

/// Kind of edit a mutation applies to a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Insert a new step at the position
    Add,
    /// Delete the step at the position
    Remove,
    /// Replace the step at the position
    Update,
    /// Leave the plan unchanged
    Keep,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Add => "add",
            ActionType::Remove => "remove",
            ActionType::Update => "update",
            ActionType::Keep => "keep",
        }
    }
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "add" => Ok(ActionType::Add),
            "remove" => Ok(ActionType::Remove),
            "update" => Ok(ActionType::Update),
            "keep" => Ok(ActionType::Keep),
            _ => Err(format!(
                "Unknown action '{s}', expected one of: add, remove, update, keep"
            )),
        }
    }
}

/// Where a modification applies and, for add/update, the new step content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ActionParams {
    /// Zero-based position in the plan
    pub position: i64,

    /// Goal of the added or updated step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,

    /// Instructions of the added or updated step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl ActionParams {
    /// Step carried by an add/update; missing fields become empty strings.
    pub fn to_step(&self) -> Step {
        Step::new(
            self.goal.clone().unwrap_or_default(),
            self.instructions.clone().unwrap_or_default(),
        )
    }
}

/// A single edit proposed for a plan, with the reasoning behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Modification {
    #[serde(default)]
    pub rationale: String,
    pub action: ActionType,
    #[serde(default)]
    pub action_params: ActionParams,
}

impl Modification {
    pub fn add(position: i64, step: Step) -> Self {
        Self::with_step(ActionType::Add, position, step)
    }

    pub fn update(position: i64, step: Step) -> Self {
        Self::with_step(ActionType::Update, position, step)
    }

    pub fn remove(position: i64) -> Self {
        Self {
            rationale: String::new(),
            action: ActionType::Remove,
            action_params: ActionParams {
                position,
                ..Default::default()
            },
        }
    }

    pub fn keep() -> Self {
        Self {
            rationale: String::new(),
            action: ActionType::Keep,
            action_params: ActionParams {
                position: -1,
                ..Default::default()
            },
        }
    }

    /// Attach the reasoning that motivated this modification.
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    fn with_step(action: ActionType, position: i64, step: Step) -> Self {
        Self {
            rationale: String::new(),
            action,
            action_params: ActionParams {
                position,
                goal: Some(step.goal),
                instructions: Some(step.instructions),
            },
        }
    }
}
