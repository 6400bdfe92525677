//! Plan quality scores.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{MeridianError, Result};

/// Lowest value any score dimension may take.
pub const MIN_DIMENSION: u8 = 1;
/// Highest value any score dimension may take.
pub const MAX_DIMENSION: u8 = 3;

/// Three-dimensional quality score of a plan, each dimension in `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct PlanScore {
    pub effectiveness: u8,
    pub completeness: u8,
    pub executability: u8,
}

impl PlanScore {
    /// Builds a validated score.
    ///
    /// # Errors
    ///
    /// Returns `MeridianError::InvalidInput` naming the first dimension that
    /// falls outside `1..=3`.
    pub fn new(effectiveness: u8, completeness: u8, executability: u8) -> Result<Self> {
        let score = Self {
            effectiveness,
            completeness,
            executability,
        };
        score.validate()?;
        Ok(score)
    }

    /// Checks every dimension against the allowed range.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("effectiveness", self.effectiveness),
            ("completeness", self.completeness),
            ("executability", self.executability),
        ] {
            if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) {
                return Err(MeridianError::invalid_input(field).with_reason(format!(
                    "score {value} is outside {MIN_DIMENSION}..={MAX_DIMENSION}"
                )));
            }
        }
        Ok(())
    }

    /// Sum of the three dimensions (3..=9), unnormalized.
    pub fn total(&self) -> u32 {
        u32::from(self.effectiveness) + u32::from(self.completeness) + u32::from(self.executability)
    }
}
