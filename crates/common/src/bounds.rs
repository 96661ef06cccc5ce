// Inclusive integer ranges used for every random draw (iterations, payload
// length, delay seconds).

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoundsError {
    #[error("invalid bounds: min {min} is greater than max {max}")]
    Inverted { min: u64, max: u64 },

    #[error("invalid bounds: [{min}, {max}] must lie within [{floor}, {ceiling}]")]
    OutOfRange { min: u64, max: u64, floor: u64, ceiling: u64 },
}

/// Inclusive `[min, max]` range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Bounds {
    pub min: u64,
    pub max: u64,
}

impl Bounds {
    pub fn new(min: u64, max: u64) -> Result<Self, BoundsError> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    /// A range containing exactly one value.
    pub fn exactly(value: u64) -> Self {
        Self { min: value, max: value }
    }

    /// Check a value that bypassed `new` (e.g. deserialized from config).
    pub fn validate(&self) -> Result<(), BoundsError> {
        if self.min > self.max {
            return Err(BoundsError::Inverted { min: self.min, max: self.max });
        }
        Ok(())
    }

    /// `validate`, plus both ends inside `[floor, ceiling]`.
    pub fn validate_within(&self, floor: u64, ceiling: u64) -> Result<(), BoundsError> {
        self.validate()?;
        if self.min < floor || self.max > ceiling {
            return Err(BoundsError::OutOfRange { min: self.min, max: self.max, floor, ceiling });
        }
        Ok(())
    }

    pub fn contains(&self, value: u64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Uniform draw in `[min, max]`.
    ///
    /// Inverted bounds collapse to `min`; callers validate before sampling.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> u64 {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}
