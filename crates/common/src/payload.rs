// Random alphanumeric payloads: written to the journal and used verbatim as
// the commit message.

use std::fmt::{Display, Formatter};

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bounds::{Bounds, BoundsError};

/// Longest payload `generate` will draw. The payload is passed to
/// `git commit -m`, so it has to fit comfortably in one argv entry.
pub const MAX_PAYLOAD_LEN: u64 = 4096;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload is empty")]
    Empty,

    #[error("payload contains non-alphanumeric character {0:?}")]
    InvalidChar(char),
}

/// An immutable `[A-Za-z0-9]+` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Payload(String);

impl Payload {
    /// Draw a length from `length`, then that many alphanumeric characters.
    pub fn generate<R: Rng>(rng: &mut R, length: Bounds) -> Result<Self, BoundsError> {
        Self::check_length(&length)?;
        let len = length.sample(rng) as usize;
        let text: String = (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect();
        Ok(Self(text))
    }

    /// Length bounds must be ordered and lie within `1..=MAX_PAYLOAD_LEN`.
    pub fn check_length(length: &Bounds) -> Result<(), BoundsError> {
        length.validate_within(1, MAX_PAYLOAD_LEN)
    }

    pub fn parse(input: &str) -> Result<Self, PayloadError> {
        if input.is_empty() {
            return Err(PayloadError::Empty);
        }
        if let Some(bad) = input.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(PayloadError::InvalidChar(bad));
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Display for Payload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Payload {
    type Error = PayloadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Payload> for String {
    fn from(payload: Payload) -> Self {
        payload.0
    }
}

/// Whether a run draws a fresh payload per iteration or reuses one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PayloadMode {
    #[default]
    PerIteration,
    PerRun,
}
