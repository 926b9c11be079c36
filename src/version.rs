use serde_json::Value;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("aggregate version must be a non-negative integer, {0} given")]
    Negative(i64),
    #[error("aggregate version must be a non-negative integer, {0} given")]
    NotAnInteger(String),
    #[error("aggregate version 0 has no previous version")]
    NoPrevious,
}

/// Position of an event within its aggregate's stream.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AggregateVersion(u64);

impl AggregateVersion {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn previous(&self) -> Result<Self, VersionError> {
        self.0
            .checked_sub(1)
            .map(Self)
            .ok_or(VersionError::NoPrevious)
    }

    pub fn is_equal_to(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Display for AggregateVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<u64> for AggregateVersion {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl TryFrom<i64> for AggregateVersion {
    type Error = VersionError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| VersionError::Negative(value))
    }
}

impl TryFrom<&Value> for AggregateVersion {
    type Error = VersionError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    Ok(Self(v))
                } else if let Some(v) = n.as_i64() {
                    Self::try_from(v)
                } else {
                    Err(VersionError::NotAnInteger(n.to_string()))
                }
            }
            other => Err(VersionError::NotAnInteger(other.to_string())),
        }
    }
}
