use crate::{Identity, IdentityError, ParseIdentity};
use std::any::Any;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Identity backed by a UUID, rendered in lowercase hyphenated form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UuidIdentity(Uuid);

impl UuidIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UuidIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UuidIdentity {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl Display for UuidIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for UuidIdentity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl Identity for UuidIdentity {
    fn identity_type(&self) -> &'static str {
        Self::TYPE
    }

    fn value(&self) -> String {
        self.to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ParseIdentity for UuidIdentity {
    const TYPE: &'static str = "UuidIdentity";

    fn from_string(value: &str) -> Result<Self, IdentityError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|e| IdentityError::invalid_value(Self::TYPE, value, e))
    }
}
