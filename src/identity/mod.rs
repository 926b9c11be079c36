#[cfg(feature = "uuid")]
mod uuid_identity;
#[cfg(feature = "uuid")]
pub use uuid_identity::*;

use std::any::Any;
use std::fmt::Debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid {identity_type} value {value:?}: {reason}")]
    InvalidValue {
        identity_type: &'static str,
        value: String,
        reason: String,
    },
}

impl IdentityError {
    pub fn invalid_value(
        identity_type: &'static str,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidValue {
            identity_type,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// An opaque, type-tagged value identifying one aggregate instance.
pub trait Identity: Debug + Send + Sync + 'static {
    /// Registry name of the concrete identity type.
    fn identity_type(&self) -> &'static str;

    /// Canonical string form, accepted back by [`ParseIdentity::from_string`].
    fn value(&self) -> String;

    fn as_any(&self) -> &dyn Any;
}

/// Identities that can be rebuilt from their canonical string form.
pub trait ParseIdentity: Identity + Sized {
    const TYPE: &'static str;

    fn from_string(value: &str) -> Result<Self, IdentityError>;
}

impl<'a> PartialEq for dyn Identity + 'a {
    fn eq(&self, other: &Self) -> bool {
        self.identity_type() == other.identity_type() && self.value() == other.value()
    }
}

impl<'a> Eq for dyn Identity + 'a {}
