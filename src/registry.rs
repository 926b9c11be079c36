use crate::{
    AggregateEvent, BoxError, EventAttributes, Identity, IdentityError, ParseIdentity, Payload,
    ReconstituteEvent, Timestamp,
};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::{trace, warn};

pub type ReconstituteFn = Arc<
    dyn Fn(Payload, Timestamp, EventAttributes) -> Result<Box<dyn AggregateEvent>, BoxError>
        + Send
        + Sync,
>;

pub type ParseFn = Arc<dyn Fn(&str) -> Result<Arc<dyn Identity>, IdentityError> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("type {0} cannot be found")]
    NotFound(String),
    #[error("type {0} is not an aggregate event")]
    NotAggregateEvent(String),
    #[error("type {0} is not an identity")]
    NotIdentity(String),
}

/// Maps an event type name to the function rebuilding events of that type.
pub trait EventResolver: Send + Sync {
    fn resolve_event(&self, event_type: &str) -> Result<ReconstituteFn, ResolveError>;
}

/// Maps an identity type name to the function parsing identities of that type.
pub trait IdentityResolver: Send + Sync {
    fn resolve_identity(&self, identity_type: &str) -> Result<ParseFn, ResolveError>;
}

#[derive(Clone)]
enum Registration {
    AggregateEvent(ReconstituteFn),
    Event,
    Identity(ParseFn),
}

impl Debug for Registration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Registration::AggregateEvent(_) => f.write_str("AggregateEvent"),
            Registration::Event => f.write_str("Event"),
            Registration::Identity(_) => f.write_str("Identity"),
        }
    }
}

/// Process-wide table of the event and identity types a serializer may
/// encounter, keyed by type name.
///
/// All names share one namespace, so asking for an identity under an event
/// name is reported as [`ResolveError::NotIdentity`] rather than
/// [`ResolveError::NotFound`]. The registry is filled once at startup and
/// then shared read-only.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Registration>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_aggregate_event<E>(self) -> Self
    where
        E: ReconstituteEvent,
    {
        let reconstitute: ReconstituteFn = Arc::new(|payload, created_at, attributes| {
            E::reconstitute(payload, created_at, attributes)
                .map(|event| Box::new(event) as Box<dyn AggregateEvent>)
        });
        self.register(E::TYPE, Registration::AggregateEvent(reconstitute))
    }

    /// Registers an event type that has no aggregate capability.
    #[must_use]
    pub fn with_event_type(self, event_type: &str) -> Self {
        self.register(event_type, Registration::Event)
    }

    #[must_use]
    pub fn with_identity<I>(self) -> Self
    where
        I: ParseIdentity,
    {
        let parse: ParseFn = Arc::new(|value: &str| {
            I::from_string(value).map(|identity| Arc::new(identity) as Arc<dyn Identity>)
        });
        self.register(I::TYPE, Registration::Identity(parse))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn register(mut self, type_name: &str, registration: Registration) -> Self {
        trace!(type_name, kind = ?registration, "Registering type");
        if let Some(previous) = self.types.insert(type_name.to_string(), registration) {
            warn!(type_name, previous = ?previous, "Type registration replaced");
        }
        self
    }
}

impl EventResolver for TypeRegistry {
    fn resolve_event(&self, event_type: &str) -> Result<ReconstituteFn, ResolveError> {
        match self.types.get(event_type) {
            Some(Registration::AggregateEvent(reconstitute)) => Ok(reconstitute.clone()),
            Some(_) => Err(ResolveError::NotAggregateEvent(event_type.to_string())),
            None => Err(ResolveError::NotFound(event_type.to_string())),
        }
    }
}

impl IdentityResolver for TypeRegistry {
    fn resolve_identity(&self, identity_type: &str) -> Result<ParseFn, ResolveError> {
        match self.types.get(identity_type) {
            Some(Registration::Identity(parse)) => Ok(parse.clone()),
            Some(_) => Err(ResolveError::NotIdentity(identity_type.to_string())),
            None => Err(ResolveError::NotFound(identity_type.to_string())),
        }
    }
}
