use crate::{IdentityError, ResolveError, VersionError};

/// Boxed cause carried by the error variants that wrap a foreign failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Represents the failures an event serializer reports to its caller.
///
/// Every variant is terminal for the individual encode/decode attempt. Callers
/// can pattern-match on the two tiers: `MalformedEnvelope` means the text was
/// not a well-formed envelope at all, while `ReconstitutionFailure` means the
/// envelope was well-formed but its contents could not be turned back into an
/// event.
///
/// Example:
/// ```
/// use cqrs_event_codec::{EventSerializationError, EventSerializer, JsonEventSerializer};
///
/// let serializer: JsonEventSerializer = JsonEventSerializer::default();
/// match serializer.deserialize("   ") {
///     Err(EventSerializationError::MalformedEnvelope(reason)) => assert_eq!(reason, "empty string"),
///     other => panic!("unexpected result {other:?}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EventSerializationError {
    #[error("event type {event_type} does not implement {required}")]
    UnsupportedEventType {
        event_type: String,
        required: &'static str,
    },
    #[error("error serializing event {event_type}: {source}")]
    EncodingFailure {
        event_type: String,
        #[source]
        source: BoxError,
    },
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
    #[error("event type {0} cannot be found")]
    UnknownEventType(String),
    #[error("error reconstituting aggregate event: {0}")]
    ReconstitutionFailure(#[source] BoxError),
}

impl EventSerializationError {
    pub fn unsupported_event_type(event_type: impl Into<String>) -> Self {
        Self::UnsupportedEventType {
            event_type: event_type.into(),
            required: crate::AGGREGATE_EVENT_CAPABILITY,
        }
    }

    pub fn encoding_failure(event_type: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::EncodingFailure {
            event_type: event_type.into(),
            source: source.into(),
        }
    }

    pub fn malformed_envelope(reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope(reason.into())
    }

    pub fn reconstitution_failure(source: impl Into<BoxError>) -> Self {
        Self::ReconstitutionFailure(source.into())
    }
}

/// Failures raised while turning a well-formed envelope back into an event.
///
/// These never reach the caller directly: the serializer wraps them in
/// [`EventSerializationError::ReconstitutionFailure`].
#[derive(Debug, thiserror::Error)]
pub enum ReconstituteError {
    #[error("invalid createdAt {value}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("aggregate event identity class is not defined")]
    MissingIdentityClass,
    #[error("attribute {0} is not defined")]
    MissingAttribute(&'static str),
    #[error("attribute {name} must be {expected}")]
    InvalidAttribute {
        name: &'static str,
        expected: &'static str,
    },
    #[error("unexpected attribute {0}")]
    UnexpectedAttribute(String),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Version(#[from] VersionError),
    #[error("{0}")]
    Event(BoxError),
}
