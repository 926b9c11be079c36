use crate::serializer::envelope::{
    AGGREGATE_ID, AGGREGATE_ID_CLASS, AGGREGATE_VERSION, Attributes, Envelope, METADATA,
    RawEnvelope, format_created_at, mapping_value, parse_created_at, stringify_big_integers,
};
use crate::{
    AggregateEvent, AggregateVersion, Event, EventAttributes, EventResolver,
    EventSerializationError, EventSerializer, IdentityResolver, Payload, ReconstituteError,
    ReconstituteFn, ResolveError, TypeRegistry,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, trace};

/// Serializes aggregate events to a four-field JSON envelope and back.
///
/// ```json
/// {
///   "class": "bank.AccountOpened",
///   "payload": {"owner": "bob"},
///   "createdAt": "2019-01-01T00:00:00.000000+00:00",
///   "attributes": {
///     "aggregateIdClass": "UuidIdentity",
///     "aggregateId": "3247cb6e-e9c7-4f3a-9c6c-0dec26a0353f",
///     "aggregateVersion": 0,
///     "metadata": {}
///   }
/// }
/// ```
///
/// Output is compact, keeps non-ASCII text and `/` unescaped, escapes
/// `&'"<>` as `\uXXXX`, and always writes floats with a decimal point. On
/// the way back, integers outside the 64-bit range are kept as exact decimal
/// strings.
///
/// The serializer holds no state besides the shared registry and can be used
/// from any number of threads at once.
#[derive(Debug, Clone)]
pub struct JsonEventSerializer<R = TypeRegistry> {
    registry: Arc<R>,
}

impl<R> JsonEventSerializer<R>
where
    R: EventResolver + IdentityResolver,
{
    #[must_use]
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    fn parse_envelope(&self, serialized: &str) -> Result<RawEnvelope, EventSerializationError> {
        if serialized
            .trim_matches(|c: char| c.is_ascii_whitespace() || c == '\0' || c == '\x0B')
            .is_empty()
        {
            return Err(EventSerializationError::malformed_envelope("empty string"));
        }

        let mut definition: Value = serde_json::from_str(serialized)
            .map_err(|e| EventSerializationError::malformed_envelope(e.to_string()))?;
        stringify_big_integers(&mut definition);
        trace!("Envelope parsed");

        if !definition.is_object() {
            return Err(EventSerializationError::malformed_envelope(
                "envelope must be a JSON object",
            ));
        }
        serde_json::from_value(definition)
            .map_err(|e| EventSerializationError::malformed_envelope(e.to_string()))
    }

    fn resolve_event(&self, class: &str) -> Result<ReconstituteFn, EventSerializationError> {
        self.registry.resolve_event(class).map_err(|e| match e {
            ResolveError::NotFound(name) => EventSerializationError::UnknownEventType(name),
            ResolveError::NotAggregateEvent(name) | ResolveError::NotIdentity(name) => {
                EventSerializationError::unsupported_event_type(name)
            }
        })
    }

    fn reconstitute(
        &self,
        reconstitute: &ReconstituteFn,
        payload: Payload,
        created_at: &str,
        attributes: Map<String, Value>,
    ) -> Result<Box<dyn AggregateEvent>, ReconstituteError> {
        let created_at = parse_created_at(created_at)?;
        let attributes = self.event_attributes(attributes)?;
        trace!(
            aggregate_version = %attributes.aggregate_version,
            "Attributes resolved"
        );
        reconstitute(payload, created_at, attributes).map_err(ReconstituteError::Event)
    }

    fn event_attributes(
        &self,
        mut attributes: Map<String, Value>,
    ) -> Result<EventAttributes, ReconstituteError> {
        let identity_type = match attributes.remove(AGGREGATE_ID_CLASS) {
            None | Some(Value::Null) => return Err(ReconstituteError::MissingIdentityClass),
            Some(Value::String(identity_type)) => identity_type,
            Some(_) => {
                return Err(ReconstituteError::InvalidAttribute {
                    name: AGGREGATE_ID_CLASS,
                    expected: "a string",
                });
            }
        };
        let parse = self.registry.resolve_identity(&identity_type)?;

        let aggregate_id = match attributes.remove(AGGREGATE_ID) {
            Some(Value::String(value)) => parse(&value)?,
            None => return Err(ReconstituteError::MissingAttribute(AGGREGATE_ID)),
            Some(_) => {
                return Err(ReconstituteError::InvalidAttribute {
                    name: AGGREGATE_ID,
                    expected: "a string",
                });
            }
        };

        let aggregate_version = match attributes.remove(AGGREGATE_VERSION) {
            Some(value) => AggregateVersion::try_from(&value)?,
            None => return Err(ReconstituteError::MissingAttribute(AGGREGATE_VERSION)),
        };

        let metadata = match attributes.remove(METADATA) {
            Some(value) => mapping_value(value).ok_or(ReconstituteError::InvalidAttribute {
                name: METADATA,
                expected: "a mapping",
            })?,
            None => return Err(ReconstituteError::MissingAttribute(METADATA)),
        };

        if let Some(name) = attributes.keys().next() {
            return Err(ReconstituteError::UnexpectedAttribute(name.clone()));
        }

        Ok(EventAttributes {
            aggregate_id,
            aggregate_version,
            metadata,
        })
    }
}

impl Default for JsonEventSerializer<TypeRegistry> {
    fn default() -> Self {
        Self::new(Arc::new(TypeRegistry::default()))
    }
}

impl<R> EventSerializer for JsonEventSerializer<R>
where
    R: EventResolver + IdentityResolver,
{
    fn serialize(&self, event: &dyn Event) -> Result<String, EventSerializationError> {
        let Some(aggregate_event) = event.as_aggregate_event() else {
            return Err(EventSerializationError::unsupported_event_type(
                event.event_type(),
            ));
        };

        let aggregate_id = aggregate_event.aggregate_id();
        let envelope = Envelope {
            class: aggregate_event.event_type(),
            payload: aggregate_event.payload(),
            created_at: format_created_at(&aggregate_event.created_at()),
            attributes: Attributes {
                aggregate_id_class: aggregate_id.identity_type(),
                aggregate_id: aggregate_id.value(),
                aggregate_version: aggregate_event.aggregate_version().value(),
                metadata: aggregate_event.metadata(),
            },
        };

        let serialized = envelope
            .to_json()
            .map_err(|e| EventSerializationError::encoding_failure(envelope.class, e))?;
        debug!(
            event_type = envelope.class,
            aggregate_version = envelope.attributes.aggregate_version,
            "Event serialized"
        );
        Ok(serialized)
    }

    fn deserialize(
        &self,
        serialized: &str,
    ) -> Result<Box<dyn AggregateEvent>, EventSerializationError> {
        let RawEnvelope {
            class,
            payload,
            created_at,
            attributes,
        } = self.parse_envelope(serialized)?;

        let reconstitute = self.resolve_event(&class)?;
        trace!(event_type = %class, "Event type resolved");

        let event = self
            .reconstitute(&reconstitute, payload, &created_at, attributes)
            .map_err(EventSerializationError::reconstitution_failure)?;
        debug!(
            event_type = %class,
            aggregate_version = %event.aggregate_version(),
            "Event deserialized"
        );
        Ok(event)
    }
}
