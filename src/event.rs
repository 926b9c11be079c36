use crate::{AggregateVersion, BoxError, Identity};
use chrono::{DateTime, FixedOffset, SubsecRound, Utc};
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

/// Name of the capability an event needs to go through the serializer.
pub const AGGREGATE_EVENT_CAPABILITY: &str = "AggregateEvent";

pub type Payload = Map<String, Value>;
pub type Metadata = Map<String, Value>;
pub type Timestamp = DateTime<FixedOffset>;

pub trait Event: Debug + Send + Sync + 'static {
    fn event_type(&self) -> &str;
    fn payload(&self) -> &Payload;
    fn created_at(&self) -> Timestamp;

    /// Returns the aggregate view of this event when it has one.
    fn as_aggregate_event(&self) -> Option<&dyn AggregateEvent> {
        None
    }
}

/// An event recorded by a versioned aggregate.
pub trait AggregateEvent: Event {
    fn aggregate_id(&self) -> &Arc<dyn Identity>;
    fn aggregate_version(&self) -> AggregateVersion;
    fn metadata(&self) -> &Metadata;
    fn as_any(&self) -> &dyn Any;
}

impl<'a> PartialEq for dyn AggregateEvent + 'a {
    fn eq(&self, other: &Self) -> bool {
        self.event_type() == other.event_type()
            && self.payload() == other.payload()
            && self.created_at() == other.created_at()
            && self.aggregate_id() == other.aggregate_id()
            && self.aggregate_version() == other.aggregate_version()
            && self.metadata() == other.metadata()
    }
}

/// Attributes handed to [`ReconstituteEvent::reconstitute`] alongside the payload.
#[derive(Debug, Clone)]
pub struct EventAttributes {
    pub aggregate_id: Arc<dyn Identity>,
    pub aggregate_version: AggregateVersion,
    pub metadata: Metadata,
}

/// Aggregate events that can be rebuilt from their stored parts.
///
/// The `with_*` derivations never touch the receiver: they go through
/// [`ReconstituteEvent::reconstitute`] and return a new event, so any
/// validation the event performs applies to derived copies as well.
pub trait ReconstituteEvent: AggregateEvent + Sized {
    /// Registry name of the event type.
    const TYPE: &'static str;

    fn reconstitute(
        payload: Payload,
        created_at: Timestamp,
        attributes: EventAttributes,
    ) -> Result<Self, BoxError>;

    fn attributes(&self) -> EventAttributes {
        EventAttributes {
            aggregate_id: self.aggregate_id().clone(),
            aggregate_version: self.aggregate_version(),
            metadata: self.metadata().clone(),
        }
    }

    fn with_version(&self, aggregate_version: AggregateVersion) -> Result<Self, BoxError> {
        Self::reconstitute(
            self.payload().clone(),
            self.created_at(),
            EventAttributes {
                aggregate_version,
                ..self.attributes()
            },
        )
    }

    fn with_metadata(&self, metadata: Metadata) -> Result<Self, BoxError> {
        Self::reconstitute(
            self.payload().clone(),
            self.created_at(),
            EventAttributes {
                metadata,
                ..self.attributes()
            },
        )
    }

    /// Merges `metadata` over the current metadata; colliding keys take the new value.
    fn with_added_metadata(&self, metadata: Metadata) -> Result<Self, BoxError> {
        let mut merged = self.metadata().clone();
        merged.extend(metadata);
        self.with_metadata(merged)
    }
}

/// Immutable field holder embedded by concrete aggregate events.
///
/// Timestamps are kept to microsecond precision with a whole-minute UTC
/// offset, which is what the envelope's `createdAt` can carry.
#[derive(Debug, Clone)]
pub struct EventRecord {
    payload: Payload,
    created_at: Timestamp,
    aggregate_id: Arc<dyn Identity>,
    aggregate_version: AggregateVersion,
    metadata: Metadata,
}

impl EventRecord {
    /// Records a fresh event at the current time, truncated to microseconds.
    pub fn occurred<I: Identity>(aggregate_id: I, payload: Payload) -> Self {
        Self::occurred_at(aggregate_id, payload, Utc::now().fixed_offset())
    }

    pub fn occurred_at<I: Identity>(aggregate_id: I, payload: Payload, at: Timestamp) -> Self {
        Self {
            payload,
            created_at: storable(at),
            aggregate_id: Arc::new(aggregate_id),
            aggregate_version: AggregateVersion::default(),
            metadata: Metadata::new(),
        }
    }

    pub fn reconstitute(
        payload: Payload,
        created_at: Timestamp,
        attributes: EventAttributes,
    ) -> Self {
        Self {
            payload,
            created_at: storable(created_at),
            aggregate_id: attributes.aggregate_id,
            aggregate_version: attributes.aggregate_version,
            metadata: attributes.metadata,
        }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn aggregate_id(&self) -> &Arc<dyn Identity> {
        &self.aggregate_id
    }

    pub fn aggregate_version(&self) -> AggregateVersion {
        self.aggregate_version
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

fn storable(at: Timestamp) -> Timestamp {
    let at = at.trunc_subsecs(6);
    let seconds = at.offset().local_minus_utc();
    match FixedOffset::east_opt(seconds - seconds % 60) {
        Some(offset) => at.with_timezone(&offset),
        None => at,
    }
}

/// Implements [`Event`] and [`AggregateEvent`] for a type that implements
/// [`ReconstituteEvent`] and stores its fields in an [`EventRecord`].
///
/// The record field defaults to `record`.
///
/// ```
/// use cqrs_event_codec::{
///     aggregate_event, BoxError, EventAttributes, EventRecord, Payload, ReconstituteEvent,
///     Timestamp,
/// };
///
/// #[derive(Debug, Clone)]
/// pub struct AccountOpened {
///     record: EventRecord,
/// }
///
/// impl ReconstituteEvent for AccountOpened {
///     const TYPE: &'static str = "bank.AccountOpened";
///
///     fn reconstitute(
///         payload: Payload,
///         created_at: Timestamp,
///         attributes: EventAttributes,
///     ) -> Result<Self, BoxError> {
///         Ok(Self {
///             record: EventRecord::reconstitute(payload, created_at, attributes),
///         })
///     }
/// }
///
/// aggregate_event!(AccountOpened);
/// ```
#[macro_export]
macro_rules! aggregate_event {
    ($t:ty) => {
        $crate::aggregate_event!($t, record);
    };
    ($t:ty, $field:ident) => {
        impl $crate::Event for $t {
            fn event_type(&self) -> &str {
                <$t as $crate::ReconstituteEvent>::TYPE
            }

            fn payload(&self) -> &$crate::Payload {
                self.$field.payload()
            }

            fn created_at(&self) -> $crate::Timestamp {
                self.$field.created_at()
            }

            fn as_aggregate_event(&self) -> ::std::option::Option<&dyn $crate::AggregateEvent> {
                ::std::option::Option::Some(self)
            }
        }

        impl $crate::AggregateEvent for $t {
            fn aggregate_id(&self) -> &::std::sync::Arc<dyn $crate::Identity> {
                self.$field.aggregate_id()
            }

            fn aggregate_version(&self) -> $crate::AggregateVersion {
                self.$field.aggregate_version()
            }

            fn metadata(&self) -> &$crate::Metadata {
                self.$field.metadata()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    };
}
