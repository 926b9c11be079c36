use crate::{
    BoxError, Event, EventAttributes, EventRecord, Identity, IdentityError, ParseIdentity,
    Payload, ReconstituteEvent, Timestamp, TypeRegistry,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::any::Any;

#[derive(Debug, Clone, thiserror::Error)]
pub enum TestError {
    #[error("{0}")]
    Validation(String),
}

impl From<&str> for TestError {
    fn from(value: &str) -> Self {
        Self::Validation(value.to_string())
    }
}

pub fn at(value: &str) -> Timestamp {
    DateTime::parse_from_rfc3339(value).unwrap()
}

pub fn registry() -> TypeRegistry {
    let registry = TypeRegistry::new()
        .with_aggregate_event::<AccountOpened>()
        .with_aggregate_event::<FundsDeposited>()
        .with_event_type(PlainNotification::TYPE)
        .with_identity::<AccountNumber>();
    #[cfg(feature = "uuid")]
    let registry = registry.with_identity::<crate::UuidIdentity>();
    registry
}

// Test identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNumber(String);

impl From<&str> for AccountNumber {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Identity for AccountNumber {
    fn identity_type(&self) -> &'static str {
        Self::TYPE
    }

    fn value(&self) -> String {
        self.0.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ParseIdentity for AccountNumber {
    const TYPE: &'static str = "AccountNumber";

    fn from_string(value: &str) -> Result<Self, IdentityError> {
        if value.is_empty() {
            return Err(IdentityError::invalid_value(
                Self::TYPE,
                value,
                "account number cannot be empty",
            ));
        }
        Ok(Self(value.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct AccountOpened {
    record: EventRecord,
}

impl AccountOpened {
    pub fn occurred<I: Identity>(aggregate_id: I, owner: &str) -> Self {
        let payload = json!({ "owner": owner }).as_object().cloned().unwrap();
        Self {
            record: EventRecord::occurred(aggregate_id, payload),
        }
    }
}

impl ReconstituteEvent for AccountOpened {
    const TYPE: &'static str = "bank.AccountOpened";

    fn reconstitute(
        payload: Payload,
        created_at: Timestamp,
        attributes: EventAttributes,
    ) -> Result<Self, BoxError> {
        Ok(Self {
            record: EventRecord::reconstitute(payload, created_at, attributes),
        })
    }
}

crate::aggregate_event!(AccountOpened);

/// Rejects payloads without an `amount`.
#[derive(Debug, Clone)]
pub struct FundsDeposited {
    state: EventRecord,
}

impl ReconstituteEvent for FundsDeposited {
    const TYPE: &'static str = "bank.FundsDeposited";

    fn reconstitute(
        payload: Payload,
        created_at: Timestamp,
        attributes: EventAttributes,
    ) -> Result<Self, BoxError> {
        if !payload.contains_key("amount") {
            return Err(TestError::from("funds deposited without amount").into());
        }
        Ok(Self {
            state: EventRecord::reconstitute(payload, created_at, attributes),
        })
    }
}

crate::aggregate_event!(FundsDeposited, state);

/// An event with no aggregate behind it.
#[derive(Debug, Clone)]
pub struct PlainNotification {
    payload: Payload,
    created_at: Timestamp,
}

impl PlainNotification {
    pub const TYPE: &'static str = "bank.Notification";

    pub fn new(message: &str) -> Self {
        Self {
            payload: json!({ "message": message }).as_object().cloned().unwrap(),
            created_at: Utc::now().fixed_offset(),
        }
    }
}

impl Event for PlainNotification {
    fn event_type(&self) -> &str {
        Self::TYPE
    }

    fn payload(&self) -> &Payload {
        &self.payload
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
