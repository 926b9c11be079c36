#![allow(dead_code)]

use cqrs_event_codec::{
    BoxError, Event, EventAttributes, EventRecord, Payload, ReconstituteEvent, Timestamp,
    TypeRegistry, UuidIdentity, aggregate_event,
};
use serde_json::{Value, json};

pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

pub fn registry() -> TypeRegistry {
    TypeRegistry::new()
        .with_aggregate_event::<TodoListCreated>()
        .with_aggregate_event::<TodoAdded>()
        .with_event_type(TodoListViewed::TYPE)
        .with_identity::<UuidIdentity>()
}

#[derive(Debug, Clone)]
pub struct TodoListCreated {
    record: EventRecord,
}

impl TodoListCreated {
    pub fn instance(aggregate_id: UuidIdentity, payload: Payload) -> Self {
        Self {
            record: EventRecord::occurred(aggregate_id, payload),
        }
    }

    pub fn instance_at(aggregate_id: UuidIdentity, payload: Payload, at: Timestamp) -> Self {
        Self {
            record: EventRecord::occurred_at(aggregate_id, payload, at),
        }
    }
}

impl ReconstituteEvent for TodoListCreated {
    const TYPE: &'static str = "todolist.TodoListCreated";

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

aggregate_event!(TodoListCreated);

#[derive(Debug, Clone)]
pub struct TodoAdded {
    record: EventRecord,
}

impl TodoAdded {
    pub fn instance(aggregate_id: UuidIdentity, todo_id: &str, title: &str) -> Self {
        Self {
            record: EventRecord::occurred(
                aggregate_id,
                payload(json!({ "todoId": todo_id, "title": title })),
            ),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.record.payload().get("title").and_then(Value::as_str)
    }
}

impl ReconstituteEvent for TodoAdded {
    const TYPE: &'static str = "todolist.TodoAdded";

    fn reconstitute(
        payload: Payload,
        created_at: Timestamp,
        attributes: EventAttributes,
    ) -> Result<Self, BoxError> {
        if !payload.get("title").is_some_and(Value::is_string) {
            return Err("todo added without title".into());
        }
        Ok(Self {
            record: EventRecord::reconstitute(payload, created_at, attributes),
        })
    }
}

aggregate_event!(TodoAdded);

/// Read-side notification: known to the registry but not an aggregate event.
#[derive(Debug, Clone)]
pub struct TodoListViewed {
    payload: Payload,
    created_at: Timestamp,
}

impl TodoListViewed {
    pub const TYPE: &'static str = "todolist.TodoListViewed";

    pub fn new(viewer: &str) -> Self {
        Self {
            payload: payload(json!({ "viewer": viewer })),
            created_at: chrono::Utc::now().fixed_offset(),
        }
    }
}

impl Event for TodoListViewed {
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
