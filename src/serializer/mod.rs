mod envelope;
mod formatter;
mod json;
pub use json::*;

use crate::{AggregateEvent, Event, EventSerializationError};

/// Turns events into text for storage or transport, and back.
pub trait EventSerializer: Send + Sync {
    fn serialize(&self, event: &dyn Event) -> Result<String, EventSerializationError>;

    fn deserialize(
        &self,
        serialized: &str,
    ) -> Result<Box<dyn AggregateEvent>, EventSerializationError>;
}
