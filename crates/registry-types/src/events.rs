//! # Audit Events
//!
//! The append-only record written once per committed mutation. Events are
//! strictly for audit; the registry never reconstructs state by replaying
//! them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{EntityId, Timestamp};

/// Mutation class of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Create,
    Update,
    Delete,
}

/// Attribute snapshot maps attached to update events.
pub type Attributes = Map<String, Value>;

/// One mutation of one entity, as appended to the event stream.
///
/// Create and delete events carry no attribute snapshots; update events carry
/// the pre-mutation values of the patched keys (`attributes_before`) and the
/// patch itself (`attributes_after`) so any two log entries can be diffed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Row id of the mutated entity.
    pub entity_id: EntityId,
    /// Entity type name, e.g. `"GranularCertificateBundle"`.
    pub entity_name: String,
    /// Mutation class.
    pub event_type: EventType,
    /// Pre-mutation values of the patched keys (update events only).
    pub attributes_before: Option<Attributes>,
    /// The applied patch (update events only).
    pub attributes_after: Option<Attributes>,
    /// When the mutation was committed.
    pub timestamp: Timestamp,
}

impl Event {
    /// Event for a freshly created entity.
    pub fn created(entity_id: EntityId, entity_name: &str, timestamp: Timestamp) -> Self {
        Self {
            entity_id,
            entity_name: entity_name.to_string(),
            event_type: EventType::Create,
            attributes_before: None,
            attributes_after: None,
            timestamp,
        }
    }

    /// Event for an updated entity, with before/after snapshots.
    pub fn updated(
        entity_id: EntityId,
        entity_name: &str,
        attributes_before: Attributes,
        attributes_after: Attributes,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            entity_id,
            entity_name: entity_name.to_string(),
            event_type: EventType::Update,
            attributes_before: Some(attributes_before),
            attributes_after: Some(attributes_after),
            timestamp,
        }
    }

    /// Event for a soft-deleted entity.
    pub fn deleted(entity_id: EntityId, entity_name: &str, timestamp: Timestamp) -> Self {
        Self {
            entity_id,
            entity_name: entity_name.to_string(),
            event_type: EventType::Delete,
            attributes_before: None,
            attributes_after: None,
            timestamp,
        }
    }
}

/// An [`Event`] as recorded in a stream, with its assigned position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Unique id stamped at append time.
    pub id: Uuid,
    /// Zero-based position within the stream; append order.
    pub position: u64,
    /// The recorded payload.
    pub event: Event,
}
