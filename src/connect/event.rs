//! Events delivered to the sink by the surrounding runtime

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An event flowing into a sink connector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEvent {
    /// Event type
    pub event_type: SourceEventType,

    /// Stream name this event belongs to
    pub stream: String,

    /// Namespace (e.g., schema, database)
    pub namespace: Option<String>,

    /// Event timestamp (source system time)
    pub timestamp: DateTime<Utc>,

    /// Event data: the record payload, or the stream's JSON-Schema document
    /// for `Schema` events
    pub data: serde_json::Value,

    /// Additional metadata
    #[serde(default)]
    pub metadata: EventMetadata,
}

impl SourceEvent {
    /// Create a record event
    pub fn record(stream: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: SourceEventType::Record,
            stream: stream.into(),
            namespace: None,
            timestamp: Utc::now(),
            data,
            metadata: EventMetadata::default(),
        }
    }

    /// Create a schema event carrying the stream's JSON-Schema document
    pub fn schema(stream: impl Into<String>, document: serde_json::Value) -> Self {
        Self {
            event_type: SourceEventType::Schema,
            stream: stream.into(),
            namespace: None,
            timestamp: Utc::now(),
            data: document,
            metadata: EventMetadata::default(),
        }
    }

    /// Create a state event
    pub fn state(data: serde_json::Value) -> Self {
        Self {
            event_type: SourceEventType::State,
            stream: "_state".to_string(),
            namespace: None,
            timestamp: Utc::now(),
            data,
            metadata: EventMetadata::default(),
        }
    }

    /// Set namespace (builder-style)
    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = Some(ns.into());
        self
    }

    /// Attach the stream's key properties (builder-style, schema events)
    pub fn with_key_properties(mut self, keys: Vec<String>) -> Self {
        self.metadata
            .extra
            .insert("key_properties".to_string(), serde_json::json!(keys));
        self
    }

    /// Key properties declared for this stream, if any
    pub fn key_properties(&self) -> Vec<String> {
        self.metadata
            .extra
            .get("key_properties")
            .and_then(|v| v.as_array())
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check if this is a data event
    pub fn is_data(&self) -> bool {
        matches!(self.event_type, SourceEventType::Record)
    }
}

/// Type of event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceEventType {
    /// A data record
    Record,
    /// A stream schema announcement
    Schema,
    /// State/checkpoint information
    State,
    /// Log message
    Log,
}

impl SourceEventType {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Schema => "schema",
            Self::State => "state",
            Self::Log => "log",
        }
    }
}

impl std::fmt::Display for SourceEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Source position for checkpointing (offset, LSN, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    /// Additional metadata
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_event() {
        let event = SourceEvent::record("users", json!({"id": 1, "name": "Alice"}));
        assert_eq!(event.event_type, SourceEventType::Record);
        assert_eq!(event.stream, "users");
        assert!(event.is_data());
    }

    #[test]
    fn test_schema_event_with_keys() {
        let event = SourceEvent::schema(
            "users",
            json!({"properties": {"id": {"type": "integer"}}}),
        )
        .with_key_properties(vec!["id".to_string()]);

        assert_eq!(event.event_type, SourceEventType::Schema);
        assert!(!event.is_data());
        assert_eq!(event.key_properties(), vec!["id".to_string()]);
    }

    #[test]
    fn test_key_properties_absent() {
        let event = SourceEvent::record("users", json!({}));
        assert!(event.key_properties().is_empty());
    }

    #[test]
    fn test_event_type_display() {
        assert_eq!(SourceEventType::Schema.to_string(), "schema");
        assert_eq!(SourceEventType::Record.to_string(), "record");
    }
}
