//! Connector specification types

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Connector specification describing its capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSpec {
    /// Unique connector type identifier (e.g., "starrocks")
    pub connector_type: String,

    /// Semantic version
    pub version: String,

    /// Human-readable description
    pub description: Option<String>,

    /// Documentation URL
    pub documentation_url: Option<String>,

    /// JSON Schema for the connector's configuration
    pub config_schema: Option<serde_json::Value>,

    /// Custom metadata
    pub metadata: HashMap<String, String>,
}

impl ConnectorSpec {
    /// Create a new connector spec
    pub fn new(connector_type: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            connector_type: connector_type.into(),
            version: version.into(),
            description: None,
            documentation_url: None,
            config_schema: None,
            metadata: HashMap::new(),
        }
    }

    /// Set description
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Set documentation URL
    pub fn documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }

    /// Set config schema from a type implementing JsonSchema
    pub fn config_schema_from<T: JsonSchema>(mut self) -> Self {
        let schema = schemars::schema_for!(T);
        self.config_schema = Some(serde_json::to_value(schema).unwrap_or_default());
        self
    }

    /// Add metadata
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
