//! # starrocks-sink
//!
//! A StarRocks sink connector for streaming data-integration pipelines.
//!
//! The connector receives self-describing record streams - each stream carries
//! a JSON-Schema document plus a sequence of records - and persists them into
//! StarRocks tables layered over an external catalog (e.g. an Iceberg
//! catalog). The core of the crate is schema-driven table provisioning:
//! deciding whether a target table exists, creating it when absent, and
//! mapping every schema property to a warehouse column type, including the
//! workarounds catalog-backed deployments need.
//!
//! ## Features
//!
//! - **Type mapping**: pure, deterministic JSON-Schema property to column-type
//!   mapping; text columns without a length hint are bounded at VARCHAR(65535)
//! - **Existence probing**: metadata introspection that external catalogs
//!   reject is absorbed and treated as "table absent" instead of failing the
//!   stream; genuine operational failures still propagate
//! - **Idempotent provisioning**: a single `CREATE TABLE IF NOT EXISTS` per
//!   stream, safe under concurrent or repeated invocation
//! - **Connection resolution**: a six-field configuration resolved once into a
//!   MySQL-protocol address scoped to the `catalog.warehouse` namespace
//! - **Connector SDK surface**: typed configuration with validation, a
//!   `spec`/`check`/`write` lifecycle and a registry for runtime dispatch
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use starrocks_sink::prelude::*;
//! use std::sync::Arc;
//!
//! let mut sinks = SinkRegistry::new();
//! starrocks_sink::starrocks::register(&mut sinks);
//!
//! let config: StarrocksSinkConfig = serde_yaml::from_str(r#"
//! host: fe.example.com
//! user: ingest
//! password: secret
//! catalog: iceberg_prod
//! warehouse: analytics
//! "#)?;
//!
//! let sink = StarrocksSink::new();
//! let check = sink.check(&config).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod connect;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod provision;
pub mod schema;
pub mod starrocks;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    // Error types
    pub use crate::error::{Error, ErrorCategory, Result};

    // Value and identity types
    pub use crate::types::{ColumnSpec, ColumnType, Row, SensitiveString, TableIdent, Value};

    // Connector SDK surface
    pub use crate::connect::{
        AnySink, CheckDetail, CheckResult, ConnectorSpec, Sink, SinkConfig, SinkFactory,
        SinkRegistry, SourceEvent, SourceEventType, WriteResult,
    };

    // Connection types
    pub use crate::connection::{Connection, ConnectionSpec, StarrocksConnection, DEFAULT_PORT};

    // Dialect and schema mapping
    pub use crate::dialect::StarrocksDialect;
    pub use crate::schema::{
        map_property, PropertySchema, StreamSchema, TypeSet, DEFAULT_VARCHAR_LENGTH,
    };

    // Provisioning
    pub use crate::provision::TableProvisioner;

    // The connector
    pub use crate::starrocks::{StarrocksSink, StarrocksSinkConfig, StarrocksSinkFactory};
}

// Re-export commonly used items at crate root
pub use error::{Error, Result};
pub use types::Value;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        // Ensure common types are accessible
        let _value = Value::Int64(42);
        let _dialect = StarrocksDialect;
        let _config = StarrocksSinkConfig::default();
        let _registry = SinkRegistry::new();
        assert_eq!(DEFAULT_VARCHAR_LENGTH, 65_535);
        assert_eq!(DEFAULT_PORT, 9030);
    }

    #[test]
    fn test_error_types() {
        let err = Error::connection("test error");
        assert!(err.is_retriable());
        assert_eq!(err.category(), ErrorCategory::Connection);
    }

    #[test]
    fn test_type_mapping_via_prelude() {
        let prop: PropertySchema =
            serde_json::from_value(serde_json::json!({"type": "string"})).unwrap();
        assert_eq!(map_property(&prop), ColumnType::Varchar(65_535));
    }

    #[test]
    fn test_table_ident_via_prelude() {
        let ident = TableIdent::parse("catalog1.warehouse1.events").unwrap();
        assert_eq!(ident.qualified_name(), "catalog1.warehouse1.events");
    }
}
