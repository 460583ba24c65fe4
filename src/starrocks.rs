//! StarRocks sink connector
//!
//! This module provides a sink connector for streaming data into StarRocks
//! tables backed by an external (e.g. Iceberg) catalog, speaking the MySQL
//! wire protocol to the frontend query port.
//!
//! # Features
//!
//! - **Schema-driven provisioning** - each stream's JSON-Schema document is
//!   mapped to warehouse columns and the target table is created on demand
//! - **Catalog-quirk tolerance** - existence probes that external catalogs
//!   reject are treated as "absent"; the create path is idempotent on its own
//! - **Bounded text columns** - string properties without a length hint get
//!   VARCHAR(65535), since the dialect rejects unbounded variable-length text
//! - **Parameterized inserts** - record data never appears in SQL text
//! - **Secret-safe configuration** - the password is redacted in logs, debug
//!   output and config dumps
//!
//! # Limitations
//!
//! Primary-key and partition-key hints from the upstream pipeline are
//! accepted but not applied; tables are created as plain columnar tables.
//! Temporary tables are not supported.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use validator::Validate;

use crate::connect::{
    AnySink, CheckDetail, CheckResult, ConnectorSpec, Sink, SinkFactory, SinkRegistry,
    SourceEvent, SourceEventType, WriteResult,
};
use crate::connection::{Connection, ConnectionSpec, StarrocksConnection, DEFAULT_PORT};
use crate::dialect::{validate_identifier, StarrocksDialect};
use crate::error::{Error, Result};
use crate::provision::TableProvisioner;
use crate::schema::StreamSchema;
use crate::types::{SensitiveString, TableIdent, Value};

// ─────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────

/// Configuration for the StarRocks sink
#[derive(Debug, Clone, Deserialize, Serialize, Validate, JsonSchema)]
pub struct StarrocksSinkConfig {
    /// StarRocks cluster FE host or IP address
    #[validate(length(min = 1, max = 255))]
    pub host: String,

    /// StarRocks cluster FE query port (MySQL protocol, typically 9030)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username for the StarRocks connection
    #[validate(length(min = 1, max = 255))]
    pub user: String,

    /// Password for the StarRocks connection
    pub password: SensitiveString,

    /// Target Iceberg catalog in StarRocks
    #[validate(length(min = 1, max = 255))]
    pub catalog: String,

    /// Target Iceberg warehouse (logical database) within the catalog
    #[validate(length(min = 1, max = 255))]
    pub warehouse: String,

    /// Number of rows per insert statement
    #[serde(default = "default_batch_size")]
    #[validate(range(min = 1, max = 100_000))]
    pub batch_size: usize,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_batch_size() -> usize {
    1000
}

impl StarrocksSinkConfig {
    /// Validate that the catalog and warehouse names are safe identifiers
    pub fn validate_identifiers(&self) -> std::result::Result<(), String> {
        validate_identifier("catalog", &self.catalog).map_err(|e| e.to_string())?;
        validate_identifier("warehouse", &self.warehouse).map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Resolve the connection descriptor this configuration describes
    pub fn connection_spec(&self) -> ConnectionSpec {
        ConnectionSpec {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            catalog: self.catalog.clone(),
            warehouse: self.warehouse.clone(),
        }
    }
}

impl Default for StarrocksSinkConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            user: String::new(),
            password: SensitiveString::new(""),
            catalog: String::new(),
            warehouse: String::new(),
            batch_size: default_batch_size(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Per-stream write state
// ─────────────────────────────────────────────────────────────────

/// Buffered state for one open stream
struct StreamState {
    ident: TableIdent,
    /// Column names in schema document order
    columns: Vec<String>,
    /// Buffered rows, one `Value` per column
    rows: Vec<Vec<Value>>,
    pending_bytes: u64,
}

impl StreamState {
    fn push_record(&mut self, data: &serde_json::Value) {
        let row: Vec<Value> = self
            .columns
            .iter()
            .map(|column| data.get(column).map(Value::from_json).unwrap_or(Value::Null))
            .collect();
        self.rows.push(row);
        self.pending_bytes += data.to_string().len() as u64;
    }
}

async fn flush_stream<C: Connection>(
    connection: &C,
    dialect: &StarrocksDialect,
    state: &mut StreamState,
    result: &mut WriteResult,
) -> Result<()> {
    if state.rows.is_empty() {
        return Ok(());
    }
    let row_count = state.rows.len();
    let columns: Vec<&str> = state.columns.iter().map(String::as_str).collect();
    let sql = dialect.insert_sql(&state.ident, &columns, row_count);
    let params: Vec<Value> = state.rows.drain(..).flatten().collect();
    connection.execute(&sql, &params).await?;

    debug!(table = %state.ident, rows = row_count, "flushed batch");
    result.add_success(row_count as u64, state.pending_bytes);
    state.pending_bytes = 0;
    Ok(())
}

/// Drive the event loop against an open connection.
///
/// Split from [`Sink::write`] so the stream lifecycle can be exercised
/// against any [`Connection`] implementation.
async fn write_events<C: Connection>(
    config: &StarrocksSinkConfig,
    connection: Arc<C>,
    mut events: BoxStream<'static, SourceEvent>,
) -> Result<WriteResult> {
    let provisioner = TableProvisioner::new(connection.clone());
    let dialect = StarrocksDialect;
    let mut streams: HashMap<String, StreamState> = HashMap::new();
    let mut result = WriteResult::new();

    info!(
        catalog = %config.catalog,
        warehouse = %config.warehouse,
        batch_size = config.batch_size,
        "starting StarRocks sink"
    );

    while let Some(event) = events.next().await {
        match event.event_type {
            SourceEventType::Schema => {
                // A re-announced schema supersedes the previous one; flush
                // rows buffered under the old column order first.
                if let Some(previous) = streams.get_mut(&event.stream) {
                    flush_stream(connection.as_ref(), &dialect, previous, &mut result).await?;
                }

                validate_identifier("stream", &event.stream)?;

                let schema = StreamSchema::from_value(&event.data)?;
                let ident = TableIdent::new(config.warehouse.clone(), event.stream.clone())
                    .with_catalog(config.catalog.clone());

                let columns: Vec<String> = schema
                    .usable_properties()
                    .ok_or_else(|| {
                        Error::schema(format!(
                            "stream schema for table {} declares no properties",
                            ident
                        ))
                    })?
                    .keys()
                    .cloned()
                    .collect();

                let key_properties = event.key_properties();
                provisioner
                    .ensure_table(&ident, &schema, &key_properties, &[])
                    .await?;

                streams.insert(
                    event.stream,
                    StreamState {
                        ident,
                        columns,
                        rows: Vec::new(),
                        pending_bytes: 0,
                    },
                );
            }
            SourceEventType::Record => {
                let state = streams.get_mut(&event.stream).ok_or_else(|| {
                    Error::schema(format!(
                        "record for stream '{}' arrived before its schema",
                        event.stream
                    ))
                })?;
                state.push_record(&event.data);
                if state.rows.len() >= config.batch_size {
                    flush_stream(connection.as_ref(), &dialect, state, &mut result).await?;
                }
            }
            SourceEventType::State | SourceEventType::Log => {
                debug!(event_type = %event.event_type, "skipping control event");
            }
        }
    }

    // Drain partial batches before reporting
    for state in streams.values_mut() {
        flush_stream(connection.as_ref(), &dialect, state, &mut result).await?;
    }

    info!(
        records = result.records_written,
        bytes = result.bytes_written,
        "StarRocks sink completed"
    );
    Ok(result)
}

// ─────────────────────────────────────────────────────────────────
// Sink implementation
// ─────────────────────────────────────────────────────────────────

/// StarRocks sink implementation
#[derive(Debug, Default)]
pub struct StarrocksSink;

impl StarrocksSink {
    /// Create a new StarRocks sink instance
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Sink for StarrocksSink {
    type Config = StarrocksSinkConfig;

    fn spec() -> ConnectorSpec {
        ConnectorSpec::new("starrocks", env!("CARGO_PKG_VERSION"))
            .description(
                "StarRocks sink - schema-driven table provisioning and ingestion over external catalogs",
            )
            .config_schema_from::<StarrocksSinkConfig>()
            .metadata("protocol", "mysql")
            .metadata("catalog", "iceberg")
            .metadata("provisioning", "create-if-absent")
    }

    async fn check(&self, config: &Self::Config) -> Result<CheckResult> {
        let mut builder = CheckResult::builder();

        let t0 = Instant::now();
        match config.validate_identifiers() {
            Ok(()) => {
                builder = builder.check(
                    CheckDetail::passed("config")
                        .with_duration_ms(t0.elapsed().as_millis() as u64),
                );
            }
            Err(e) => {
                builder = builder.check(CheckDetail::failed("config", e));
                return Ok(builder.build());
            }
        }

        let spec = config.connection_spec();
        info!(url = %spec.redacted_url(), "checking StarRocks connectivity");

        let t1 = Instant::now();
        match StarrocksConnection::connect(&spec).await {
            Ok(connection) => {
                match connection.query_one("SELECT 1").await {
                    Ok(_) => {
                        builder = builder.check(
                            CheckDetail::passed("connectivity")
                                .with_duration_ms(t1.elapsed().as_millis() as u64),
                        );
                    }
                    Err(e) => {
                        builder = builder.check(
                            CheckDetail::failed("connectivity", e.to_string())
                                .with_duration_ms(t1.elapsed().as_millis() as u64),
                        );
                    }
                }
                let _ = connection.close().await;
            }
            Err(e) => {
                builder = builder.check(
                    CheckDetail::failed("connectivity", e.to_string())
                        .with_duration_ms(t1.elapsed().as_millis() as u64),
                );
            }
        }

        Ok(builder.build())
    }

    async fn write(
        &self,
        config: &Self::Config,
        events: BoxStream<'static, SourceEvent>,
    ) -> Result<WriteResult> {
        config.validate_identifiers().map_err(Error::config)?;

        let spec = config.connection_spec();
        let connection = Arc::new(StarrocksConnection::connect(&spec).await?);

        let result = write_events(config, connection.clone(), events).await;
        let _ = connection.close().await;
        result
    }
}

#[async_trait]
impl AnySink for StarrocksSink {
    async fn check_raw(&self, config: &serde_yaml::Value) -> Result<CheckResult> {
        let typed: StarrocksSinkConfig = serde_yaml::from_value(config.clone())?;
        typed
            .validate()
            .map_err(|e| Error::config(e.to_string()))?;
        Sink::check(self, &typed).await
    }

    async fn write_raw(
        &self,
        config: &serde_yaml::Value,
        events: BoxStream<'static, SourceEvent>,
    ) -> Result<WriteResult> {
        let typed: StarrocksSinkConfig = serde_yaml::from_value(config.clone())?;
        typed
            .validate()
            .map_err(|e| Error::config(e.to_string()))?;
        Sink::write(self, &typed, events).await
    }
}

// ─────────────────────────────────────────────────────────────────
// Factory & registration
// ─────────────────────────────────────────────────────────────────

/// Factory for creating StarRocks sink instances
pub struct StarrocksSinkFactory;

impl SinkFactory for StarrocksSinkFactory {
    fn spec(&self) -> ConnectorSpec {
        <StarrocksSink as Sink>::spec()
    }

    fn create(&self) -> Result<Box<dyn AnySink>> {
        Ok(Box::new(StarrocksSink::new()))
    }
}

/// Register the StarRocks sink with the given registry
pub fn register(registry: &mut SinkRegistry) {
    registry.register("starrocks", Arc::new(StarrocksSinkFactory));
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
