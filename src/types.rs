//! Common types for starrocks-sink
//!
//! - `SensitiveString`: secret wrapper that never leaks through Debug/Display
//! - `Value`: the subset of SQL values JSON rows can produce
//! - `TableIdent`: fully-qualified table identity (catalog, namespace, table)
//! - `ColumnType` / `ColumnSpec`: warehouse column descriptors

use schemars::JsonSchema;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A wrapper around `SecretString` that provides safe handling of sensitive values.
///
/// This type:
/// - Redacts the value in `Debug` and `Display` output to prevent credential leaks in logs
/// - Serializes as `"***REDACTED***"` to prevent accidental exposure in config dumps
/// - Provides `expose_secret()` to access the actual value when needed
#[derive(Clone)]
pub struct SensitiveString(SecretString);

impl SensitiveString {
    /// Create a new sensitive string from any string-like value
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Expose the secret value.
    ///
    /// Use sparingly - only when the actual value is needed (e.g., for authentication).
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for SensitiveString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl std::fmt::Display for SensitiveString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl From<String> for SensitiveString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SensitiveString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Serialize as redacted to prevent accidental exposure in config dumps/logs
impl Serialize for SensitiveString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str("***REDACTED***")
    }
}

/// Deserialize from the actual string value
impl<'de> Deserialize<'de> for SensitiveString {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

impl JsonSchema for SensitiveString {
    fn schema_name() -> String {
        "SensitiveString".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        // Schema looks like a normal string but with format hint
        let mut schema = gen.subschema_for::<String>();
        if let schemars::schema::Schema::Object(obj) = &mut schema {
            obj.format = Some("password".to_string());
            obj.metadata().description = Some(
                "Sensitive value (passwords, API keys, etc.). Will be redacted in logs."
                    .to_string(),
            );
        }
        schema
    }
}

/// SQL value that can hold anything a JSON record produces
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit unsigned integer
    UInt64(u64),
    /// 64-bit floating point
    Float64(f64),
    /// Text string
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
}

impl Value {
    /// Check if value is NULL
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to convert to bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int64(n) => Some(*n != 0),
            Self::UInt64(n) => Some(*n != 0),
            _ => None,
        }
    }

    /// Try to convert to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(n) => Some(*n),
            Self::UInt64(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Try to convert to string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Convert a JSON value into a SQL value.
    ///
    /// Objects and arrays are serialized to their JSON text, matching the
    /// serialized-text column the type mapper assigns them.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int64(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt64(u)
                } else {
                    Self::Float64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Self::String(s.clone()),
            composite => Self::String(composite.to_string()),
        }
    }
}

/// Database row as ordered column values
#[derive(Debug, Clone)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Create a new row
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Get column count
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if row is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get column names
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get value by column index
    #[inline]
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Get value by column name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .and_then(|idx| self.values.get(idx))
    }
}

/// Fully-qualified table identity: catalog, namespace and table name.
///
/// The catalog segment is informational only once a connection exists - the
/// connection is already scoped to `catalog.warehouse`, so generated SQL
/// references `namespace.table` at most.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIdent {
    /// External catalog (fixed per connection)
    pub catalog: Option<String>,
    /// Logical database grouping the table
    pub namespace: Option<String>,
    /// Table name
    pub table: String,
}

impl TableIdent {
    /// Create an identity from namespace and table
    pub fn new(namespace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            catalog: None,
            namespace: Some(namespace.into()),
            table: table.into(),
        }
    }

    /// Create a bare identity resolved against the connection's default database
    pub fn bare(table: impl Into<String>) -> Self {
        Self {
            catalog: None,
            namespace: None,
            table: table.into(),
        }
    }

    /// Set the catalog segment
    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Parse a dotted full table name with one, two or three segments:
    /// `table`, `namespace.table` or `catalog.namespace.table`.
    pub fn parse(full_name: &str) -> Result<Self> {
        let parts: Vec<&str> = full_name.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(Error::schema(format!(
                "invalid table name '{}': empty segment",
                full_name
            )));
        }
        match parts.as_slice() {
            [table] => Ok(Self::bare(*table)),
            [namespace, table] => Ok(Self::new(*namespace, *table)),
            [catalog, namespace, table] => {
                Ok(Self::new(*namespace, *table).with_catalog(*catalog))
            }
            _ => Err(Error::schema(format!(
                "invalid table name '{}': expected at most catalog.namespace.table",
                full_name
            ))),
        }
    }

    /// Get the dotted fully qualified name
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if let Some(catalog) = &self.catalog {
            parts.push(catalog);
        }
        if let Some(namespace) = &self.namespace {
            parts.push(namespace);
        }
        parts.push(&self.table);
        parts.join(".")
    }
}

impl std::fmt::Display for TableIdent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

/// Warehouse column type with length/precision where the dialect requires one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// BOOLEAN
    Boolean,
    /// BIGINT
    BigInt,
    /// DOUBLE
    Double,
    /// VARCHAR with an explicit maximum length (the dialect rejects unbounded text)
    Varchar(u32),
    /// DATE
    Date,
    /// DATETIME
    DateTime,
}

/// Column descriptor derived from a stream-schema property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name
    pub name: String,
    /// Warehouse type
    pub column_type: ColumnType,
}

impl ColumnSpec {
    /// Create a new column descriptor
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}
