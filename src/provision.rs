//! Schema-driven table provisioning
//!
//! The stream-open flow: given a stream's schema and its target table
//! identity, decide whether the table exists and create it when absent.
//! Catalog-backed warehouses make both halves of that awkward:
//!
//! - metadata introspection against external catalogs can fail with a
//!   server-side statement error whether or not the table exists, so the
//!   existence probe recovers from exactly that error class and reports the
//!   table as absent;
//! - the create step therefore must be idempotent on its own, which is why it
//!   is a single `CREATE TABLE IF NOT EXISTS` with no pre-check that could
//!   race a concurrent provisioner.

use std::sync::Arc;
use tracing::{debug, info};

use crate::connection::Connection;
use crate::dialect::{validate_identifier, StarrocksDialect};
use crate::error::{Error, ErrorCategory, Result};
use crate::schema::{map_property, StreamSchema};
use crate::types::{ColumnSpec, TableIdent, Value};

/// Provisions warehouse tables from stream schemas.
///
/// Holds a shared connection for the stream-processing context's lifetime;
/// imposes no cross-stream locking. Concurrent provisioners racing on the same
/// table name rely on the catalog's create-if-absent semantics.
pub struct TableProvisioner<C> {
    connection: Arc<C>,
    dialect: StarrocksDialect,
}

impl<C: Connection> TableProvisioner<C> {
    /// Create a provisioner over the given connection
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            connection,
            dialect: StarrocksDialect,
        }
    }

    /// Check whether the table exists.
    ///
    /// Recovers from the introspection error class certain catalog back-ends
    /// raise for this probe (`ErrorCategory::Query`): the table is reported
    /// absent and a diagnostic is logged. Treating the failure as "absent" is
    /// safe because the subsequent create is idempotent. Any other error
    /// class (connectivity, authentication, ...) propagates unchanged.
    pub async fn table_exists(&self, ident: &TableIdent) -> Result<bool> {
        let sql = self.dialect.table_exists_sql(ident);
        match self.connection.query(&sql).await {
            Ok(rows) => Ok(rows
                .first()
                .and_then(|row| row.get(0))
                .and_then(Value::as_bool)
                .unwrap_or(false)),
            Err(err) if err.category() == ErrorCategory::Query => {
                info!(
                    table = %ident,
                    error = %err,
                    "existence probe rejected by the catalog, treating table as absent"
                );
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Create the table for a stream schema.
    ///
    /// `primary_keys` and `partition_keys` are accepted for interface
    /// compatibility with the surrounding runtime but are not applied: the
    /// table is created as a plain columnar table. This is a known limitation
    /// of the external-catalog integration, not an oversight.
    ///
    /// Issues exactly one `CREATE TABLE IF NOT EXISTS`, with columns in the
    /// schema document's property order. Repeated or concurrent invocation
    /// for an already-shaped table is a no-op at the catalog layer.
    pub async fn create_table(
        &self,
        ident: &TableIdent,
        schema: &StreamSchema,
        primary_keys: &[String],
        partition_keys: &[String],
        as_temp: bool,
    ) -> Result<()> {
        if as_temp {
            return Err(Error::unsupported(format!(
                "temporary tables are not supported for {}",
                ident
            )));
        }

        let properties = schema.usable_properties().ok_or_else(|| {
            Error::schema(format!(
                "stream schema for table {} declares no properties",
                ident
            ))
        })?;

        if !primary_keys.is_empty() || !partition_keys.is_empty() {
            debug!(
                table = %ident,
                primary_keys = ?primary_keys,
                partition_keys = ?partition_keys,
                "key and partition hints are not applied to external-catalog tables"
            );
        }

        if let Some(namespace) = ident.namespace.as_deref() {
            validate_identifier("namespace", namespace)?;
        }
        validate_identifier("table", &ident.table)?;

        let mut columns = Vec::with_capacity(properties.len());
        for (name, property) in properties {
            validate_identifier("column", name)?;
            columns.push(ColumnSpec::new(name, map_property(property)));
        }

        let sql = self.dialect.create_table_sql(ident, &columns);
        self.connection.execute(&sql, &[]).await?;

        info!(table = %ident, columns = columns.len(), "created table if absent");
        Ok(())
    }

    /// The stream-open flow: probe for the table and create it when absent.
    ///
    /// Returns `true` when a create statement was issued.
    pub async fn ensure_table(
        &self,
        ident: &TableIdent,
        schema: &StreamSchema,
        primary_keys: &[String],
        partition_keys: &[String],
    ) -> Result<bool> {
        if self.table_exists(ident).await? {
            debug!(table = %ident, "table already exists");
            return Ok(false);
        }
        self.create_table(ident, schema, primary_keys, partition_keys, false)
            .await?;
        Ok(true)
    }
}
