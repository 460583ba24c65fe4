//! Connection resolution and the warehouse driver seam
//!
//! - `ConnectionSpec`: resolved connection descriptor built once from
//!   configuration; assembles the driver address with the two-segment
//!   `catalog.warehouse` namespace in the path
//! - `Connection`: the strategy trait the provisioner and sink depend on
//! - `StarrocksConnection`: the fixed production implementation speaking the
//!   MySQL wire protocol to the StarRocks frontend query port

use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::Conn;
use std::fmt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{Row, SensitiveString, Value};

/// Default StarRocks frontend query port (MySQL protocol)
pub const DEFAULT_PORT: u16 = 9030;

/// Resolved connection descriptor.
///
/// Created once at startup and reused for the lifetime of the stream-processing
/// context. The password never appears in Debug output or logs.
#[derive(Clone)]
pub struct ConnectionSpec {
    /// Frontend host or IP address
    pub host: String,
    /// Frontend query port
    pub port: u16,
    /// Username
    pub user: String,
    /// Password
    pub password: SensitiveString,
    /// Target external catalog
    pub catalog: String,
    /// Target warehouse (logical database) within the catalog
    pub warehouse: String,
}

impl ConnectionSpec {
    /// The two-segment namespace the connection is scoped to
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.catalog, self.warehouse)
    }

    /// Assemble the driver address.
    ///
    /// StarRocks frontends speak the MySQL wire protocol, so the address uses
    /// the `mysql://` scheme with `catalog.warehouse` as the database path.
    pub fn url(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.user,
            self.password.expose_secret(),
            self.host,
            self.port,
            self.namespace()
        )
    }

    /// The driver address with the password replaced, safe for logs
    pub fn redacted_url(&self) -> String {
        match url::Url::parse(&self.url()) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            }
            Err(_) => format!(
                "mysql://{}:***@{}:{}/{}",
                self.user,
                self.host,
                self.port,
                self.namespace()
            ),
        }
    }
}

impl fmt::Debug for ConnectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSpec")
            .field("url", &self.redacted_url())
            .finish()
    }
}

/// A connection to the warehouse
///
/// The narrow surface the provisioning component needs: plain-text queries for
/// metadata probes and DDL, parameterized statements for the insert path.
/// There is one fixed production implementation per warehouse family; tests
/// substitute scripted implementations.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Execute a query that returns rows
    async fn query(&self, sql: &str) -> Result<Vec<Row>>;

    /// Execute a statement that modifies data, returns affected row count
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Execute a query and return the first row
    async fn query_one(&self, sql: &str) -> Result<Option<Row>> {
        let rows = self.query(sql).await?;
        Ok(rows.into_iter().next())
    }

    /// Check if connection is valid/alive
    async fn is_valid(&self) -> bool;

    /// Close the connection
    async fn close(&self) -> Result<()>;
}

/// Classify a driver error into the crate's error taxonomy.
///
/// Server-side errors become `Error::Query` - the class the existence prober
/// is allowed to absorb. Transport and handshake failures keep their own
/// categories so genuine operational failures propagate.
fn map_driver_error(err: mysql_async::Error) -> Error {
    match err {
        mysql_async::Error::Server(server) => match server.code {
            1044 | 1045 => Error::authentication(format!(
                "{} (code {})",
                server.message, server.code
            )),
            code => Error::query(format!("server error {}: {}", code, server.message)),
        },
        mysql_async::Error::Io(io) => Error::connection_with_source("driver i/o failure", io),
        mysql_async::Error::Url(url) => Error::config(format!("invalid connection url: {}", url)),
        mysql_async::Error::Driver(driver) => Error::connection(format!("driver error: {}", driver)),
        mysql_async::Error::Other(other) => Error::internal(format!("driver failure: {}", other)),
    }
}

/// Convert a crate value to a driver parameter
fn to_driver_value(value: &Value) -> mysql_async::Value {
    match value {
        Value::Null => mysql_async::Value::NULL,
        Value::Bool(b) => mysql_async::Value::from(*b),
        Value::Int64(n) => mysql_async::Value::from(*n),
        Value::UInt64(n) => mysql_async::Value::from(*n),
        Value::Float64(n) => mysql_async::Value::from(*n),
        Value::String(s) => mysql_async::Value::from(s.clone()),
        Value::Bytes(b) => mysql_async::Value::from(b.clone()),
    }
}

/// Convert a driver value to a crate value
fn from_driver_value(value: mysql_async::Value) -> Value {
    match value {
        mysql_async::Value::NULL => Value::Null,
        mysql_async::Value::Bytes(b) => match String::from_utf8(b) {
            Ok(s) => Value::String(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        mysql_async::Value::Int(n) => Value::Int64(n),
        mysql_async::Value::UInt(n) => Value::UInt64(n),
        mysql_async::Value::Float(f) => Value::Float64(f64::from(f)),
        mysql_async::Value::Double(d) => Value::Float64(d),
        mysql_async::Value::Date(year, month, day, hour, min, sec, micro) => {
            if hour == 0 && min == 0 && sec == 0 && micro == 0 {
                Value::String(format!("{:04}-{:02}-{:02}", year, month, day))
            } else {
                Value::String(format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
                    year, month, day, hour, min, sec, micro
                ))
            }
        }
        mysql_async::Value::Time(neg, days, hours, minutes, seconds, micro) => {
            let sign = if neg { "-" } else { "" };
            Value::String(format!(
                "{}{:02}:{:02}:{:02}.{:06}",
                sign,
                u32::from(hours) + days * 24,
                minutes,
                seconds,
                micro
            ))
        }
    }
}

/// Production connection over the MySQL wire protocol.
///
/// The inner driver connection is taken out of the slot for the duration of a
/// call and put back afterwards, so the type is usable behind a shared
/// reference without handing out the driver connection itself.
pub struct StarrocksConnection {
    conn: Mutex<Option<Conn>>,
    namespace: String,
}

impl StarrocksConnection {
    /// Open a connection described by the given spec
    pub async fn connect(spec: &ConnectionSpec) -> Result<Self> {
        let opts = mysql_async::Opts::from_url(&spec.url())
            .map_err(|e| Error::config(format!("invalid connection url: {}", e)))?;

        debug!(url = %spec.redacted_url(), "connecting to StarRocks frontend");

        let conn = Conn::new(opts).await.map_err(map_driver_error)?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            namespace: spec.namespace(),
        })
    }

    /// The `catalog.warehouse` namespace this connection is scoped to
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn take_conn(&self) -> Result<Conn> {
        self.conn
            .lock()
            .await
            .take()
            .ok_or_else(|| Error::connection("connection not available"))
    }

    async fn put_conn(&self, conn: Conn) {
        *self.conn.lock().await = Some(conn);
    }
}

#[async_trait]
impl Connection for StarrocksConnection {
    async fn query(&self, sql: &str) -> Result<Vec<Row>> {
        let mut conn = self.take_conn().await?;

        let result: std::result::Result<Vec<mysql_async::Row>, mysql_async::Error> =
            conn.query(sql).await;

        match result {
            Ok(rows) => {
                self.put_conn(conn).await;
                let converted = rows
                    .into_iter()
                    .map(|row| {
                        let columns: Vec<String> = row
                            .columns_ref()
                            .iter()
                            .map(|c| c.name_str().into_owned())
                            .collect();
                        let values = row.unwrap().into_iter().map(from_driver_value).collect();
                        Row::new(columns, values)
                    })
                    .collect();
                Ok(converted)
            }
            Err(err) => {
                self.put_conn(conn).await;
                Err(map_driver_error(err))
            }
        }
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        let mut conn = self.take_conn().await?;

        // DDL goes through the text protocol; only parameterized statements
        // are prepared.
        let result = if params.is_empty() {
            conn.query_drop(sql).await
        } else {
            let driver_params: Vec<mysql_async::Value> =
                params.iter().map(to_driver_value).collect();
            conn.exec_drop(sql, driver_params).await
        };

        match result {
            Ok(()) => {
                let affected = conn.affected_rows();
                self.put_conn(conn).await;
                Ok(affected)
            }
            Err(err) => {
                self.put_conn(conn).await;
                Err(map_driver_error(err))
            }
        }
    }

    async fn is_valid(&self) -> bool {
        let Ok(mut conn) = self.take_conn().await else {
            return false;
        };
        let alive = conn.ping().await.is_ok();
        self.put_conn(conn).await;
        alive
    }

    async fn close(&self) -> Result<()> {
        if let Some(conn) = self.conn.lock().await.take() {
            conn.disconnect().await.map_err(map_driver_error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted connection for exercising the provisioner and sink without a
    //! live warehouse.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    pub(crate) struct ScriptedConnection {
        queries: StdMutex<Vec<String>>,
        statements: StdMutex<Vec<(String, usize)>>,
        query_script: StdMutex<VecDeque<Result<Vec<Row>>>>,
    }

    impl ScriptedConnection {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue the result the next `query` call returns. Unscripted calls
        /// return no rows.
        pub fn push_query_result(&self, result: Result<Vec<Row>>) {
            self.query_script.lock().unwrap().push_back(result);
        }

        /// A single-row result as produced by `SELECT EXISTS(...)`
        pub fn exists_result(exists: bool) -> Vec<Row> {
            vec![Row::new(
                vec!["exists".to_string()],
                vec![Value::Int64(i64::from(exists))],
            )]
        }

        pub fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }

        pub fn statements(&self) -> Vec<(String, usize)> {
            self.statements.lock().unwrap().clone()
        }

        pub fn ddl_statements(&self) -> Vec<String> {
            self.statements()
                .into_iter()
                .map(|(sql, _)| sql)
                .filter(|sql| sql.starts_with("CREATE"))
                .collect()
        }
    }

    #[async_trait]
    impl Connection for ScriptedConnection {
        async fn query(&self, sql: &str) -> Result<Vec<Row>> {
            self.queries.lock().unwrap().push(sql.to_string());
            match self.query_script.lock().unwrap().pop_front() {
                Some(result) => result,
                None => Ok(Vec::new()),
            }
        }

        async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
            self.statements
                .lock()
                .unwrap()
                .push((sql.to_string(), params.len()));
            Ok(1)
        }

        async fn is_valid(&self) -> bool {
            true
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ConnectionSpec {
        ConnectionSpec {
            host: "db".to_string(),
            port: 9030,
            user: "u".to_string(),
            password: SensitiveString::new("p"),
            catalog: "c".to_string(),
            warehouse: "w".to_string(),
        }
    }

    #[test]
    fn test_url_embeds_all_fields() {
        let url = spec().url();
        assert_eq!(url, "mysql://u:p@db:9030/c.w");
        assert!(url.contains("u"));
        assert!(url.contains("p"));
        assert!(url.contains("db"));
        assert!(url.contains("9030"));
        assert!(url.contains("c.w"));
    }

    #[test]
    fn test_namespace_is_two_segments() {
        assert_eq!(spec().namespace(), "c.w");
    }

    #[test]
    fn test_redacted_url_hides_password() {
        let redacted = spec().redacted_url();
        assert!(redacted.contains("***"));
        assert!(!redacted.contains(":p@"));
    }

    #[test]
    fn test_debug_never_prints_password() {
        let debug = format!("{:?}", spec());
        assert!(!debug.contains(":p@"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_default_port() {
        assert_eq!(DEFAULT_PORT, 9030);
    }

    #[test]
    fn test_value_param_conversion() {
        assert_eq!(to_driver_value(&Value::Null), mysql_async::Value::NULL);
        assert_eq!(
            to_driver_value(&Value::Int64(42)),
            mysql_async::Value::Int(42)
        );
        assert_eq!(
            to_driver_value(&Value::String("x".into())),
            mysql_async::Value::Bytes(b"x".to_vec())
        );
    }

    #[test]
    fn test_driver_value_conversion() {
        assert_eq!(from_driver_value(mysql_async::Value::NULL), Value::Null);
        assert_eq!(
            from_driver_value(mysql_async::Value::Int(1)),
            Value::Int64(1)
        );
        assert_eq!(
            from_driver_value(mysql_async::Value::Bytes(b"abc".to_vec())),
            Value::String("abc".to_string())
        );
        assert_eq!(
            from_driver_value(mysql_async::Value::Date(2026, 8, 8, 0, 0, 0, 0)),
            Value::String("2026-08-08".to_string())
        );
    }
}
