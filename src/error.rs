//! Error types for starrocks-sink
//!
//! Provides granular error classification so callers can decide how to react:
//! - Retriable errors (connection, timeout) belong to the surrounding runtime's
//!   retry policy; nothing inside this crate retries.
//! - The `Query` category is the server-side "programming error" class that
//!   StarRocks surfaces for metadata probes against external catalogs. The
//!   existence prober recovers from exactly this category and no other.

use std::fmt;
use thiserror::Error;

/// Result type for starrocks-sink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration error
    Configuration,
    /// Connection-related errors (retriable)
    Connection,
    /// Authentication failure
    Authentication,
    /// Timeout errors (retriable)
    Timeout,
    /// Server-side statement error (the class the catalog raises for
    /// unsupported metadata introspection)
    Query,
    /// Stream-schema errors (missing or malformed properties)
    Schema,
    /// Operation not supported by this warehouse integration
    Unsupported,
    /// Type conversion errors
    TypeConversion,
    /// Unknown/other errors
    Other,
}

impl ErrorCategory {
    /// Whether errors in this category are generally retriable
    #[inline]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Connection | Self::Timeout)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Connection => write!(f, "connection"),
            Self::Authentication => write!(f, "authentication"),
            Self::Timeout => write!(f, "timeout"),
            Self::Query => write!(f, "query"),
            Self::Schema => write!(f, "schema"),
            Self::Unsupported => write!(f, "unsupported"),
            Self::TypeConversion => write!(f, "type_conversion"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Main error type for starrocks-sink
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Connection failed
    #[error("connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication failed
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// Operation timed out
    #[error("timeout: {message}")]
    Timeout { message: String },

    /// Statement rejected by the server
    #[error("query error: {message}")]
    Query {
        message: String,
        sql: Option<String>,
    },

    /// Stream schema is missing or malformed
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Feature not supported by this warehouse integration
    #[error("unsupported: {message}")]
    Unsupported { message: String },

    /// Type conversion failed
    #[error("type conversion error: {message}")]
    TypeConversion { message: String },

    /// Internal error
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Connection { .. } => ErrorCategory::Connection,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Query { .. } => ErrorCategory::Query,
            Self::Schema { .. } => ErrorCategory::Schema,
            Self::Unsupported { .. } => ErrorCategory::Unsupported,
            Self::TypeConversion { .. } => ErrorCategory::TypeConversion,
            Self::Internal { .. } => ErrorCategory::Other,
        }
    }

    /// Whether this error is retriable
    #[inline]
    pub fn is_retriable(&self) -> bool {
        self.category().is_retriable()
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            sql: None,
        }
    }

    /// Create a query error with the offending SQL
    pub fn query_with_sql(message: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
            sql: Some(sql.into()),
        }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Create a type conversion error
    pub fn type_conversion(message: impl Into<String>) -> Self {
        Self::TypeConversion {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Schema {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_retriable() {
        assert!(ErrorCategory::Connection.is_retriable());
        assert!(ErrorCategory::Timeout.is_retriable());

        assert!(!ErrorCategory::Query.is_retriable());
        assert!(!ErrorCategory::Schema.is_retriable());
        assert!(!ErrorCategory::Unsupported.is_retriable());
        assert!(!ErrorCategory::Authentication.is_retriable());
    }

    #[test]
    fn test_error_is_retriable() {
        assert!(Error::connection("refused").is_retriable());
        assert!(Error::timeout("timed out").is_retriable());

        assert!(!Error::query("syntax error").is_retriable());
        assert!(!Error::schema("no properties").is_retriable());
        assert!(!Error::unsupported("temp tables").is_retriable());
    }

    #[test]
    fn test_query_category_is_distinct() {
        // The prober's recovery decision hinges on this distinction.
        assert_eq!(Error::query("boom").category(), ErrorCategory::Query);
        assert_ne!(
            Error::connection("boom").category(),
            ErrorCategory::Query
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::connection("connection refused");
        assert!(err.to_string().contains("connection refused"));

        let err = Error::query_with_sql("syntax error", "SELECT * FORM t");
        assert!(err.to_string().contains("syntax error"));

        let err = Error::schema("stream schema for table `w`.`events` has no properties");
        assert!(err.to_string().contains("events"));
    }
}
