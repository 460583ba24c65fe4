//! Sink connector trait, check/write results and the sink registry

use async_trait::async_trait;
use futures::stream::BoxStream;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use validator::Validate;

use super::event::SourceEvent;
use super::spec::ConnectorSpec;
use crate::error::Result;

/// Trait for sink connector configuration
pub trait SinkConfig: DeserializeOwned + Validate + JsonSchema + Send + Sync {}

// Blanket implementation
impl<T> SinkConfig for T where T: DeserializeOwned + Validate + JsonSchema + Send + Sync {}

/// Result of a connection check with detailed status information
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,
    /// Error message if failed
    pub message: Option<String>,
    /// Individual check details
    pub checks: Vec<CheckDetail>,
}

/// A single check detail
#[derive(Debug, Clone)]
pub struct CheckDetail {
    /// Name of the check (e.g., "connectivity", "config")
    pub name: String,
    /// Whether this check passed
    pub passed: bool,
    /// Description or error message
    pub message: Option<String>,
    /// Duration of the check in milliseconds
    pub duration_ms: Option<u64>,
}

impl CheckDetail {
    /// Create a passed check
    pub fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: None,
            duration_ms: None,
        }
    }

    /// Create a failed check
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: Some(message.into()),
            duration_ms: None,
        }
    }

    /// Add duration to this check
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
            checks: Vec::new(),
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            checks: Vec::new(),
        }
    }

    /// Check if successful
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Create a builder for detailed checks
    pub fn builder() -> CheckResultBuilder {
        CheckResultBuilder::new()
    }

    /// Get all failed checks
    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckDetail> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            write!(f, "connection check passed")?;
        } else {
            write!(f, "connection check failed")?;
            if let Some(ref msg) = self.message {
                write!(f, ": {}", msg)?;
            }
        }
        for check in &self.checks {
            let status = if check.passed { "ok" } else { "failed" };
            write!(f, "\n  {} {}", check.name, status)?;
            if let Some(ref msg) = check.message {
                write!(f, ": {}", msg)?;
            }
        }
        Ok(())
    }
}

/// Builder for creating CheckResult with multiple validation checks
#[derive(Default)]
pub struct CheckResultBuilder {
    checks: Vec<CheckDetail>,
}

impl CheckResultBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Add a passed check
    pub fn check_passed(mut self, name: impl Into<String>) -> Self {
        self.checks.push(CheckDetail::passed(name));
        self
    }

    /// Add a failed check
    pub fn check_failed(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.checks.push(CheckDetail::failed(name, message));
        self
    }

    /// Add a check detail
    pub fn check(mut self, detail: CheckDetail) -> Self {
        self.checks.push(detail);
        self
    }

    /// Build the final CheckResult
    pub fn build(self) -> CheckResult {
        let all_passed = self.checks.iter().all(|c| c.passed);
        let message = if all_passed {
            None
        } else {
            let failed: Vec<_> = self
                .checks
                .iter()
                .filter(|c| !c.passed)
                .map(|c| c.name.as_str())
                .collect();
            Some(format!("failed checks: {}", failed.join(", ")))
        };
        CheckResult {
            success: all_passed,
            message,
            checks: self.checks,
        }
    }
}

/// Result of a write operation
#[derive(Debug, Clone, Default)]
pub struct WriteResult {
    /// Number of records written
    pub records_written: u64,
    /// Number of bytes written
    pub bytes_written: u64,
    /// Number of records that failed
    pub records_failed: u64,
    /// Error messages for failed records
    pub errors: Vec<String>,
}

impl WriteResult {
    /// Create a new write result
    pub fn new() -> Self {
        Self::default()
    }

    /// Add successful records
    pub fn add_success(&mut self, records: u64, bytes: u64) {
        self.records_written += records;
        self.bytes_written += bytes;
    }

    /// Add failed records
    pub fn add_failure(&mut self, records: u64, error: impl Into<String>) {
        self.records_failed += records;
        self.errors.push(error.into());
    }

    /// Check if there were any failures
    pub fn has_failures(&self) -> bool {
        self.records_failed > 0
    }
}

/// Trait for sink connectors
///
/// Sink connectors consume events and write them to external systems.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Configuration type for this sink
    type Config: SinkConfig;

    /// Return the connector specification
    fn spec() -> ConnectorSpec;

    /// Check connectivity and configuration
    async fn check(&self, config: &Self::Config) -> Result<CheckResult>;

    /// Write events to the destination
    async fn write(
        &self,
        config: &Self::Config,
        events: BoxStream<'static, SourceEvent>,
    ) -> Result<WriteResult>;
}

/// Factory trait for creating sink instances
pub trait SinkFactory: Send + Sync {
    /// Get the connector specification
    fn spec(&self) -> ConnectorSpec;

    /// Create a boxed sink instance for runtime dispatch
    fn create(&self) -> Result<Box<dyn AnySink>>;
}

/// Type-erased sink for runtime dispatch
///
/// This allows a runtime to work with sinks without knowing their concrete types.
#[async_trait]
pub trait AnySink: Send + Sync {
    /// Check connectivity with raw YAML config
    async fn check_raw(&self, config: &serde_yaml::Value) -> Result<CheckResult>;

    /// Write events with raw YAML config
    async fn write_raw(
        &self,
        config: &serde_yaml::Value,
        events: BoxStream<'static, SourceEvent>,
    ) -> Result<WriteResult>;
}

/// Registry of available sink connectors
///
/// Users create their own registry and register the sinks they need.
pub struct SinkRegistry {
    sinks: HashMap<String, Arc<dyn SinkFactory>>,
}

impl SinkRegistry {
    /// Create an empty sink registry
    pub fn new() -> Self {
        Self {
            sinks: HashMap::new(),
        }
    }

    /// Register a sink factory
    pub fn register(&mut self, name: &str, factory: Arc<dyn SinkFactory>) {
        self.sinks.insert(name.to_string(), factory);
    }

    /// Get a sink factory by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn SinkFactory>> {
        self.sinks.get(name)
    }

    /// List available sink types with their specs
    pub fn list(&self) -> Vec<(&str, ConnectorSpec)> {
        self.sinks
            .iter()
            .map(|(name, factory)| (name.as_str(), factory.spec()))
            .collect()
    }

    /// Check if a sink is registered
    pub fn contains(&self, name: &str) -> bool {
        self.sinks.contains_key(name)
    }

    /// Number of registered sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_result() {
        let mut result = WriteResult::new();
        result.add_success(100, 1024);
        result.add_success(50, 512);

        assert_eq!(result.records_written, 150);
        assert_eq!(result.bytes_written, 1536);
        assert!(!result.has_failures());

        result.add_failure(5, "write timeout");
        assert!(result.has_failures());
        assert_eq!(result.records_failed, 5);
    }

    #[test]
    fn test_check_result_builder() {
        let result = CheckResult::builder()
            .check_passed("config")
            .check(CheckDetail::passed("connectivity").with_duration_ms(12))
            .build();
        assert!(result.is_success());
        assert_eq!(result.checks.len(), 2);

        let result = CheckResult::builder()
            .check_passed("config")
            .check_failed("connectivity", "refused")
            .build();
        assert!(!result.is_success());
        assert_eq!(result.failed_checks().count(), 1);
        assert!(result.message.unwrap().contains("connectivity"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = SinkRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(!registry.contains("starrocks"));
    }
}
