//! Sink connector SDK surface
//!
//! The contract between the surrounding streaming-sink runtime and a sink
//! implementation: typed configuration with validation, a `spec`/`check`/
//! `write` lifecycle, type-erased dispatch and a registry for runtime lookup.

pub mod event;
pub mod sink;
pub mod spec;

pub use event::{EventMetadata, SourceEvent, SourceEventType};
pub use sink::{
    AnySink, CheckDetail, CheckResult, CheckResultBuilder, Sink, SinkConfig, SinkFactory,
    SinkRegistry, WriteResult,
};
pub use spec::ConnectorSpec;
