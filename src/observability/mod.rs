//! OpenTelemetry-based observability with file-based trace export.
//!
//! ```text
//! tracing spans → tracing-opentelemetry → OpenTelemetry SDK → JSON lines file
//! ```
//!
//! Spans are written as flat JSON objects, one per line, to
//! `<data_dir>/zentao-desk-trace.jsonl`. The file rotates at 10 MB and keeps
//! three numbered backups. Bridge calls carry the current trace context to
//! the backend so its spans can join the same trace.
//!
//! # Modules
//!
//! - `init`: subscriber setup
//! - `exporter`: tracer provider with the file exporter
//! - `record`: span to JSON rendering
//! - `writer`: rotating line writer

mod exporter;
mod init;
mod record;
mod writer;

pub use init::init_tracing;
pub use writer::RotatingWriter;
