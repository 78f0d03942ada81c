//! OpenTelemetry span exporter writing JSON lines to a rotating file.

use super::record::span_record;
use super::writer::RotatingWriter;
use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry::KeyValue;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use std::path::PathBuf;

/// Name reported as `service.name` and in every span record.
pub const SERVICE_NAME: &str = "zentao-desk";

/// Writes each finished span as one JSON line.
struct JsonLinesExporter {
    writer: RotatingWriter,
    is_shutdown: bool,
}

impl SpanExporter for JsonLinesExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        if self.is_shutdown {
            return Box::pin(std::future::ready(Err(TraceError::from("exporter is shut down"))));
        }

        let written = batch.iter().try_for_each(|span| {
            self.writer
                .write_line(&span_record(SERVICE_NAME, span).to_string())
        });

        Box::pin(std::future::ready(written.map_err(|e| TraceError::from(e.to_string()))))
    }

    fn shutdown(&mut self) {
        self.is_shutdown = true;
    }
}

impl std::fmt::Debug for JsonLinesExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesExporter")
            .field("writer", &self.writer)
            .field("is_shutdown", &self.is_shutdown)
            .finish()
    }
}

/// Creates a tracer provider exporting every span immediately to `file_path`.
#[must_use]
pub fn create_tracer_provider(file_path: PathBuf) -> TracerProvider {
    let exporter = JsonLinesExporter {
        writer: RotatingWriter::new(file_path),
        is_shutdown: false,
    };

    TracerProvider::builder()
        .with_config(
            opentelemetry_sdk::trace::Config::default()
                .with_resource(Resource::new(vec![KeyValue::new("service.name", SERVICE_NAME)])),
        )
        .with_simple_exporter(exporter)
        .build()
}
