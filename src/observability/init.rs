//! Tracing initialization and subscriber setup.

use super::exporter::{create_tracer_provider, SERVICE_NAME};
use crate::infrastructure::paths;
use crate::Settings;
use opentelemetry::trace::TracerProvider as _;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber.
///
/// The pipeline filters events with an `EnvFilter`, exports spans through
/// OpenTelemetry to `<data_dir>/zentao-desk-trace.jsonl`, and optionally
/// prints events to stderr.
///
/// # Level Resolution
///
/// 1. `RUST_LOG` when set and valid
/// 2. `settings.trace_level`
/// 3. Default: `"info"`
///
/// # Initialization Behavior
///
/// Never fails the application: when the data directory cannot be created
/// spans are not exported, and when a subscriber is already installed the
/// call does nothing.
///
/// # Example
///
/// ```no_run
/// use zentao_desk::{observability::init_tracing, Settings};
///
/// init_tracing(&Settings::default());
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = settings.trace_level.as_deref().unwrap_or("info");
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    });

    let data_dir = settings.data_dir();
    let otel_layer = std::fs::create_dir_all(&data_dir).ok().map(|()| {
        let provider = create_tracer_provider(paths::trace_file(&data_dir));
        OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME))
    });

    let fmt_layer = settings.log_to_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .with(fmt_layer)
        .try_init();
}
