use std::sync::OnceLock;

use crate::config::{TraceConfig, TraceFormat};
use opentelemetry::trace::TracerProvider;
use opentelemetry::trace::{TraceContextExt, TraceId};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use rand::Rng;
use rand::rng;
use tracing::Subscriber;
use tracing_appender::{non_blocking::WorkerGuard, rolling::daily};
use tracing_opentelemetry::OpenTelemetrySpanExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

static TRACE_INIT: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

fn new_fmt_layer<S>(
    filter: EnvFilter,
    format: TraceFormat,
    writer: tracing_appender::non_blocking::NonBlocking,
) -> Box<dyn tracing_subscriber::Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        TraceFormat::Full => {
            fmt::layer().with_writer(writer).with_filter(filter).boxed()
        }
        TraceFormat::Compact => fmt::layer()
            .with_writer(writer)
            .compact()
            .with_filter(filter)
            .boxed(),
        TraceFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .pretty()
            .with_filter(filter)
            .boxed(),
        TraceFormat::Json => {
            fmt::layer().with_writer(writer).json().with_filter(filter).boxed()
        }
    }
}

/// Installs the global subscriber. Only the first call has an effect, later
/// calls return `Ok(())` without touching the registry.
pub fn init(trace_config: &TraceConfig) -> crate::Result<()> {
    let mut setup_result = Ok(());
    TRACE_INIT.get_or_init(|| {
        let mut guards = Vec::new();
        let mut layers = Vec::new();

        if let Some(console_config) = trace_config.console.as_ref() {
            let (console, console_guard) =
                tracing_appender::non_blocking::NonBlockingBuilder::default()
                    .buffered_lines_limit(console_config.buffer_limit)
                    .lossy(console_config.lossy)
                    .finish(std::io::stdout());
            guards.push(console_guard);

            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&console_config.filter));

            layers.push(new_fmt_layer(filter, console_config.format, console));
        }

        if let Some(file_config) = trace_config.file.as_ref() {
            let (file_writer, file_guard) =
                tracing_appender::non_blocking::NonBlockingBuilder::default()
                    .buffered_lines_limit(file_config.buffer_limit)
                    .lossy(file_config.lossy)
                    .finish(daily(
                        file_config.directory.as_str(),
                        file_config.filename.as_str(),
                    ));
            guards.push(file_guard);

            let filter = EnvFilter::new(&file_config.filter);

            layers.push(new_fmt_layer(filter, file_config.format, file_writer));
        }

        // no exporter: the provider only mints W3C trace ids so that
        // X-Trace-ID and log lines share one id
        let otel_provider =
            opentelemetry_sdk::trace::TracerProvider::builder().build();
        opentelemetry::global::set_tracer_provider(otel_provider.clone());
        layers.push(
            tracing_opentelemetry::layer()
                .with_tracer(otel_provider.tracer("niramay"))
                .boxed(),
        );

        opentelemetry::global::set_text_map_propagator(
            TraceContextPropagator::new(),
        );

        if let Err(e) = tracing_subscriber::registry().with(layers).try_init() {
            setup_result = Err(anyhow::Error::new(e)
                .context("failed to init tracing")
                .into());
        }
        guards
    });
    setup_result
}

pub fn get_current_trace_id() -> Option<TraceId> {
    let span = tracing::Span::current();
    let context = span.context();
    let span_context = context.span().span_context().clone();

    if span_context.is_valid() {
        Some(span_context.trace_id())
    } else {
        None
    }
}

pub fn generate_trace_id() -> TraceId {
    let mut rng = rng();
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    TraceId::from_bytes(bytes)
}

pub fn get_trace_id_string() -> String {
    get_current_trace_id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| generate_trace_id().to_string())
}
