use axum::http::Request;
use opentelemetry::trace::TraceContextExt;
use tracing::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

mod response_mapper;

pub use response_mapper::response_mapper_layer;

pub const TRACE_ID_HEADER: &str = "X-Trace-ID";

struct HeaderMapExtractor<'a>(&'a axum::http::HeaderMap);

impl opentelemetry::propagation::Extractor for HeaderMapExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

fn trace_span<B>(req: &Request<B>) -> (String, tracing::Span) {
    let parent_context =
        opentelemetry::global::get_text_map_propagator(|propagator| {
            propagator.extract(&HeaderMapExtractor(req.headers()))
        });

    let span = tracing::info_span!(
        "http.request",
        method = %req.method(),
        uri = %req.uri(),
        trace_id = tracing::field::Empty,
        user_id = tracing::field::Empty,
        status = tracing::field::Empty,
    );
    // a fresh trace id is minted when no traceparent came in
    span.set_parent(parent_context);
    let trace_id = span.context().span().span_context().trace_id().to_string();
    span.record("trace_id", &trace_id);
    (trace_id, span)
}

/// Opens the request span, joins an incoming W3C `traceparent` and echoes
/// the trace id back in `X-Trace-ID`.
pub async fn trace_layer(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let (trace_id, span) = trace_span(&request);
    let started = std::time::Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;

    let status = response.status();
    span.record("status", status.as_u16());
    span.in_scope(|| {
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request finished"
        );
    });

    if let Ok(value) = axum::http::HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}
