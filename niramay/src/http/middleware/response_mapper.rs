use axum::http::StatusCode;

use crate::http::ErrorBody;

/// Rewrites axum's plain-text extractor rejections (bad JSON, wrong content
/// type, bad path params) into the service's JSON error body.
pub async fn response_mapper_layer(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let response = next.run(request).await;
    let code = match response.status() {
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_ENTITY",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::BAD_REQUEST if !is_json(&response) => "BAD_REQUEST",
        _ => return response,
    };

    let (mut parts, body) = response.into_parts();
    let message = match axum::body::to_bytes(body, 64 * 1024).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(e) => {
            tracing::warn!("failed to read rejection body: {:?}", e);
            String::new()
        }
    };
    let new_body = serde_json::to_string(&ErrorBody {
        code: code.to_string(),
        message,
        trace_id: crate::trace::get_trace_id_string(),
    })
    .unwrap_or_default();

    parts.headers.insert(
        axum::http::header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("application/json"),
    );
    parts.headers.insert(
        axum::http::header::CONTENT_LENGTH,
        axum::http::HeaderValue::from(new_body.len()),
    );

    axum::response::Response::from_parts(parts, axum::body::Body::from(new_body))
}

fn is_json(response: &axum::response::Response) -> bool {
    response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}
