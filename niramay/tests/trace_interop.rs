use axum::{Router, routing::get};
use niramay::http::CurrentUser;
use niramay::http::middleware::{TRACE_ID_HEADER, trace_layer};
use niramay::trace::get_current_trace_id;

#[tokio::test]
async fn test_trace_propagation_over_tcp() {
    niramay::trace::init(&niramay::config::TraceConfig::default())
        .expect("Failed to initialize tracing");

    let app = Router::new()
        .route(
            "/whoami",
            get(|user: CurrentUser| async move {
                let trace_id = get_current_trace_id()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "none".to_string());
                format!("{} {}", user.id(), trace_id)
            }),
        )
        .layer(axum::middleware::from_fn(trace_layer));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let trace_id = "0af7651916cd43dd8448eb211c80319c";
    let user_id = "6f1c1c64-2d4a-4a8e-9a3e-5f0d3b1e2c11";
    let response = reqwest::Client::new()
        .get(format!("http://{}/whoami", addr))
        .header("traceparent", format!("00-{}-b7ad6b7169203331-01", trace_id))
        .header("x-user-id", user_id)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.headers().get(TRACE_ID_HEADER).unwrap().to_str().unwrap(),
        trace_id
    );
    assert_eq!(
        response.text().await.unwrap(),
        format!("{} {}", user_id, trace_id)
    );
}

#[tokio::test]
async fn test_unauthenticated_request_gets_json_error() {
    niramay::trace::init(&niramay::config::TraceConfig::default())
        .expect("Failed to initialize tracing");

    let app = Router::new()
        .route("/whoami", get(|user: CurrentUser| async move { user.id().to_string() }))
        .layer(axum::middleware::from_fn(trace_layer));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let response = reqwest::Client::new()
        .get(format!("http://{}/whoami", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: niramay::http::ErrorBody = response.json().await.unwrap();
    assert_eq!(body.code, "UNAUTHORIZED");
}
