use niramay::http::middleware::{response_mapper_layer, trace_layer};

#[tokio::main]
async fn main() -> niramay::Result<()> {
    let config = niramay::config::AppConfig::new(niramay::util::config_dir()?)?;
    niramay::trace::init(&config.trace)?;
    tracing::debug!("app config: {:?}", config.server);

    let pool = niramay::db::connect(&config.database).await?;
    if config.database.run_migrations {
        niramay_civic::infra::migrate(&pool).await?;
    }

    let state = niramay_civic::api::AppState::new(pool, &config)?;
    // response mapper runs inside the trace span
    let router = niramay_civic::api::create_router(state)
        .layer(axum::middleware::from_fn(response_mapper_layer))
        .layer(axum::middleware::from_fn(trace_layer));

    niramay::http::run(router, &config.server).await
}
