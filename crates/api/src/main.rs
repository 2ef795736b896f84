use anyhow::Context;

use thingmesh_api::{
    app::{build_app, build_in_memory_services},
    config::ApiConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    thingmesh_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    let app = build_app(config.transport, build_in_memory_services());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
