//! API Server Entry Point
//!
//! Uses `anyhow` for startup errors; request-level errors go through
//! `kernel::error::AppError`.

use std::net::SocketAddr;
use std::time::Duration;

use estate_api::config::AppConfig;
use estate_api::{
    AppContext, build_router, metrics, spawn_ad_sweeper, spawn_limiter_pruner, startup_cleanup,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "estate_api=info,auth=info,listings=info,forum=info,ads=info,platform=info,tower_http=info"
                .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    metrics::register()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let ctx = AppContext::new(pool, &config);
    startup_cleanup(&ctx).await;

    let sweeper = spawn_ad_sweeper(&ctx, config.ad_sweep_interval);
    let pruner = spawn_limiter_pruner(
        ctx.limiter.clone(),
        config.limiter_retention(),
        Duration::from_secs(60),
    );

    let app = build_router(&ctx, &config);

    tracing::info!(addr = %config.bind_addr, "Listening");

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();
    pruner.abort();
    ctx.pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Could not listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
