use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use minigolf_api::build_router;
use minigolf_api::config::Config;

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting minigolf api server...");

    dotenvy::dotenv().ok();

    let config = Config::from_env().expect("Invalid configuration");

    // Connections are opened on demand, so the server starts even if MySQL is down
    let pool = config.lazy_pool();

    tracing::info!(
        "Using database {} at {}:{}",
        config.db_name,
        config.db_host,
        config.db_port
    );

    let addr = config.bind_addr();
    let app = build_router(pool, &config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server.");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::warn!("Received Ctrl+C, shutting down");
}
