mod bootstrap;
mod cli;
mod dsn;
mod handler;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = cli::CliArgs::parse();
    let boot = bootstrap::bootstrap(args).await?;

    let app = axum::Router::new()
        .route("/v1/chat", axum::routing::post(handler::chat))
        .with_state(boot.router.clone());

    let bind = format!("{}:{}", boot.global.host, boot.global.port);
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, "gatewire listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    boot.background.catalog_refresh.send(()).ok();
    boot.background.credential_refresh.send(()).ok();
    boot.background.rate_limit_resets.stop();
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
