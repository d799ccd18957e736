use anyhow::Context;

use userbase_api::app::{build_app, AppServices};
use userbase_infra::config::AppConfig;

#[tokio::main]
async fn main() {
    // Seed the environment before tracing reads RUST_LOG / LOG_FORMAT.
    let dotenv = dotenv::dotenv();
    userbase_observability::init();

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "loaded .env file"),
        Err(e) if e.not_found() => {
            tracing::info!("no .env file found, using system environment variables")
        }
        Err(e) => tracing::warn!(error = %e, "failed to load .env file"),
    }

    if let Err(err) = run().await {
        tracing::error!(error = %format!("{err:#}"), "fatal error");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = AppServices::connect(&config.database).await?;
    let app = build_app(services);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
