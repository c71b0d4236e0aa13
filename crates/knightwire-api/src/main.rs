//! Knightwire relay server entry point.

use std::error::Error;
use std::sync::Arc;

use knightwire_api::config::Config;
use knightwire_api::state::AppState;
use knightwire_api::{app, telemetry};
use knightwire_core::rng::StdRngSource;
use knightwire_rules::ChessEngine;
use knightwire_session::application::registry::SessionRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    let telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting Knightwire relay server");

    let registry = Arc::new(SessionRegistry::new(
        Arc::new(ChessEngine),
        Box::new(StdRngSource::from_os()),
    ));
    let (app_state, dispatcher) = AppState::with_dispatcher(registry, config.idle_timeout);

    let addr = config.socket_addr()?;
    tracing::info!(%addr, idle_timeout = ?config.idle_timeout, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    dispatcher.abort();
    telemetry.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
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
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
