//! Main entry point for the fact-check backend.
//!
//! Sets up the Actix Web server, registers the analysis routes, and
//! initializes shared application state (configuration and Gemini client).
//! Uses dotenv for config and launches the async runtime with structured tracing.

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use dotenv::dotenv;
use fakecheck_server::{
    AppConfig, AppState, detection::GeminiClient, get_subscriber, handlers, init_subscriber,
    middleware::RequestLoggingMiddleware,
};
use tracing_actix_web::TracingLogger;

/// Main entry point. Configures and runs the Actix Web server.
///
/// - Loads environment variables from `.env`.
/// - Initializes structured tracing to stdout.
/// - Builds the Gemini client from configuration.
/// - Registers the API routes with logging middleware.
/// - Stops gracefully on Ctrl-C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let subscriber = get_subscriber("fakecheck".to_string(), "info".to_string(), std::io::stdout);
    init_subscriber(subscriber)?;

    let config = AppConfig::from_env()?;
    tracing::info!(config = ?config, "Configuration loaded");

    let bind_addr = (config.host.clone(), config.port);
    let json_limit = config.json_limit_bytes;
    let app_state = AppState::new(config).context("failed to init app_state")?;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(handlers::json_config(json_limit))
            .wrap(TracingLogger::default())
            .wrap(RequestLoggingMiddleware::new())
            .configure(handlers::configure_routes::<GeminiClient>)
    })
    .bind(bind_addr.clone())
    .with_context(|| format!("failed to bind {}:{}", bind_addr.0, bind_addr.1))?
    .run();

    tracing::info!(host = %bind_addr.0, port = bind_addr.1, "Server listening");

    let srv_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Shutdown signal received");
            srv_handle.stop(true).await;
        }
        res = server_task => {
            match res {
                Ok(Err(e)) => tracing::error!("Server failed: {}", e),
                Err(e) => tracing::error!("Server task failed: {}", e),
                Ok(Ok(())) => {}
            }
        }
    }

    Ok(())
}
