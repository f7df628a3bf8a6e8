use std::sync::Arc;

use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use config::AppConfig;
use cqrs::CreateCheckoutCommandHandler;
use dotenv::dotenv;
use gateways::HttpCheckoutGateway;
use repositories::{CheckoutRepository, DisabledCheckoutRepository, MongoDbCheckoutRepository};
use state::AppState;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{event, Level};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

mod config;
mod domain;
mod errors;
mod gateways;
mod repositories;
mod dtos;
mod cqrs;
mod state;
mod routes;
#[cfg(test)]
mod testing;

fn init_tracing(log_path: Option<&str>) -> std::io::Result<()> {
    let writer = match log_path {
        Some(path) => BoxMakeWriter::new(Arc::new(std::fs::File::create(path)?)),
        None => BoxMakeWriter::new(std::io::stdout),
    };

    tracing_subscriber::
    fmt()
    .with_max_level(tracing::Level::DEBUG)
    .with_target(false)
    .with_ansi(false)
    .json()
    .with_file(true)
    .with_line_number(true)
    .with_current_span(true)
    .with_writer(writer)
    .init();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    event!(Level::INFO, "shutdown signal received");
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = AppConfig::from_env().expect("invalid configuration");
    init_tracing(config.log_path.as_deref()).expect("failed to open log file");

    let checkout_repository: Arc<dyn CheckoutRepository + Send + Sync> = match &config.mongodb {
        Some(db_info) => Arc::new(MongoDbCheckoutRepository::new(db_info).await.expect("invalid MongoDB settings")),
        None => {
            event!(Level::WARN, "MONGODB_URI is not set, checkout records will not be stored");
            Arc::new(DisabledCheckoutRepository)
        }
    };

    let checkout_gateway = Arc::new(HttpCheckoutGateway::new(
        reqwest::Client::new(),
        config.checkout_api_url.clone(),
        config.checkout_secret_key.clone(),
    ));

    let create_checkout_command_handler = Arc::new(CreateCheckoutCommandHandler::new(
        checkout_gateway,
        checkout_repository,
        config.frontend_url.clone(),
        config.store_failure_policy,
    ));

    let state = Arc::new(AppState {
        create_checkout_command_handler: create_checkout_command_handler,
    });

    let cors = routes::cors_layer(&config.cors_origin).expect("CORS_ORIGIN is not a valid header value");

    let (prometheus_layer, metrics_handle) = PrometheusMetricLayer::pair();

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await.expect("failed to bind address");
    event!(Level::INFO, "checkout relay listening on {}", config.listen_addr());

    axum::serve(listener, routes::router(state)
        .route("/metrics", get(|| async move {metrics_handle.render()}))

        .layer(prometheus_layer)
        .layer(
            ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
        ))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}
