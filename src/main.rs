use course_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    payments::{PaymentState, StripeGateway},
    repository::{PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point for the application, responsible for initializing
/// all core components: Configuration, Logging, Database, Payment Gateway, and the
/// HTTP Server — and for tearing the shared database handle down on shutdown.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    // AppConfig::load() implements the fail-fast principle for missing secrets.
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // Prioritizes the RUST_LOG environment variable, falling back to sensible
    // defaults for local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "course_portal=debug,tower_http=info,axum=trace".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            // LOCAL: Pretty print output for human readability during local debugging.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON format output for ingestion by centralized log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database Initialization (Postgres)
    // The pool is the process-wide store handle: created once here, shared by
    // every request, closed explicitly on shutdown.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    let repo = Arc::new(PostgresRepository::new(pool.clone())) as RepositoryState;

    // 5. Payment Gateway Initialization
    let payments = Arc::new(StripeGateway::new(
        &config.payment_api_base,
        &config.payment_secret_key,
    )) as PaymentState;

    // 6. Unified State Assembly
    let app_state = AppState {
        repo,
        payments,
        config,
    };

    // 7. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("FATAL: Failed to bind 0.0.0.0:3000");

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:3000/swagger-ui");

    // The long-running Axum server process, interruptible by ctrl-c.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("FATAL: server error");

    // 8. Teardown: drain the shared connection handle before exiting.
    tracing::info!("Shutting down, closing database pool.");
    pool.close().await;
}

/// shutdown_signal
///
/// Resolves when the process receives ctrl-c, letting in-flight requests finish
/// before the server stops accepting new ones.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("FATAL: failed to install ctrl-c handler");
}
