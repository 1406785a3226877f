//! API server entry point.

use std::sync::Arc;

use api::config::{Config, LogFormat};
use api::{AppState, BackendInfo};
use checkout::{InMemoryPaymentProcessor, PaymentProcessor, StripePaymentProcessor};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use store::{
    CartStore, CreatorDirectory, InMemoryCartStore, InMemoryCreatorDirectory, InMemoryOrderStore,
    OrderStore, PostgresStore,
};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
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
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let json = config.log_format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

#[tokio::main]
async fn main() {
    // 1. Load configuration
    let config = Config::from_env().expect("invalid configuration");

    // 2. Initialize tracing
    init_tracing(&config);

    // 3. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 4. Select stores
    let (carts, orders, creators, store_name): (
        Arc<dyn CartStore>,
        Arc<dyn OrderStore>,
        Arc<dyn CreatorDirectory>,
        &'static str,
    ) = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url.expose_secret())
                .await
                .expect("failed to connect to database");
            let store = Arc::new(PostgresStore::new(pool));
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            tracing::info!("using PostgreSQL stores");
            (
                store.clone() as Arc<dyn CartStore>,
                store.clone() as Arc<dyn OrderStore>,
                store as Arc<dyn CreatorDirectory>,
                "postgres",
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory stores");
            (
                Arc::new(InMemoryCartStore::new()) as Arc<dyn CartStore>,
                Arc::new(InMemoryOrderStore::new()) as Arc<dyn OrderStore>,
                Arc::new(InMemoryCreatorDirectory::new()) as Arc<dyn CreatorDirectory>,
                "memory",
            )
        }
    };

    // 5. Select payment processor
    let (payments, payments_name): (Arc<dyn PaymentProcessor>, &'static str) =
        match &config.stripe_secret_key {
            Some(key) => (
                Arc::new(StripePaymentProcessor::new(key).expect("failed to create Stripe client"))
                    as Arc<dyn PaymentProcessor>,
                "stripe",
            ),
            None => {
                tracing::warn!("STRIPE_SECRET_KEY not set, using in-memory payments");
                (
                    Arc::new(InMemoryPaymentProcessor::new()) as Arc<dyn PaymentProcessor>,
                    "memory",
                )
            }
        };

    // 6. Build the application
    let state = Arc::new(AppState::new(
        carts,
        orders,
        creators,
        payments,
        &config.currency,
        BackendInfo {
            store: store_name,
            payments: payments_name,
        },
    ));
    let app = api::create_app(state, metrics_handle);

    // 7. Start server
    let addr = config.addr();
    tracing::info!(%addr, currency = %config.currency, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
