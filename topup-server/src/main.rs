//! Top-Up Order Server
//!
//! HTTP entry points for the prepaid top-up order lifecycle, backed by
//! Postgres, with an in-process fulfillment synchronizer reacting to
//! paid orders.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::{CatalogSource, ConfigLoader, get_database_url};
use server::{build_router, cors_layer, run_server};
use state::AppState;
use topup_core::attestation::{AllowAllAttestation, AttestationVerifier, HttpAttestationVerifier};
use topup_core::catalog::{PgCatalog, ProductResolver, StaticCatalog};
use topup_core::events::order_updated_channel;
use topup_core::flow::OrderFlow;
use topup_core::identity::{HttpIdentityVerifier, IdentityVerifier, StaticIdentityVerifier};
use topup_core::processors::FulfillmentSynchronizer;
use topup_core::store::{OrderStore, PgOrderStore};

/// Top-up order service - sandbox order lifecycle over Postgres
#[derive(Parser, Debug)]
#[command(name = "topup-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./topup-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting topup-server v{}", env!("CARGO_PKG_VERSION"));

    let config = ConfigLoader::new(&args.config).load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    let listen_addr = args.listen.unwrap_or(config.server.listen);
    tracing::info!("Configuration loaded from {:?}", args.config);

    let database_url = get_database_url().map_err(|e| {
        tracing::error!("{}", e);
        e
    })?;

    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    if args.migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&db_pool).await.map_err(|e| {
            tracing::error!("Failed to run migrations: {}", e);
            e
        })?;
        tracing::info!("Migrations completed successfully");
    }

    // Assemble the dependency seams from config.
    let store: Arc<dyn OrderStore> = Arc::new(PgOrderStore::new(db_pool.clone()));
    let catalog: Arc<dyn ProductResolver> = match config.catalog.source {
        CatalogSource::Static => Arc::new(StaticCatalog),
        CatalogSource::Database => Arc::new(PgCatalog::new(db_pool.clone())),
    };
    let identity: Arc<dyn IdentityVerifier> = match &config.auth.verify_url {
        Some(url) => Arc::new(HttpIdentityVerifier::new(url.clone())),
        // No verifier endpoint: every presented token is rejected and
        // only the relaxed-mode body fallback can establish identity.
        None => Arc::new(StaticIdentityVerifier::new()),
    };
    let attestation: Arc<dyn AttestationVerifier> = match &config.attestation.verify_url {
        Some(url) if config.attestation.enabled => {
            Arc::new(HttpAttestationVerifier::new(url.clone()))
        }
        _ => Arc::new(AllowAllAttestation),
    };

    let (updates_tx, updates_rx) = order_updated_channel();
    let (shutdown_tx, shutdown_rx) = shutdown::shutdown_channel();

    let flow = Arc::new(OrderFlow::new(store.clone(), catalog, updates_tx));
    let state = AppState::new(flow, identity, attestation, config.auth.mode);

    let synchronizer = FulfillmentSynchronizer::new(store, updates_rx, shutdown_rx);
    let synchronizer_handle = tokio::spawn(synchronizer.run());

    let router = build_router(state, cors_layer(&config.cors.allowed_origins));

    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Stop the fulfillment synchronizer once the server has drained.
    let _ = shutdown_tx.send(true);
    let _ = synchronizer_handle.await;

    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
