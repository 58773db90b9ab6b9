//! MediConnect API server

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mediconnect::{
    config::{Args, StorageBackend},
    seed,
    server::{self, AppState},
    store::{EntityStore, MemoryStore, PgStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("mediconnect={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  MediConnect API");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Storage: {}", args.storage.as_str());
    info!("Session TTL: {}s", args.session_ttl_secs);
    info!("Seed demo data: {}", args.seed_demo);
    info!("======================================");

    // Pick the entity store backend
    let store: Arc<dyn EntityStore> = match args.storage {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Postgres => {
            let url = match args.database_url.as_deref() {
                Some(url) => url.to_string(),
                None => {
                    error!("DATABASE_URL is required with --storage postgres");
                    std::process::exit(1);
                }
            };
            match PgStore::connect(&url).await {
                Ok(store) => {
                    info!("Postgres connected, migrations applied");
                    Arc::new(store)
                }
                Err(e) => {
                    error!("Postgres connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    if args.seed_demo {
        if let Err(e) = seed::seed_demo_data(&store).await {
            error!("Seeding failed: {}", e);
            std::process::exit(1);
        }
    }

    let state = Arc::new(AppState::new(args, store));
    server::run(state).await?;

    Ok(())
}
