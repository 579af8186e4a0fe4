use std::sync::Arc;

use clap::Parser;
use linkhub_core::LinkHubConfig;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use linkhub_server::auth::{PgTokenVerifier, StaticTokenVerifier, TokenVerifier};
use linkhub_server::http::{self, HttpState};
use linkhub_server::store::{LinkStore, MemoryLinkStore, PgLinkStore};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "linkhub.toml")]
    config: String,

    /// Run against an in-memory store with a fixed dev token (no Postgres).
    #[arg(long)]
    memory: bool,

    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Init logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    // Load config
    let config = match LinkHubConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    let state = if args.memory {
        let token = std::env::var("LINKHUB_DEV_TOKEN").unwrap_or_else(|_| "dev-token".to_string());
        let owner = Uuid::new_v4();
        tracing::info!("memory mode: bearer token '{}' -> owner {}", token, owner);

        let store: Arc<dyn LinkStore> = Arc::new(MemoryLinkStore::new());
        let verifier: Arc<dyn TokenVerifier> =
            Arc::new(StaticTokenVerifier::new().with_token(token, owner));
        Arc::new(HttpState { store, verifier, pool: None })
    } else {
        // Connect to DB
        let pool = match linkhub_core::db::create_pool(&config.database).await {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Failed to connect to database: {}", e);
                std::process::exit(1);
            }
        };

        if args.health {
            match linkhub_core::db::health_check(&pool).await {
                Ok(v) => println!("✅ PostgreSQL connected: {}", v),
                Err(e) => {
                    println!("❌ PostgreSQL connection failed: {}", e);
                    std::process::exit(1);
                }
            }
            println!("✅ LinkHub DB health check passed");
            return Ok(());
        }

        let store: Arc<dyn LinkStore> = Arc::new(PgLinkStore::new(pool.clone()));
        let verifier: Arc<dyn TokenVerifier> = Arc::new(PgTokenVerifier::new(pool.clone()));
        Arc::new(HttpState { store, verifier, pool: Some(pool) })
    };

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    http::start_http_server(state, &config.http, tx.subscribe()).await?;

    Ok(())
}
