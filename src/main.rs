use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mongodb::bson::DateTime;

use advocate_search::api::create_router;
use advocate_search::config::CONFIG;
use advocate_search::data_models::{load_fixtures, stamp_fixtures};
use advocate_search::db::{AdvocateRepo, Database};
use advocate_search::query_engine::QueryEngine;
use advocate_search::store::{AdvocateStore, InMemoryAdvocateStore};

#[derive(Parser)]
#[command(name = "advocate-search", about = "Search a directory of advocates")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the search API and UI
    Serve {
        /// Serve these fixtures from memory instead of MongoDB
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },
    /// Replace the MongoDB advocates collection with the given fixtures
    Seed { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber (handles both tracing and log crate)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    match Cli::parse().command {
        Command::Serve { fixtures } => serve(fixtures).await,
        Command::Seed { file } => seed(file).await,
    }
}

async fn serve(fixtures: Option<PathBuf>) -> anyhow::Result<()> {
    let store: Arc<dyn AdvocateStore> = match fixtures {
        Some(path) => {
            let advocates = stamp_fixtures(load_fixtures(&path)?, DateTime::now());
            tracing::info!("serving {} advocates from {}", advocates.len(), path.display());
            Arc::new(InMemoryAdvocateStore::new(advocates))
        }
        None => {
            let db = Database::from_config().await?;
            Arc::new(AdvocateRepo::new(&db))
        }
    };

    let query_engine = Arc::new(QueryEngine::new(store));
    let app = create_router(query_engine, &CONFIG.static_dir);

    let listener = tokio::net::TcpListener::bind(&CONFIG.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", CONFIG.bind_addr))?;
    tracing::info!("listening on {}", CONFIG.bind_addr);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn seed(file: PathBuf) -> anyhow::Result<()> {
    let advocates = stamp_fixtures(load_fixtures(&file)?, DateTime::now());
    let db = Database::from_config().await?;
    let repo = AdvocateRepo::new(&db);

    let inserted = repo.replace_all(&advocates).await?;
    repo.ensure_indexes().await?;
    tracing::info!("seeded {} advocates from {}", inserted, file.display());
    Ok(())
}
