use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::Parser;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing_subscriber::{fmt::time::UtcTime, EnvFilter};

use crate::{
    cli::{Cli, Commands},
    config::Settings,
    repositories::{LookupRepositoryImpl, ProjectRepositoryImpl},
    services::{seed_initial_data, ProjectImporter},
};

mod app_state;
mod cli;
mod config;
mod domain;
mod repositories;
mod router;
mod routes;
mod services;

pub use app_state::AppState;

const DEFAULT_LOG_FILTER: &str = "aidtrack_api=debug,tower_http=debug,info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let settings = config::read_config().context("Failed to read configuration")?;
    let pool = connect(&settings).await?;

    match cli.command {
        Commands::Serve => serve(pool, &settings).await,
        Commands::Import { path } => {
            let importer = ProjectImporter::new(
                Arc::new(LookupRepositoryImpl::new(pool.clone())),
                Arc::new(ProjectRepositoryImpl::new(pool)),
            );
            let summary = importer.import_file(&path).await?;
            tracing::info!(
                imported = summary.imported(),
                skipped = summary.skipped,
                failed = summary.failed,
                "Import complete"
            );
            Ok(())
        }
        Commands::Seed => {
            let lookups = LookupRepositoryImpl::new(pool.clone());
            let projects = ProjectRepositoryImpl::new(pool);
            let outcome = seed_initial_data(&lookups, &projects).await?;
            tracing::info!(
                lookups = outcome.lookups_resolved,
                demo_project_created = outcome.demo_project_created,
                "Seed complete"
            );
            Ok(())
        }
    }
}

fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .init();
}

async fn connect(settings: &Settings) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect_with(settings.database.with_db())
        .await
        .with_context(|| {
            format!(
                "Failed to connect to database {} at {}:{}",
                settings.database.database_name, settings.database.host, settings.database.port
            )
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}

async fn serve(pool: PgPool, settings: &Settings) -> anyhow::Result<()> {
    let app = router::create(AppState::new(pool), settings);

    let addr: SocketAddr = format!(
        "{}:{}",
        settings.application.host, settings.application.port
    )
    .parse()
    .context("Invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
