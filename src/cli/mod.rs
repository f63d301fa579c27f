use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::app::app;
use crate::auth::TokenService;
use crate::config::{AppConfig, DatabaseConfig};
use crate::database::postgres::PgUsers;
use crate::database::Database;
use crate::services::{seed_admin, SeedOutcome};
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "portfolio-api")]
#[command(about = "Portfolio backend - profile, projects and contacts API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run migrations and serve the HTTP API (default)")]
    Serve,

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,

    #[command(about = "Create the first admin account if no user exists yet")]
    SeedAdmin {
        #[arg(long, default_value = "admin-admin", help = "Admin username")]
        username: String,
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true, help = "Admin password")]
        password: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Migrate => migrate().await,
        Commands::SeedAdmin { username, password } => seed(&username, &password).await,
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    info!("Starting portfolio API in {:?} mode", config.environment);

    let database = Database::connect(&config.database).await?;
    database.migrate().await?;

    let tokens = TokenService::from_config(&config.security)?;
    let router = app(AppState::postgres(&database, tokens), &config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Portfolio API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    database.close().await;
    info!("Server stopped");
    Ok(())
}

async fn migrate() -> anyhow::Result<()> {
    let config = DatabaseConfig::from_env().context("invalid database configuration")?;
    let database = Database::connect(&config).await?;
    database.migrate().await?;
    database.close().await;
    println!("Migrations applied");
    Ok(())
}

async fn seed(username: &str, password: &str) -> anyhow::Result<()> {
    let config = DatabaseConfig::from_env().context("invalid database configuration")?;
    let database = Database::connect(&config).await?;
    database.migrate().await?;

    let users = PgUsers::new(database.pool().clone());
    let outcome = seed_admin(&users, username, password).await;
    database.close().await;

    match outcome? {
        SeedOutcome::Created(user) => println!("Admin user created: {} ({})", user.username, user.id),
        SeedOutcome::AlreadyExists => println!("Admin user already exists"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
