#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use portfolio_api::auth::password::hash_password_with_cost;
use portfolio_api::config::DatabaseConfig;
use portfolio_api::database::models::User;
use portfolio_api::database::postgres::PgUsers;
use portfolio_api::database::{Database, UserRepository};
use reqwest::StatusCode;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-secret-with-at-least-32-bytes";

/// Serializes tests that need to see a whole table in a known state.
pub static DB_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Postgres-backed tests only run when a database is configured.
pub fn database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty())
}

pub async fn connect() -> Result<Option<Database>> {
    let Some(url) = database_url() else {
        eprintln!("DATABASE_URL not set, skipping Postgres test");
        return Ok(None);
    };

    let config = DatabaseConfig {
        url,
        max_connections: 2,
        connection_timeout: 10,
    };
    let database = Database::connect(&config).await?;
    database.migrate().await?;
    Ok(Some(database))
}

/// Inserts a user with a unique name and a cheap hash; returns it with its password.
pub async fn create_user(database: &Database) -> Result<(User, String)> {
    let username = format!("it-{}", Uuid::new_v4().simple());
    let password = "integration-password".to_string();
    let hash = hash_password_with_cost(&password, 4)?;
    let user = PgUsers::new(database.pool().clone()).create(&username, &hash).await?;
    Ok((user, password))
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Cargo builds the binary before integration tests run
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_portfolio-api"));
        cmd.arg("serve")
            .env("PORT", port.to_string())
            .env("JWT_SECRET", TEST_SECRET)
            .env_remove("PORTFOLIO_API_PORT")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // DATABASE_URL is inherited from the test environment
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

/// Starts the shared server on first use. `None` when no database is configured.
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    if database_url().is_none() {
        eprintln!("DATABASE_URL not set, skipping HTTP test");
        return Ok(None);
    }

    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(Some(server))
}
