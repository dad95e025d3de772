use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use uranus_server::auth::email::create_mailer;
use uranus_server::config::Config;
use uranus_server::db;
use uranus_server::routes::create_routes;
use uranus_server::state::AppState;

const DEFAULT_LOG_FILTER: &str = "info,tower_http=info,sqlx=warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env().context("Invalid configuration")?;

    let pool = db::create_pool(&config)
        .await
        .context("Failed to connect to database")?;
    tracing::info!(schema = %config.db_schema, "Successfully connected to database");

    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations run successfully");

    let mailer = create_mailer(&config).context("Failed to set up email transport")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let public_url = config.base_api_url.clone();
    let app = create_routes(AppState::new(pool, config, mailer));

    tracing::info!(public_url = %public_url, "Server running at http://{}", addr);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
