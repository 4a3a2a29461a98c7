//! Shop Back-office - REST back-office for a small shop

use anyhow::Result;
use shop_backoffice::{api, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = Config::from_env()?;
    let port = config.port;
    tracing::info!(environment = %config.environment, upload_dir = %config.upload_dir.display(), "configuration loaded");
    let state = AppState::new(config).await?;
    let app = api::router(state);

    tracing::info!("Shop back-office listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}
