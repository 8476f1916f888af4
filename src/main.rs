use std::sync::{Arc, Mutex};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use pitchbook::app;
use pitchbook::config::AppConfig;
use pitchbook::db;
use pitchbook::repository::fixture::FixtureRepository;
use pitchbook::repository::live::LiveRepository;
use pitchbook::repository::{BackendMode, Repository};
use pitchbook::services::weather::OpenMeteoProvider;
use pitchbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;

    let conn = db::init_db(&config.database_url)
        .with_context(|| format!("failed to open session store {}", config.database_url))?;

    let repo: Box<dyn Repository> = match config.backend_mode {
        BackendMode::Live => {
            anyhow::ensure!(!config.backend_url.is_empty(), "BACKEND_URL must be set when BACKEND_MODE=live");
            anyhow::ensure!(!config.backend_api_key.is_empty(), "BACKEND_API_KEY must be set when BACKEND_MODE=live");
            tracing::info!("using live backend (url: {})", config.backend_url);
            Box::new(LiveRepository::new(
                config.backend_url.clone(),
                config.backend_api_key.clone(),
            ))
        }
        BackendMode::Fixture => {
            tracing::info!("using in-memory fixture backend with demo data");
            Box::new(FixtureRepository::seeded())
        }
    };
    let weather = OpenMeteoProvider::new(config.weather_url.clone());

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        repo,
        weather: Box::new(weather),
    });

    let app = app::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
