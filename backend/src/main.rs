mod cache;
mod config;
mod db;
mod dictionary;
mod error;
mod game;
mod models;
mod reminders;
mod repair;
mod routes;
mod service;

use std::sync::Arc;

use anyhow::{Context, Result};
use config::Config;
use db::{GameStore, MemoryStore, PgStore};
use dictionary::Dictionary;
use reminders::{LogMailer, Mailer};
use service::{GameDefaults, HangmanService};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub service: HangmanService,
    pub mailer: Arc<dyn Mailer>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hangman_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Hangman backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let store = connect_store(&config).await?;

    // Load dictionary
    let dictionary = match Dictionary::load(&config.game.dictionary_path).await {
        Ok(dict) => {
            tracing::info!("Dictionary loaded successfully");
            dict
        }
        Err(e) => {
            tracing::warn!(
                "Failed to load dictionary: {}. Using empty dictionary for now.",
                e
            );
            tracing::warn!(
                "Download a word list to {} for full functionality",
                config.game.dictionary_path
            );
            Dictionary::empty()
        }
    };

    let defaults = GameDefaults {
        word_size: config.game.default_word_size,
        attempts: config.game.default_attempts,
    };
    let service = HangmanService::new(store, Arc::new(dictionary), defaults);

    // Create application state
    let state = Arc::new(AppState {
        config: config.clone(),
        service,
        mailer: Arc::new(LogMailer),
    });

    // Spawn background task that retries failed post-game writes
    tokio::spawn(repair::repair_task(
        state.service.repairs(),
        state.service.store(),
        config.repair_interval(),
    ));

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = routes::create_routes()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// PostgreSQL when a database URL is configured, otherwise the in-memory store
async fn connect_store(config: &Config) -> Result<Arc<dyn GameStore>> {
    let Some(url) = config.database_url() else {
        tracing::warn!("DATABASE_URL not set; games are kept in memory and lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let pool = db::create_pool(url, config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations completed");

    Ok(Arc::new(PgStore::new(pool)))
}
