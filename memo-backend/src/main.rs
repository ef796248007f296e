use actix_files::Files;
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware::Logger, web};
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Instant;

mod auth;
mod config;
mod controllers;
mod db;
mod error;
mod models;
mod stores;
mod views;

use auth::{PasswordHasher, SessionAuthenticator};
use config::Config;
use db::Database;
use stores::{CredentialStore, MemoStore, SqliteCredentialStore};

/// Everything a handler needs, built once at startup and shared by all workers.
pub struct AppState {
    pub db: Arc<Database>,
    pub credentials: Arc<dyn CredentialStore>,
    pub memos: Arc<dyn MemoStore>,
    pub sessions: SessionAuthenticator,
    /// Server start time for uptime calculation
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, db: Arc<Database>) -> Self {
        let key = match &config.secret_key {
            Some(key) => key.clone(),
            None => {
                log::warn!(
                    "{} not set; generated a session key for this run. Sessions will not survive a restart.",
                    config::env_vars::SECRET_KEY
                );
                Key::generate()
            }
        };

        let hasher = PasswordHasher::new(config.pbkdf2_iterations);
        log::debug!("Password hashing: PBKDF2-SHA256, {} iterations", hasher.iterations());
        let credentials: Arc<dyn CredentialStore> =
            Arc::new(SqliteCredentialStore::new(Arc::clone(&db), hasher));
        let memos: Arc<dyn MemoStore> = db.clone();
        let sessions = SessionAuthenticator::new(
            Arc::clone(&db),
            key,
            config.session_ttl_hours,
            config.cookie_secure,
        );

        Self {
            db,
            credentials,
            memos,
            sessions,
            started_at: Instant::now(),
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    log::info!("memo-backend v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    log::info!("Initializing database at {}", config.database_url);
    let db = Database::new(&config.database_url).map_err(|e| {
        log::error!("Failed to initialize database: {}", e);
        std::io::Error::other(e)
    })?;
    let db = Arc::new(db);

    match db.purge_expired_sessions() {
        Ok(0) => {}
        Ok(n) => log::info!("Purged {} expired sessions", n),
        Err(e) => log::warn!("Failed to purge expired sessions: {}", e),
    }

    let bind_address = config.bind_address.clone();
    let port = config.port;
    let static_dir = config.static_dir.clone();
    if let Some(dir) = &static_dir {
        log::info!("Serving static files from: {}", dir);
    }

    let state = web::Data::new(AppState::new(config, db));

    let server = HttpServer::new(move || {
        let mut app = App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(controllers::configure);

        if let Some(dir) = &static_dir {
            app = app.service(Files::new("/static", dir.clone()));
        }

        app.default_service(web::to(controllers::not_found))
    })
    .bind((bind_address.as_str(), port))?
    .run();

    log::info!("Listening on http://{}:{}", bind_address, port);

    let server_handle = server.handle();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        log::info!("Received Ctrl+C, shutting down...");

        let server_stop = server_handle.stop(true);
        if tokio::time::timeout(std::time::Duration::from_secs(5), server_stop).await.is_err() {
            log::warn!("Timeout waiting for HTTP server to stop, forcing exit...");
        }

        log::info!("Shutdown complete");
    });

    server.await
}
