mod auth;
mod chat;
mod config;
mod crypto;
mod db;
mod error;
mod exams;
mod inference;
mod routes;
mod state;

use std::sync::Arc;

use crate::auth::{Authenticator, AuthConfig, HostedAuth};
use crate::chat::ChatDeps;
use crate::chat::registry::{ReaperConfig, spawn_reaper};
use crate::chat::store::{ChatStore, PgChatStore};
use crate::error::ErrorCode;
use crate::inference::{Inference, InferenceClient};

#[tokio::main]
async fn main() {
    // Missing .env is fine; real deployments set the environment directly.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = match config::ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "server config invalid");
            std::process::exit(1);
        }
    };

    let pool = db::init_pool(&config.database_url)
        .await
        .expect("database init failed");

    // Inference and auth are optional: chat replies or persistence are
    // disabled when their config is missing.
    let inference: Option<Arc<dyn Inference>> = match InferenceClient::from_env() {
        Ok(client) => {
            tracing::info!(provider = client.label(), "inference client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "inference not configured; chat replies disabled");
            None
        }
    };

    let auth: Option<Arc<dyn Authenticator>> = match AuthConfig::from_env() {
        Some(config) => {
            tracing::info!(url = %config.base_url, "hosted auth configured");
            Some(Arc::new(HostedAuth::new(config)))
        }
        None => {
            tracing::warn!("AUTH_URL/AUTH_ANON_KEY not set; all callers are anonymous and chats are not persisted");
            None
        }
    };

    let store: Arc<dyn ChatStore> = Arc::new(PgChatStore::new(pool.clone()));
    let state = state::AppState::new(pool, ChatDeps { store: store.clone(), inference }, auth);

    let _reaper = spawn_reaper(state.chats.clone(), store, ReaperConfig::from_env());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "examedge listening");
    axum::serve(listener, app).await.expect("server failed");
}
