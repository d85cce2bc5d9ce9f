//! # stockFast API
//!
//! axum server behind the stockFast back-office.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           stockFast API                                 │
//! │                                                                         │
//! │  request ──► auth layer ──► routes ──► services ──► stockfast-db       │
//! │              (JWT)          (parse,    (one tx per     (SQLite)         │
//! │                             envelope)   write)                          │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                                     PngQrEncoder                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`]: `config/stockfast.toml`, overridden by `STOCKFAST_*`
//! environment variables.

pub mod auth;
pub mod config;
pub mod error;
pub mod qr;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use stockfast_core::qr::QrEncoder;
use stockfast_db::Database;

pub use crate::config::AppConfig;
pub use crate::error::{ApiError, ApiResult};

use crate::auth::JwtManager;
use crate::qr::PngQrEncoder;

/// Shared application state. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub jwt: Arc<JwtManager>,
    pub qr: Arc<dyn QrEncoder>,
}

impl AppState {
    /// State with the PNG QR encoder.
    pub fn new(db: Database, config: AppConfig) -> Self {
        let qr = Arc::new(PngQrEncoder::new(config.qr.size_px));
        AppState::with_encoder(db, config, qr)
    }

    /// State with a caller-supplied QR encoder.
    pub fn with_encoder(db: Database, config: AppConfig, qr: Arc<dyn QrEncoder>) -> Self {
        let jwt = Arc::new(JwtManager::new(
            &config.auth.jwt_secret,
            config.auth.session_lifetime_secs,
        ));
        AppState {
            db,
            config: Arc::new(config),
            jwt,
            qr,
        }
    }
}

/// The full application router.
pub fn build_router(state: AppState) -> Router {
    routes::router(state)
}
