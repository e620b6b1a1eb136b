//! Bookloan - library borrowing management server
//!
//! A REST JSON API for a book catalog, a borrowing ledger that keeps book
//! inventory in step with lent copies, and a ledger of payments and fines.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: repository::Repository) -> Self {
        let services = services::Services::new(repository, &config.borrowings);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
