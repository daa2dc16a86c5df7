//! Circulation Server
//!
//! The circulation core of a library management backend: the per-copy
//! lending lifecycle, due-date and renewal policy, the business-rule
//! gate guarding loan creation, and the overdue-detection sweep.

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
