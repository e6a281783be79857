//! Single-page PDF chat: upload a document, index it, and talk to an LLM
//! grounded on its content.

pub mod chat_loop;
pub mod config;
pub mod document_loader;
pub mod engine_init;
pub mod error;
pub mod handlers;
pub mod page;
pub mod render;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod upload_tracker;
pub mod view;

#[cfg(test)]
mod testing;

use axum::Router;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::services::Services;
use crate::state::AppState;

/// Builds the full application, or a router that only shows the startup
/// error when the configuration is unusable.
pub fn build_app(lookup: &dyn Fn(&str) -> Option<String>) -> Router {
    match configure(lookup) {
        Ok((config, services)) => routes::create_router(AppState::new(services, &config)),
        Err(err) => {
            log::error!("{}", err);
            routes::halted_router(err.to_string())
        }
    }
}

fn configure(lookup: &dyn Fn(&str) -> Option<String>) -> Result<(AppConfig, Services), AppError> {
    let config = AppConfig::from_lookup(lookup)?;
    let services = Services::from_config(&config)?;
    Ok((config, services))
}
