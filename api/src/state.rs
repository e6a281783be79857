//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_SESSION_IDLE_SECS};
use crate::services::Services;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub services: Arc<Services>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(services: Services, config: &AppConfig) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(config.session_idle_ttl)),
            services: Arc::new(services),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// State with default limits, for callers that build `Services` by hand.
    pub fn with_services(services: Services) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(Duration::from_secs(DEFAULT_SESSION_IDLE_SECS))),
            services: Arc::new(services),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
