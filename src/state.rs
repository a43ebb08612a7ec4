use crate::config::AppConfig;
use crate::services::sheets::GoogleSheets;
use crate::services::store::ExternalStore;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: ExternalStore,
    pub session_secret: String,
    pub development: bool,
}

impl AppState {
    pub fn new(store: ExternalStore, session_secret: String, development: bool) -> Self {
        Self {
            store,
            session_secret,
            development,
        }
    }

    /// Builds the shared state from configuration. A store that cannot be
    /// set up is logged and left unavailable; submissions then go to the
    /// fallback log.
    pub fn from_config(config: &AppConfig) -> Self {
        let store = match GoogleSheets::from_config(&config.sheets) {
            Ok(sheets) => {
                info!("google sheets store configured");
                ExternalStore::new(Arc::new(sheets))
            }
            Err(e) => {
                warn!(error = %e, "google sheets store unavailable; submissions will be logged");
                ExternalStore::unavailable(e.to_string())
            }
        };
        Self::new(store, config.session_secret.clone(), config.development)
    }
}
