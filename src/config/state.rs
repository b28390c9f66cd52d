// Application state module
// Read-only state shared by every connection

use super::types::Config;
use crate::store::Store;

/// Application state
///
/// Built once after configuration is loaded; handlers only ever borrow it.
pub struct AppState {
    pub config: Config,
    pub store: Store,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = Store::new(config.store.path.clone());
        Self { config, store }
    }

    /// Whether request lines are written to the access log
    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
