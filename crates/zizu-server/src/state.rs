use std::sync::Arc;

use zizu_gateway::TextGenerator;
use zizu_notify::Notifier;
use zizu_store::ZizuStore;

/// Shared application state, constructed once at startup and cloned into
/// every route handler. No ambient globals; tests build a fresh one each.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ZizuStore>,
    pub generator: Arc<dyn TextGenerator>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(
        store: Arc<ZizuStore>,
        generator: Arc<dyn TextGenerator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            generator,
            notifier,
        }
    }
}
