use crate::bus::EventBus;
use collab_core::registry::RegistryStore;
use std::sync::Arc;

/// Shared application state passed to all route handlers. The registry is
/// constructed by the caller and injected, so tests get isolated queues.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RegistryStore>,
    pub bus: EventBus,
}

impl AppState {
    pub fn new(registry: Arc<RegistryStore>) -> Self {
        Self {
            registry,
            bus: EventBus::new(),
        }
    }
}
