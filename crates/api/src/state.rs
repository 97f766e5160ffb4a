//! Shared application state.

use std::sync::Arc;

use domain::RestockService;
use inventory_store::InventoryStore;
use projections::InventoryReader;

/// Shared application state accessible from all handlers.
///
/// The writer and the reader hold clones of the same store handle.
pub struct AppState<S: InventoryStore> {
    pub restock: RestockService<S>,
    pub reader: InventoryReader<S>,
}

impl<S: InventoryStore + Clone> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            restock: RestockService::new(store.clone()),
            reader: InventoryReader::new(store),
        }
    }
}

/// Creates the application state around a store.
pub fn create_state<S: InventoryStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store))
}
