pub mod books;

use std::sync::Arc;

use catalog_db::DocumentStore;
use catalog_kernel::{settings::Settings, ModuleRegistry};

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings, store: Arc<dyn DocumentStore>) {
    registry.register(books::create_module(store, &settings.database.collection));
}
