//! Process lifecycle: connect storage, run modules, serve, then tear down.

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use catalog_db::DocumentStore;
use catalog_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// Open the configured store and build a registry with every module registered.
pub async fn prepare(settings: &Settings) -> anyhow::Result<(Arc<dyn DocumentStore>, ModuleRegistry)> {
    let store = catalog_db::connect(&settings.database.endpoint)
        .await
        .with_context(|| format!("failed to open store '{}'", settings.database.endpoint))?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings, store.clone());

    Ok((store, registry))
}

/// Run the service until `shutdown` resolves.
///
/// Modules are stopped and the store closed even when serving fails.
pub async fn run<F>(settings: Settings, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (store, registry) = prepare(&settings).await?;
    let ctx = InitCtx {
        settings: &settings,
    };

    let served = async {
        registry.init_modules(&ctx).await?;
        registry.start_modules(&ctx).await?;
        catalog_http::start_server(&registry, &settings, shutdown).await
    }
    .await;

    let stopped = registry.stop_modules().await;
    let closed = store.close().await.context("failed to close store");

    served.and(stopped).and(closed)?;
    tracing::info!("catalog shut down cleanly");
    Ok(())
}
