//! Assembly of the running service from its parts.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::dispatcher::Dispatcher;
use crate::handlers::AppContext;
use crate::middleware::{MetricsMiddleware, Middleware, TracingMiddleware};
use crate::model::{Cat, Dog};
use crate::registry;
use crate::router::Router;
use crate::runtime_config::RuntimeConfig;
use crate::server::AppService;
use crate::static_files::StaticFiles;
use crate::store::{Collection, SqliteStore};
use crate::views::ViewRenderer;

/// A wired service and the context its handlers share.
pub struct App {
    pub service: AppService,
    pub context: Arc<AppContext>,
}

/// Views from `dir`, or the built-in templates.
pub fn load_views(dir: Option<&Path>) -> Result<ViewRenderer> {
    match dir {
        Some(dir) => ViewRenderer::from_dir(dir)
            .with_context(|| format!("Failed to load views from {}", dir.display())),
        None => ViewRenderer::embedded().context("Built-in views failed to compile"),
    }
}

/// Open the configured SQLite store, creating the database's directory.
pub fn open_store(config: &AppConfig) -> Result<SqliteStore> {
    match &config.storage.path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            SqliteStore::open(path)
                .with_context(|| format!("Failed to open database {}", path.display()))
        }
        None => SqliteStore::open_in_memory().context("Failed to open in-memory database"),
    }
}

/// Wire router, dispatcher, middleware and handlers over `store`.
pub fn build<S>(
    store: Arc<S>,
    views: ViewRenderer,
    assets: Option<&Path>,
    runtime: RuntimeConfig,
) -> Result<App>
where
    S: Collection<Cat> + Collection<Dog> + 'static,
{
    let views = Arc::new(views);
    let context = Arc::new(AppContext::new(store, Arc::clone(&views)));
    let router = Router::new(registry::route_table()).context("Invalid route table")?;

    let metrics = Arc::new(MetricsMiddleware::new());
    let mut dispatcher = Dispatcher::with_stack_size(runtime.stack_size);
    dispatcher.add_middleware(Arc::new(TracingMiddleware));
    dispatcher.add_middleware(Arc::clone(&metrics) as Arc<dyn Middleware>);
    // SAFETY: called once at startup, before the server accepts connections.
    unsafe {
        registry::register_all(&mut dispatcher, Arc::clone(&context))
            .context("Failed to spawn handler coroutines")?;
    }

    let mut service = AppService::new(Arc::new(router), Arc::new(dispatcher), metrics, views);
    if let Some(dir) = assets {
        service = service.with_assets(StaticFiles::new(dir));
    }
    info!(
        routes = registry::endpoints().len(),
        stack_size = runtime.stack_size,
        assets = ?assets,
        "Service assembled"
    );
    Ok(App { service, context })
}

/// Build the service described by `config`.
pub fn from_config(config: &AppConfig, runtime: RuntimeConfig) -> Result<App> {
    let store = Arc::new(open_store(config)?);
    let views = load_views(config.views.dir.as_deref())?;
    build(store, views, config.assets.dir.as_deref(), runtime)
}
