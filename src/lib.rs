//! # Kennel
//!
//! A coroutine-powered registry of cats and dogs, served over HTTP with
//! `may_minihttp` and persisted as JSON documents in SQLite.
//!
//! ## Architecture
//!
//! - **[`router`]** - regex route matching from method and path to a handler name
//! - **[`dispatcher`]** - one `may` coroutine per handler, fed over channels
//! - **[`middleware`]** - request tracing and Prometheus counters
//! - **[`server`]** - the `may_minihttp` service, request parsing, response writing
//! - **[`handlers`]** - the cat, dog and page endpoints
//! - **[`store`]** - the persistence gateway (`SqliteStore`, `MemoryStore`)
//! - **[`views`]** - minijinja page templates
//! - **[`state`]** - the last-added cat
//!
//! ## Request Flow
//!
//! ```text
//! client -> AppService::call -> Router::route -> Dispatcher::dispatch
//!        -> handler coroutine -> Collection -> HandlerResponse -> client
//! ```
//!
//! `/health`, `/metrics` and `/assets/*` are answered by the service itself.
//! Anything the router does not know renders the not-found page with a 404.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kennel::{app, runtime_config::RuntimeConfig, server::HttpServer, store::MemoryStore, views::ViewRenderer};
//!
//! let app = app::build(Arc::new(MemoryStore::new()), ViewRenderer::embedded()?, None, RuntimeConfig::default())?;
//! let handle = HttpServer(app.service).start("127.0.0.1:8080")?;
//! handle.wait_ready()?;
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod model;
pub mod registry;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod state;
pub mod static_files;
pub mod store;
pub mod views;
