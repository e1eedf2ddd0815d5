//! # Handlers
//!
//! The request handler set. Every handler has the shape
//! `fn(&HandlerRequest, &AppContext) -> ApiResult<HandlerResponse>` and is a
//! leaf over the persistence gateway: it reads its inputs, calls the store,
//! and formats the result as JSON or a rendered page.
//!
//! Handlers are wired to routes in [`crate::registry`].

pub mod cats;
pub mod dogs;
pub mod pages;
pub mod types;

use std::sync::Arc;

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::error::ApiResult;
use crate::model::{Cat, Dog};
use crate::state::LastAdded;
use crate::store::{Collection, SharedCollection, StoreError};
use crate::views::ViewRenderer;

/// Everything a handler needs, shared by all handler coroutines.
pub struct AppContext {
    pub cats: SharedCollection<Cat>,
    pub dogs: SharedCollection<Dog>,
    pub last_added: LastAdded,
    pub views: Arc<ViewRenderer>,
}

impl AppContext {
    /// Context over a single store backing both collections.
    pub fn new<S>(store: Arc<S>, views: Arc<ViewRenderer>) -> Self
    where
        S: Collection<Cat> + Collection<Dog> + 'static,
    {
        let cats: SharedCollection<Cat> = Arc::clone(&store) as SharedCollection<Cat>;
        let dogs: SharedCollection<Dog> = store;
        Self {
            cats,
            dogs,
            last_added: LastAdded::default(),
            views,
        }
    }
}

pub type HandlerFn = fn(&HandlerRequest, &AppContext) -> ApiResult<HandlerResponse>;

/// 200 with `payload` as the JSON body.
pub(crate) fn json_ok<T: serde::Serialize>(payload: &T) -> ApiResult<HandlerResponse> {
    let body = serde_json::to_value(payload).map_err(StoreError::from)?;
    Ok(HandlerResponse::json(200, body))
}
