//! The route table and the wiring of handlers into the dispatcher.

use std::io;
use std::sync::Arc;

use http::Method;

use crate::dispatcher::{Dispatcher, HandlerRequest};
use crate::handlers::{cats, dogs, pages, AppContext, HandlerFn};
use crate::router::RouteMeta;

/// One routed endpoint.
#[derive(Clone)]
pub struct Endpoint {
    pub method: Method,
    pub path: &'static str,
    pub handler_name: &'static str,
    pub handler: HandlerFn,
}

fn endpoint(
    method: Method,
    path: &'static str,
    handler_name: &'static str,
    handler: HandlerFn,
) -> Endpoint {
    Endpoint {
        method,
        path,
        handler_name,
        handler,
    }
}

/// Every endpoint served through the dispatcher.
pub fn endpoints() -> [Endpoint; 12] {
    [
        endpoint(Method::GET, "/", "render_home", pages::render_home),
        endpoint(Method::GET, "/page1", "render_page1", pages::render_page1),
        endpoint(Method::GET, "/page2", "render_page2", pages::render_page2),
        endpoint(Method::GET, "/page3", "render_page3", pages::render_page3),
        endpoint(Method::GET, "/page4", "render_page4", pages::render_page4),
        endpoint(Method::GET, "/getCat", "find_cat_by_name", cats::find_cat_by_name),
        endpoint(Method::GET, "/name", "get_last_added_name", cats::get_last_added_name),
        endpoint(Method::POST, "/name", "create_cat", cats::create_cat),
        endpoint(Method::GET, "/cat/name", "search_cat_by_name", cats::search_cat_by_name),
        endpoint(Method::POST, "/updateLast", "increment_last_added", cats::increment_last_added),
        endpoint(Method::POST, "/dog", "create_dog", dogs::create_dog),
        endpoint(Method::GET, "/dog/name", "search_dog_by_name", dogs::search_dog_by_name),
    ]
}

/// Route metadata for [`crate::router::Router::new`].
pub fn route_table() -> Vec<RouteMeta> {
    endpoints()
        .iter()
        .map(|e| RouteMeta::new(e.method.clone(), e.path, e.handler_name))
        .collect()
}

/// Register one handler coroutine per endpoint, all sharing `ctx`.
///
/// # Safety
///
/// Spawns coroutines; see [`Dispatcher::register_handler`].
pub unsafe fn register_all(dispatcher: &mut Dispatcher, ctx: Arc<AppContext>) -> io::Result<()> {
    for endpoint in endpoints() {
        let ctx = Arc::clone(&ctx);
        let handler = endpoint.handler;
        // SAFETY: forwarded to the caller through this function's contract.
        unsafe {
            dispatcher.register_handler(endpoint.handler_name, move |req: &HandlerRequest| {
                handler(req, &ctx)
                    .unwrap_or_else(|err| err.into_response(req.request_id, &req.handler_name))
            })?;
        }
    }
    Ok(())
}
