use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::router::{ParamVec, RouteMatch};
use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde_json::{json, Value};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage. Names are lowercased by the request parser.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";

/// Request data passed to a handler coroutine.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    pub request_id: RequestId,
    pub method: Method,
    /// Request path without the query string.
    pub path: String,
    /// Path plus query string, as the client sent it.
    pub raw_url: String,
    pub handler_name: String,
    pub query_params: ParamVec,
    pub headers: HeaderVec,
    /// JSON or form body, normalized to a JSON object.
    pub body: Option<Value>,
    pub reply_tx: mpsc::Sender<HandlerResponse>,
}

impl HandlerRequest {
    /// Last occurrence wins (`?name=a&name=b` yields `b`).
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// A top-level field of the request body, if the body is an object.
    #[must_use]
    pub fn body_field(&self, name: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|b| b.get(name))
    }
}

/// Response sent back from a handler coroutine.
///
/// String bodies are written verbatim with the response's content type;
/// anything else is serialized as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    pub headers: HeaderVec,
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), CONTENT_TYPE_JSON.to_string()));
        Self::new(status, headers, body)
    }

    /// `{"error": message}` with the given status.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    #[must_use]
    pub fn html(status: u16, page: String) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), CONTENT_TYPE_HTML.to_string()));
        Self::new(status, headers, Value::String(page))
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub type HandlerSender = mpsc::Sender<HandlerRequest>;

/// Routes matched requests to registered handler coroutines.
#[derive(Clone)]
pub struct Dispatcher {
    handlers: HashMap<String, HandlerSender>,
    middlewares: Vec<Arc<dyn Middleware>>,
    stack_size: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Dispatcher whose handler coroutines get a 64KB stack.
    #[must_use]
    pub fn new() -> Self {
        Self::with_stack_size(0x10000)
    }

    #[must_use]
    pub fn with_stack_size(stack_size: usize) -> Self {
        Self {
            handlers: HashMap::new(),
            middlewares: Vec::new(),
            stack_size,
        }
    }

    /// Middleware runs in insertion order.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Spawn a coroutine that serves requests for `name` with `handler_fn`.
    ///
    /// The handler returns exactly one response per request, which is sent
    /// back on the request's reply channel. A panicking handler is answered
    /// with a 500 and the coroutine keeps serving.
    ///
    /// Registering a name twice replaces the previous coroutine; dropping its
    /// sender closes the channel and the old coroutine exits.
    ///
    /// # Safety
    ///
    /// Calls `may::coroutine::Builder::spawn`, which is unsafe in the `may`
    /// runtime. The handler must not block the OS thread for long stretches
    /// or use thread-local storage across suspension points.
    pub unsafe fn register_handler<F>(&mut self, name: &str, handler_fn: F) -> io::Result<()>
    where
        F: Fn(&HandlerRequest) -> HandlerResponse + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<HandlerRequest>();
        let coroutine_name = name.to_string();
        let stack_size = self.stack_size;

        // SAFETY: forwarded to the caller through this function's contract.
        let spawn_result = unsafe {
            coroutine::Builder::new()
                .name(format!("handler:{name}"))
                .stack_size(stack_size)
                .spawn(move || {
                    debug!(handler_name = %coroutine_name, stack_size, "Handler coroutine start");
                    for req in rx.iter() {
                        serve_one(&coroutine_name, &handler_fn, req);
                    }
                    debug!(handler_name = %coroutine_name, "Handler coroutine exit");
                })
        };

        if let Err(e) = spawn_result {
            error!(handler_name = %name, error = %e, stack_size, "Failed to spawn handler coroutine");
            return Err(e);
        }

        if self.handlers.insert(name.to_string(), tx).is_some() {
            warn!(handler_name = %name, "Replaced existing handler - old coroutine will exit");
        }
        info!(
            handler_name = %name,
            total_handlers = self.handlers.len(),
            "Handler registered"
        );
        Ok(())
    }

    /// Send a matched request to its handler and wait for the response.
    ///
    /// Returns `None` when no handler is registered under the route's name.
    #[must_use]
    pub fn dispatch(
        &self,
        route_match: RouteMatch,
        request_id: RequestId,
        raw_url: String,
        headers: HeaderVec,
        body: Option<Value>,
    ) -> Option<HandlerResponse> {
        let Some(tx) = self.handlers.get(&route_match.handler_name) else {
            let available: Vec<&String> = self.handlers.keys().collect();
            error!(
                request_id = %request_id,
                handler_name = %route_match.handler_name,
                available_handlers = ?available,
                "Handler not found"
            );
            return None;
        };

        let (reply_tx, reply_rx) = mpsc::channel();
        let path = raw_url.split('?').next().unwrap_or("/").to_string();
        let request = HandlerRequest {
            request_id,
            method: route_match.route.method.clone(),
            path,
            raw_url,
            handler_name: route_match.handler_name,
            query_params: route_match.query_params,
            headers,
            body,
            reply_tx,
        };

        let mut early = None;
        for mw in &self.middlewares {
            let resp = mw.before(&request);
            if early.is_none() {
                early = resp;
            }
        }

        let (mut resp, latency) = match early {
            Some(resp) => {
                debug!(request_id = %request_id, status = resp.status, "Middleware returned early response");
                (resp, Duration::ZERO)
            }
            None => {
                info!(
                    request_id = %request_id,
                    handler_name = %request.handler_name,
                    method = %request.method,
                    path = %request.path,
                    "Request dispatched to handler"
                );
                let start = Instant::now();
                if let Err(e) = tx.send(request.clone()) {
                    error!(
                        request_id = %request_id,
                        handler_name = %request.handler_name,
                        error = %e,
                        "Failed to send request to handler"
                    );
                    return Some(unavailable(&request));
                }
                match reply_rx.recv() {
                    Ok(resp) => (resp, start.elapsed()),
                    Err(e) => {
                        error!(
                            request_id = %request_id,
                            handler_name = %request.handler_name,
                            error = %e,
                            "Handler channel closed before replying"
                        );
                        return Some(unavailable(&request));
                    }
                }
            }
        };

        for mw in &self.middlewares {
            mw.after(&request, &mut resp, latency);
        }
        Some(resp)
    }
}

fn unavailable(req: &HandlerRequest) -> HandlerResponse {
    HandlerResponse::json(
        503,
        json!({ "error": "Handler unavailable", "requestId": req.request_id.to_string() }),
    )
}

fn serve_one<F>(handler_name: &str, handler_fn: &F, req: HandlerRequest)
where
    F: Fn(&HandlerRequest) -> HandlerResponse,
{
    let request_id = req.request_id;
    debug!(
        request_id = %request_id,
        handler_name,
        query_params = ?req.query_params,
        "Handler execution start"
    );
    let start = Instant::now();

    let response = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler_fn(&req))) {
        Ok(resp) => {
            debug!(
                request_id = %request_id,
                handler_name,
                status = resp.status,
                execution_time_ms = start.elapsed().as_millis() as u64,
                "Handler execution complete"
            );
            resp
        }
        Err(panic) => {
            let panic_message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(
                request_id = %request_id,
                handler_name,
                panic_message = %panic_message,
                "Handler panicked"
            );
            HandlerResponse::json(
                500,
                json!({ "error": "Internal server error", "requestId": request_id.to_string() }),
            )
        }
    };

    if req.reply_tx.send(response).is_err() {
        warn!(request_id = %request_id, handler_name, "Requester went away before the reply");
    }
}
