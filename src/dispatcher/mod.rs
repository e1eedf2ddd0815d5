//! # Dispatcher Module
//!
//! Coroutine-based handler dispatch. Every registered handler runs in its own
//! `may` coroutine and receives [`HandlerRequest`]s over an MPSC channel. Each
//! request carries a reply channel; the HTTP service coroutine blocks on it
//! until the handler answers.
//!
//! ## Request Flow
//!
//! 1. Router matches the method and path to a handler name
//! 2. Middleware `before` hooks run (any may short-circuit with a response)
//! 3. The request is sent to the handler coroutine
//! 4. The handler's single [`HandlerResponse`] comes back on the reply channel
//! 5. Middleware `after` hooks observe the response and latency
//!
//! ## Error Handling
//!
//! - Handler panics are caught and answered with a 500
//! - A closed handler channel is answered with a 503
//! - Unknown handler names yield `None`, which the service turns into a 500
//!
//! Coroutine stack size comes from [`crate::runtime_config::RuntimeConfig`].

mod core;

pub use core::{
    Dispatcher, HandlerRequest, HandlerResponse, HandlerSender, HeaderVec, CONTENT_TYPE_HTML,
    CONTENT_TYPE_JSON, MAX_INLINE_HEADERS,
};
