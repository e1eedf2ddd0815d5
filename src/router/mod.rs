//! # Router Module
//!
//! Matches an incoming method and path against the service's route table and
//! names the handler that should process the request.
//!
//! Route patterns are literal paths, compiled to anchored regexes once at
//! startup. A single trailing slash is tolerated. Anything that does not match
//! falls through to the not-found page.
//!
//! ```rust,ignore
//! use kennel::router::{RouteMeta, Router};
//! use http::Method;
//!
//! let router = Router::new(vec![RouteMeta::new(Method::GET, "/cat/name", "search_cat_by_name")])?;
//! let hit = router.route(&Method::GET, "/cat/name").unwrap();
//! assert_eq!(hit.handler_name, "search_cat_by_name");
//! ```

mod core;
#[cfg(test)]
mod tests;

pub use core::{ParamVec, RouteMatch, RouteMeta, Router, MAX_INLINE_PARAMS};
