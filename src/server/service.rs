use super::request::{parse_request, ParsedRequest};
use super::response::{write_bytes, write_handler_response, write_json};
use crate::dispatcher::{Dispatcher, HandlerResponse};
use crate::ids::RequestId;
use crate::middleware::MetricsMiddleware;
use crate::router::Router;
use crate::static_files::StaticFiles;
use crate::views::{View, ViewRenderer};
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::{debug, error, info};

const ASSETS_PREFIX: &str = "/assets/";

/// The `may_minihttp` service: infrastructure endpoints, static assets,
/// dispatched routes and the not-found page.
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<Router>,
    pub dispatcher: Arc<Dispatcher>,
    pub metrics: Arc<MetricsMiddleware>,
    pub views: Arc<ViewRenderer>,
    pub assets: Option<StaticFiles>,
}

impl AppService {
    pub fn new(
        router: Arc<Router>,
        dispatcher: Arc<Dispatcher>,
        metrics: Arc<MetricsMiddleware>,
        views: Arc<ViewRenderer>,
    ) -> Self {
        Self {
            router,
            dispatcher,
            metrics,
            views,
            assets: None,
        }
    }

    pub fn with_assets(mut self, assets: StaticFiles) -> Self {
        self.assets = Some(assets);
        self
    }

    /// Render the not-found page for `raw_url` with a 404.
    fn not_found(&self, request_id: RequestId, raw_url: &str) -> HandlerResponse {
        info!(request_id = %request_id, url = %raw_url, "No route for request");
        match self.views.render(View::NotFound, json!({ "page": raw_url })) {
            Ok(page) => HandlerResponse::html(404, page),
            Err(e) => {
                error!(request_id = %request_id, error = %e, "Not-found page failed to render");
                HandlerResponse::error(500, "Failed to render view")
            }
        }
    }

    fn serve_asset(&self, res: &mut Response, path: &str) -> bool {
        let (Some(assets), Some(file)) = (&self.assets, path.strip_prefix(ASSETS_PREFIX)) else {
            return false;
        };
        match assets.load(file) {
            Ok((bytes, mime)) => {
                write_bytes(res, mime, bytes);
                true
            }
            Err(e) => {
                debug!(path = %path, error = %e, "Asset not served");
                false
            }
        }
    }
}

/// `{ "status": "ok" }`.
pub fn health_endpoint(res: &mut Response) -> io::Result<()> {
    write_json(res, 200, &json!({ "status": "ok" }));
    Ok(())
}

/// Prometheus text format statistics.
pub fn metrics_endpoint(res: &mut Response, metrics: &MetricsMiddleware) -> io::Result<()> {
    write_bytes(
        res,
        "text/plain; version=0.0.4",
        metrics.render_prometheus().into_bytes(),
    );
    Ok(())
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);
        let request_id = RequestId::from_header_or_new(parsed.header("x-request-id"));
        let ParsedRequest {
            method,
            raw_url,
            path,
            headers,
            query_params,
            body,
        } = parsed;

        if method == "GET" {
            match path.as_str() {
                "/health" => {
                    self.metrics.inc_top_level_request();
                    return health_endpoint(res);
                }
                "/metrics" => {
                    self.metrics.inc_top_level_request();
                    return metrics_endpoint(res, &self.metrics);
                }
                _ => {}
            }
            if self.serve_asset(res, &path) {
                self.metrics.inc_top_level_request();
                return Ok(());
            }
        }

        let route = Method::from_bytes(method.as_bytes())
            .ok()
            .and_then(|m| self.router.route(&m, &path));

        let response = match route {
            Some(mut route_match) => {
                route_match.query_params = query_params;
                self.dispatcher
                    .dispatch(route_match, request_id, raw_url, headers, body)
                    .unwrap_or_else(|| {
                        HandlerResponse::json(
                            500,
                            json!({
                                "error": "Handler failed or not registered",
                                "requestId": request_id.to_string(),
                            }),
                        )
                    })
            }
            None => {
                self.metrics.inc_top_level_request();
                self.not_found(request_id, &raw_url)
            }
        };

        write_handler_response(res, response);
        Ok(())
    }
}
