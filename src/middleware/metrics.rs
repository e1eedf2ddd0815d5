use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Request counters exposed at `/metrics` in Prometheus text format.
///
/// All counters are relaxed atomics; readings are eventually consistent.
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    client_errors: AtomicUsize,
    server_errors: AtomicUsize,
    stack_size: AtomicUsize,
    top_level_requests: AtomicUsize,
}

impl MetricsMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that reached a handler.
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Responses with 4xx and 5xx status, in that order.
    pub fn error_counts(&self) -> (usize, usize) {
        (
            self.client_errors.load(Ordering::Relaxed),
            self.server_errors.load(Ordering::Relaxed),
        )
    }

    /// Count a request served outside the dispatcher (`/health`, `/metrics`,
    /// assets, not-found pages).
    pub fn inc_top_level_request(&self) {
        self.top_level_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn top_level_request_count(&self) -> usize {
        self.top_level_requests.load(Ordering::Relaxed)
    }

    /// Render all counters in Prometheus exposition format.
    #[must_use]
    pub fn render_prometheus(&self) -> String {
        let (client_errors, server_errors) = self.error_counts();
        let mut out = String::with_capacity(1024);
        let mut metric = |name: &str, kind: &str, help: &str, value: String| {
            out.push_str(&format!(
                "# HELP {name} {help}\n# TYPE {name} {kind}\n{name} {value}\n"
            ));
        };
        metric(
            "kennel_requests_total",
            "counter",
            "Total number of handled requests",
            self.request_count().to_string(),
        );
        metric(
            "kennel_top_level_requests_total",
            "counter",
            "Requests served without a handler",
            self.top_level_request_count().to_string(),
        );
        metric(
            "kennel_client_errors_total",
            "counter",
            "Handler responses with a 4xx status",
            client_errors.to_string(),
        );
        metric(
            "kennel_server_errors_total",
            "counter",
            "Handler responses with a 5xx status",
            server_errors.to_string(),
        );
        metric(
            "kennel_request_latency_seconds",
            "gauge",
            "Average request latency in seconds",
            self.average_latency().as_secs_f64().to_string(),
        );
        metric(
            "kennel_coroutine_stack_bytes",
            "gauge",
            "Configured handler coroutine stack size",
            self.stack_size.load(Ordering::Relaxed).to_string(),
        );
        out
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn after(&self, _req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        match res.status {
            400..=499 => {
                self.client_errors.fetch_add(1, Ordering::Relaxed);
            }
            500..=599 => {
                self.server_errors.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
        let stack_size = if may::coroutine::is_coroutine() {
            may::coroutine::current().stack_size()
        } else {
            may::config().get_stack_size()
        };
        self.stack_size.store(stack_size, Ordering::Relaxed);
    }
}
