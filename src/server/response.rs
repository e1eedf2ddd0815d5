use crate::dispatcher::{HandlerResponse, CONTENT_TYPE_HTML, CONTENT_TYPE_JSON};
use may_minihttp::Response;
use serde_json::Value;
use tracing::error;

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Full `Content-Type` header line for a MIME type.
///
/// `may_minihttp` only accepts `'static` header lines, so the set of content
/// types this service emits is closed.
pub(crate) fn content_type_header(mime: &str) -> &'static str {
    match mime {
        CONTENT_TYPE_JSON => "Content-Type: application/json",
        CONTENT_TYPE_HTML | "text/html" => "Content-Type: text/html; charset=utf-8",
        "text/css" => "Content-Type: text/css",
        "application/javascript" => "Content-Type: application/javascript",
        "image/png" => "Content-Type: image/png",
        "image/svg+xml" => "Content-Type: image/svg+xml",
        "image/x-icon" => "Content-Type: image/x-icon",
        "text/plain" | "text/plain; version=0.0.4" => "Content-Type: text/plain; charset=utf-8",
        _ => "Content-Type: application/octet-stream",
    }
}

/// Write a handler response. String bodies go out verbatim under the
/// response's content type (plain text if none is set); other values are
/// serialized as JSON.
pub fn write_handler_response(res: &mut Response, resp: HandlerResponse) {
    res.status_code(usize::from(resp.status), status_reason(resp.status));
    let declared = resp.get_header("content-type").map(str::to_owned);
    match resp.body {
        Value::String(s) => {
            res.header(content_type_header(declared.as_deref().unwrap_or("text/plain")));
            res.body_vec(s.into_bytes());
        }
        other => write_json_body(res, &other),
    }
}

/// Write `body` as a JSON response with `status`.
pub fn write_json(res: &mut Response, status: u16, body: &Value) {
    res.status_code(usize::from(status), status_reason(status));
    write_json_body(res, body);
}

/// Write raw bytes with the given MIME type and a 200 status.
pub fn write_bytes(res: &mut Response, mime: &str, bytes: Vec<u8>) {
    res.status_code(200, "OK");
    res.header(content_type_header(mime));
    res.body_vec(bytes);
}

fn write_json_body(res: &mut Response, body: &Value) {
    res.header(content_type_header(CONTENT_TYPE_JSON));
    match serde_json::to_vec(body) {
        Ok(bytes) => res.body_vec(bytes),
        Err(e) => {
            error!(error = %e, "Failed to serialize response body");
            res.status_code(500, status_reason(500));
            res.body_vec(br#"{"error":"Internal server error"}"#.to_vec());
        }
    }
}
