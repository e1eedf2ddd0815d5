use crate::dispatcher::HeaderVec;
use crate::router::ParamVec;
use may_minihttp::Request;
use serde_json::{Map, Value};
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Parsed HTTP request data used by `AppService`.
#[derive(Debug, PartialEq)]
pub struct ParsedRequest {
    pub method: String,
    /// Path and query string as sent by the client.
    pub raw_url: String,
    /// Path without the query string.
    pub path: String,
    /// Lowercased header names.
    pub headers: HeaderVec,
    pub query_params: ParamVec,
    /// JSON body, or a form body converted to an object of strings.
    pub body: Option<Value>,
}

impl ParsedRequest {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Decode the query string of `raw_url`. Repeated names are kept in order.
#[must_use]
pub fn parse_query_params(raw_url: &str) -> ParamVec {
    match raw_url.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
            .collect(),
        None => ParamVec::new(),
    }
}

/// Decode a form body into a JSON object. A repeated field keeps its last value.
#[must_use]
pub fn parse_form_body(raw: &str) -> Value {
    let fields: Map<String, Value> = url::form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect();
    Value::Object(fields)
}

/// Interpret a request body according to its content type.
///
/// Form bodies are recognised by content type; everything else is tried as
/// JSON. A body that is neither yields `None`.
#[must_use]
pub fn parse_body(content_type: Option<&str>, raw: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    let is_form = content_type
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE))
        .unwrap_or(false);
    if is_form {
        return Some(parse_form_body(raw));
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(json) => {
            debug!(body_fields = json.as_object().map(Map::len), "JSON body parsed");
            Some(json)
        }
        Err(e) => {
            debug!(error = %e, content_type = ?content_type, "Body is not JSON, ignoring");
            None
        }
    }
}

/// Extract method, URL, headers, query parameters and body from a
/// `may_minihttp` request.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let raw_url = req.path().to_string();
    let path = raw_url.split('?').next().unwrap_or("/").to_string();

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::from(h.name.to_ascii_lowercase()),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();
    let query_params = parse_query_params(&raw_url);

    let content_type = headers
        .iter()
        .find(|(k, _)| k.as_ref() == "content-type")
        .map(|(_, v)| v.clone());

    let mut raw_body = String::new();
    let body = match req.body().read_to_string(&mut raw_body) {
        Ok(size) if size > 0 => {
            debug!(body_size_bytes = size, content_type = ?content_type, "Request body read");
            parse_body(content_type.as_deref(), &raw_body)
        }
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "Request body unreadable");
            None
        }
    };

    info!(
        method = %method,
        path = %path,
        headers_count = headers.len(),
        query_count = query_params.len(),
        has_body = body.is_some(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        raw_url,
        path,
        headers,
        query_params,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/cat/name?name=Alice%20Smith&x=1");
        assert_eq!(q.len(), 2);
        assert_eq!(q[0].0.as_ref(), "name");
        assert_eq!(q[0].1, "Alice Smith");
        assert!(parse_query_params("/cat/name").is_empty());
    }

    #[test]
    fn test_form_body() {
        let body = parse_body(
            Some("application/x-www-form-urlencoded; charset=UTF-8"),
            "firstname=Alice&lastname=Smith&beds=2",
        );
        assert_eq!(
            body,
            Some(json!({"firstname": "Alice", "lastname": "Smith", "beds": "2"}))
        );
    }

    #[test]
    fn test_form_plus_decodes_to_space() {
        assert_eq!(parse_form_body("name=Tom+Cat"), json!({"name": "Tom Cat"}));
    }

    #[test]
    fn test_json_body() {
        let body = parse_body(Some("application/json"), r#"{"beds": 2}"#);
        assert_eq!(body, Some(json!({"beds": 2})));
        assert_eq!(parse_body(None, r#"{"beds": 2}"#), Some(json!({"beds": 2})));
    }

    #[test]
    fn test_unparseable_or_empty_body() {
        assert_eq!(parse_body(Some("application/json"), "{oops"), None);
        assert_eq!(parse_body(Some("application/json"), "  "), None);
    }
}
