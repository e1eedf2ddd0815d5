//! Handler error taxonomy and its mapping onto HTTP responses.

use std::fmt;

use serde_json::json;
use tracing::{error, info};

use crate::dispatcher::HandlerResponse;
use crate::ids::RequestId;
use crate::store::StoreError;
use crate::views::ViewError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// A required input was missing or falsy. Answered with 400.
    Validation(&'static str),
    /// The persistence gateway failed. Answered with a redacted 500.
    Gateway(StoreError),
    /// A page failed to render. Answered with 500.
    View(ViewError),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::Gateway(_) | ApiError::View(_) => 500,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Validation(message) => (*message).to_string(),
            ApiError::Gateway(StoreError::Cast { field, .. }) => format!("Invalid value for {field}"),
            ApiError::Gateway(_) => "Storage operation failed".to_string(),
            ApiError::View(_) => "Failed to render view".to_string(),
        }
    }

    /// Log the full error against `request_id` and build the client response.
    #[must_use]
    pub fn into_response(self, request_id: RequestId, handler: &str) -> HandlerResponse {
        let status = self.status();
        let message = self.public_message();
        match &self {
            ApiError::Validation(_) => {
                info!(request_id = %request_id, handler, status, error = %self, "Request rejected");
                HandlerResponse::error(status, &message)
            }
            ApiError::Gateway(_) => {
                error!(request_id = %request_id, handler, status, error = %self, "Storage operation failed");
                HandlerResponse::json(
                    status,
                    json!({ "error": message, "requestId": request_id.to_string() }),
                )
            }
            ApiError::View(_) => {
                error!(request_id = %request_id, handler, status, error = %self, "View rendering failed");
                HandlerResponse::error(status, &message)
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(message) => write!(f, "validation failed: {message}"),
            ApiError::Gateway(err) => write!(f, "gateway error: {err}"),
            ApiError::View(err) => write!(f, "view error: {err}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Validation(_) => None,
            ApiError::Gateway(err) => Some(err),
            ApiError::View(err) => Some(err),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        ApiError::Gateway(value)
    }
}

impl From<ViewError> for ApiError {
    fn from(value: ViewError) -> Self {
        ApiError::View(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_400_with_message() {
        let resp = ApiError::Validation("Name is required to perform a search")
            .into_response(RequestId::new(), "search_cat_by_name");
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body, json!({ "error": "Name is required to perform a search" }));
    }

    #[test]
    fn gateway_errors_are_redacted() {
        let id = RequestId::new();
        let resp = ApiError::from(StoreError::Unavailable("disk on fire at /var/db".into()))
            .into_response(id, "create_cat");
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body["error"], "Storage operation failed");
        assert_eq!(resp.body["requestId"], id.to_string());
        assert!(!resp.body.to_string().contains("/var/db"));
    }

    #[test]
    fn cast_errors_name_the_field() {
        let err = ApiError::from(StoreError::Cast {
            field: "bedsOwned",
            value: "lots".into(),
        });
        assert_eq!(err.status(), 500);
        assert_eq!(err.public_message(), "Invalid value for bedsOwned");
    }
}
