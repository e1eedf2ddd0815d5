//! Typed inputs and outputs of the request handlers.
//!
//! Presence checks treat a field as missing when it is absent, `null`, `""`,
//! `false` or `0`. Numeric fields are passed through untouched so the
//! gateway's cast decides whether they are acceptable.

use serde::Serialize;
use serde_json::Value;

use crate::dispatcher::HandlerRequest;
use crate::error::ApiError;
use crate::model::{Cat, Dog};
use crate::store::Record;

pub const CAT_FIELDS_REQUIRED: &str = "firstname,lastname and beds are all required";
pub const DOG_FIELDS_REQUIRED: &str = "name, breed and age are all required";
pub const SEARCH_NAME_REQUIRED: &str = "Name is required to perform a search";

/// `value` unless it counts as missing.
pub(crate) fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Text form of a submitted value. Non-strings use their JSON encoding.
fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Body of `POST /name`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCatRequest {
    pub firstname: String,
    pub lastname: String,
    pub beds: Value,
}

impl CreateCatRequest {
    /// `"<firstname> <lastname>"`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

impl TryFrom<&HandlerRequest> for CreateCatRequest {
    type Error = ApiError;

    fn try_from(req: &HandlerRequest) -> Result<Self, Self::Error> {
        let field = |name| present(req.body_field(name));
        match (field("firstname"), field("lastname"), field("beds")) {
            (Some(first), Some(last), Some(beds)) => Ok(Self {
                firstname: as_text(first),
                lastname: as_text(last),
                beds: beds.clone(),
            }),
            _ => Err(ApiError::Validation(CAT_FIELDS_REQUIRED)),
        }
    }
}

/// Body of `POST /dog`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateDogRequest {
    pub name: String,
    pub breed: String,
    pub age: Value,
}

impl TryFrom<&HandlerRequest> for CreateDogRequest {
    type Error = ApiError;

    fn try_from(req: &HandlerRequest) -> Result<Self, Self::Error> {
        let field = |name| present(req.body_field(name));
        match (field("name"), field("breed"), field("age")) {
            (Some(name), Some(breed), Some(age)) => Ok(Self {
                name: as_text(name),
                breed: as_text(breed),
                age: age.clone(),
            }),
            _ => Err(ApiError::Validation(DOG_FIELDS_REQUIRED)),
        }
    }
}

/// `?name=` of the search endpoints. Empty counts as missing.
#[derive(Debug, Clone, PartialEq)]
pub struct NameQuery {
    pub name: String,
}

impl TryFrom<&HandlerRequest> for NameQuery {
    type Error = ApiError;

    fn try_from(req: &HandlerRequest) -> Result<Self, Self::Error> {
        match req.get_query_param("name") {
            Some(name) if !name.is_empty() => Ok(Self {
                name: name.to_string(),
            }),
            _ => Err(ApiError::Validation(SEARCH_NAME_REQUIRED)),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CatSummary {
    pub name: String,
    pub beds: i64,
}

impl From<&Record<Cat>> for CatSummary {
    fn from(record: &Record<Cat>) -> Self {
        Self {
            name: record.doc.name.clone(),
            beds: record.doc.beds_owned,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DogSummary {
    pub name: String,
    pub breed: String,
    pub age: i64,
}

impl From<&Record<Dog>> for DogSummary {
    fn from(record: &Record<Dog>) -> Self {
        Self {
            name: record.doc.name.clone(),
            breed: record.doc.breed.clone(),
            age: record.doc.age,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LastAddedName {
    pub name: String,
}

/// A lookup that found nothing. Sent with 200.
#[derive(Debug, Serialize, PartialEq)]
pub struct NotFoundPayload {
    pub error: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::HeaderVec;
    use crate::ids::RequestId;
    use crate::router::ParamVec;
    use http::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn request(body: Option<Value>, name: Option<&str>) -> HandlerRequest {
        let (reply_tx, _rx) = may::sync::mpsc::channel();
        let mut query_params = ParamVec::new();
        if let Some(name) = name {
            query_params.push((Arc::from("name"), name.to_string()));
        }
        HandlerRequest {
            request_id: RequestId::new(),
            method: Method::POST,
            path: "/name".into(),
            raw_url: "/name".into(),
            handler_name: "create_cat".into(),
            query_params,
            headers: HeaderVec::new(),
            body,
            reply_tx,
        }
    }

    #[test]
    fn falsy_values_count_as_missing() {
        for falsy in [json!(null), json!(""), json!(false), json!(0), json!(0.0)] {
            assert!(present(Some(&falsy)).is_none(), "{falsy}");
        }
        for truthy in [json!("0"), json!(true), json!(2), json!([]), json!({})] {
            assert!(present(Some(&truthy)).is_some(), "{truthy}");
        }
    }

    #[test]
    fn create_cat_needs_every_field() {
        let ok = CreateCatRequest::try_from(&request(
            Some(json!({"firstname": "Alice", "lastname": "Smith", "beds": "2"})),
            None,
        ))
        .unwrap();
        assert_eq!(ok.full_name(), "Alice Smith");
        assert_eq!(ok.beds, json!("2"));

        for body in [
            None,
            Some(json!({"firstname": "Alice", "lastname": "Smith"})),
            Some(json!({"firstname": "Alice", "lastname": "Smith", "beds": 0})),
            Some(json!({"firstname": "", "lastname": "Smith", "beds": 1})),
        ] {
            let err = CreateCatRequest::try_from(&request(body, None)).unwrap_err();
            assert_eq!(err.public_message(), CAT_FIELDS_REQUIRED);
        }
    }

    #[test]
    fn create_dog_needs_every_field() {
        let ok = CreateDogRequest::try_from(&request(
            Some(json!({"name": "Rex", "breed": "Lab", "age": 3})),
            None,
        ))
        .unwrap();
        assert_eq!(ok.name, "Rex");
        let err =
            CreateDogRequest::try_from(&request(Some(json!({"name": "Rex", "breed": "Lab"})), None))
                .unwrap_err();
        assert_eq!(err.public_message(), DOG_FIELDS_REQUIRED);
    }

    #[test]
    fn name_query_rejects_missing_and_empty() {
        assert_eq!(
            NameQuery::try_from(&request(None, Some("Tom"))).unwrap().name,
            "Tom"
        );
        assert!(NameQuery::try_from(&request(None, Some(""))).is_err());
        assert!(NameQuery::try_from(&request(None, None)).is_err());
    }
}
