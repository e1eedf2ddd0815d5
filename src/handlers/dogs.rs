//! Dog endpoints.

use tracing::info;

use super::types::{CreateDogRequest, DogSummary, NameQuery, NotFoundPayload};
use super::{json_ok, AppContext};
use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::error::ApiResult;
use crate::model::Dog;
use crate::store::{cast_integer, Collection, Record};

/// `POST /dog`: save a dog and echo what was stored.
pub fn create_dog(req: &HandlerRequest, ctx: &AppContext) -> ApiResult<HandlerResponse> {
    let input = CreateDogRequest::try_from(req)?;
    let age = cast_integer("age", &input.age)?;
    let record = Record::new(Dog::new(input.name, input.breed, age));
    ctx.dogs.save(&record)?;
    info!(request_id = %req.request_id, id = %record.id, name = %record.doc.name, "Dog created");
    json_ok(&DogSummary::from(&record))
}

/// `GET /dog/name?name=`: `{name, breed, age}` of the first match.
pub fn search_dog_by_name(req: &HandlerRequest, ctx: &AppContext) -> ApiResult<HandlerResponse> {
    let query = NameQuery::try_from(req)?;
    match ctx.dogs.find_by_name(&query.name)? {
        Some(record) => json_ok(&DogSummary::from(&record)),
        None => json_ok(&NotFoundPayload {
            error: "Dog not found",
        }),
    }
}
