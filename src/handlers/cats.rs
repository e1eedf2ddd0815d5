//! Cat endpoints and the last-added slot.

use serde_json::Value;
use tracing::info;

use super::types::{CatSummary, CreateCatRequest, LastAddedName, NameQuery, NotFoundPayload};
use super::{json_ok, AppContext};
use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::error::ApiResult;
use crate::model::Cat;
use crate::store::{cast_integer, Collection, Record, StoreError};

/// `GET /getCat?name=`: the raw record, or `null` when nothing matches.
/// A missing name matches nothing.
pub fn find_cat_by_name(req: &HandlerRequest, ctx: &AppContext) -> ApiResult<HandlerResponse> {
    let record = match req.get_query_param("name") {
        Some(name) => ctx.cats.find_by_name(name)?,
        None => None,
    };
    match record {
        Some(record) => json_ok(&record),
        None => Ok(HandlerResponse::json(200, Value::Null)),
    }
}

/// Every stored cat, in insertion order.
pub fn list_cats(ctx: &AppContext) -> ApiResult<Vec<Record<Cat>>> {
    Ok(ctx.cats.find_all()?)
}

/// `GET /name`: the last-added cat's name.
pub fn get_last_added_name(_req: &HandlerRequest, ctx: &AppContext) -> ApiResult<HandlerResponse> {
    json_ok(&LastAddedName {
        name: ctx.last_added.current().doc.name.clone(),
    })
}

/// `POST /name`: create a cat and make it the last-added one.
pub fn create_cat(req: &HandlerRequest, ctx: &AppContext) -> ApiResult<HandlerResponse> {
    let input = CreateCatRequest::try_from(req)?;
    let beds = cast_integer("bedsOwned", &input.beds)?;
    let record = Record::new(Cat::new(input.full_name(), beds));

    let saved = ctx
        .last_added
        .replace_with(record, |record| ctx.cats.save(record))?;
    info!(request_id = %req.request_id, id = %saved.id, name = %saved.doc.name, "Cat created");
    json_ok(&CatSummary::from(saved.as_ref()))
}

/// `GET /cat/name?name=`: `{name, beds}` of the first match.
pub fn search_cat_by_name(req: &HandlerRequest, ctx: &AppContext) -> ApiResult<HandlerResponse> {
    let query = NameQuery::try_from(req)?;
    match ctx.cats.find_by_name(&query.name)? {
        Some(record) => json_ok(&CatSummary::from(&record)),
        None => json_ok(&NotFoundPayload {
            error: "No cats found",
        }),
    }
}

/// `POST /updateLast`: one more bed for the last-added cat.
///
/// The incremented copy is saved first and only then becomes the slot's
/// value, so a failed save leaves the count where it was. A count already at
/// `i64::MAX` is rejected as a cast failure.
pub fn increment_last_added(req: &HandlerRequest, ctx: &AppContext) -> ApiResult<HandlerResponse> {
    let updated = ctx.last_added.update_with(
        |cat| {
            let beds = cat.beds_owned;
            cat.beds_owned = beds.checked_add(1).ok_or_else(|| StoreError::Cast {
                field: "bedsOwned",
                value: format!("{beds} + 1"),
            })?;
            Ok(())
        },
        |record| ctx.cats.save(record),
    )?;
    info!(
        request_id = %req.request_id,
        id = %updated.id,
        beds = updated.doc.beds_owned,
        "Last-added cat incremented"
    );
    json_ok(&CatSummary::from(updated.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{context, request};
    use serde_json::json;

    #[test]
    fn create_then_read_back_name() {
        let (ctx, store) = context();
        let resp = create_cat(
            &request("/name", &[], Some(json!({"firstname": "Alice", "lastname": "Smith", "beds": 2}))),
            &ctx,
        )
        .unwrap();
        assert_eq!(resp.body, json!({"name": "Alice Smith", "beds": 2}));
        assert_eq!(store.len("cats"), 1);

        let name = get_last_added_name(&request("/name", &[], None), &ctx).unwrap();
        assert_eq!(name.body, json!({"name": "Alice Smith"}));
    }

    #[test]
    fn list_cats_in_insertion_order() {
        let (ctx, store) = context();
        for (first, beds) in [("Tom", 1), ("Kit", 4)] {
            create_cat(
                &request("/name", &[], Some(json!({"firstname": first, "lastname": "Cat", "beds": beds}))),
                &ctx,
            )
            .unwrap();
        }
        let names: Vec<String> = list_cats(&ctx).unwrap().into_iter().map(|r| r.doc.name).collect();
        assert_eq!(names, ["Tom Cat", "Kit Cat"]);

        store.set_fail_reads(true);
        assert!(list_cats(&ctx).is_err());
    }

    #[test]
    fn create_with_uncastable_beds_fails_without_moving_slot() {
        let (ctx, store) = context();
        let err = create_cat(
            &request("/name", &[], Some(json!({"firstname": "A", "lastname": "B", "beds": "lots"}))),
            &ctx,
        )
        .unwrap_err();
        assert_eq!(err.status(), 500);
        assert_eq!(err.public_message(), "Invalid value for bedsOwned");
        assert!(store.is_empty("cats"));
        assert_eq!(ctx.last_added.current().doc, Cat::placeholder());
    }

    #[test]
    fn increments_placeholder_and_inserts_it() {
        let (ctx, store) = context();
        let first = increment_last_added(&request("/updateLast", &[], None), &ctx).unwrap();
        let second = increment_last_added(&request("/updateLast", &[], None), &ctx).unwrap();
        assert_eq!(first.body, json!({"name": "unknown", "beds": 1}));
        assert_eq!(second.body, json!({"name": "unknown", "beds": 2}));
        assert_eq!(store.len("cats"), 1);
    }

    #[test]
    fn increment_at_max_beds_is_rejected_and_slot_kept() {
        let (ctx, _store) = context();
        create_cat(
            &request(
                "/name",
                &[],
                Some(json!({"firstname": "Big", "lastname": "Cat", "beds": i64::MAX})),
            ),
            &ctx,
        )
        .unwrap();

        let err = increment_last_added(&request("/updateLast", &[], None), &ctx).unwrap_err();
        assert_eq!(err.status(), 500);
        assert_eq!(err.public_message(), "Invalid value for bedsOwned");
        assert_eq!(ctx.last_added.current().doc.beds_owned, i64::MAX);
        let stored: Option<Record<Cat>> = ctx.cats.find_by_name("Big Cat").unwrap();
        assert_eq!(stored.unwrap().doc.beds_owned, i64::MAX);
    }

    #[test]
    fn find_cat_by_name_returns_raw_record_or_null() {
        let (ctx, _store) = context();
        let missing = find_cat_by_name(&request("/getCat", &[], None), &ctx).unwrap();
        assert_eq!(missing.body, Value::Null);

        let cat = Record::new(Cat::new("Tom", 4));
        ctx.cats.save(&cat).unwrap();
        let hit = find_cat_by_name(&request("/getCat", &[("name", "Tom")], None), &ctx).unwrap();
        assert_eq!(
            hit.body,
            json!({"_id": cat.id.to_string(), "name": "Tom", "bedsOwned": 4})
        );
    }

    #[test]
    fn search_reports_missing_name_and_no_match() {
        let (ctx, _store) = context();
        let err = search_cat_by_name(&request("/cat/name", &[], None), &ctx).unwrap_err();
        assert_eq!(err.status(), 400);
        let none =
            search_cat_by_name(&request("/cat/name", &[("name", "Nonexistent")], None), &ctx)
                .unwrap();
        assert_eq!(none.status, 200);
        assert_eq!(none.body, json!({"error": "No cats found"}));
    }
}
