//! Server-rendered pages.

use serde_json::json;

use super::cats::list_cats;
use super::AppContext;
use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::error::ApiResult;
use crate::views::View;

/// `GET /`: the home page, showing the last-added cat's name.
pub fn render_home(_req: &HandlerRequest, ctx: &AppContext) -> ApiResult<HandlerResponse> {
    let current = ctx.last_added.current();
    let page = ctx.views.render(
        View::Index,
        json!({
            "currentName": current.doc.name,
            "title": "Home",
            "pageName": "Home Page",
        }),
    )?;
    Ok(HandlerResponse::html(200, page))
}

/// `GET /page1`: every cat in the collection.
pub fn render_page1(_req: &HandlerRequest, ctx: &AppContext) -> ApiResult<HandlerResponse> {
    let cats = list_cats(ctx)?;
    let page = ctx.views.render(View::Page1, json!({ "cats": cats }))?;
    Ok(HandlerResponse::html(200, page))
}

pub fn render_page2(_req: &HandlerRequest, ctx: &AppContext) -> ApiResult<HandlerResponse> {
    render_static(ctx, View::Page2)
}

pub fn render_page3(_req: &HandlerRequest, ctx: &AppContext) -> ApiResult<HandlerResponse> {
    render_static(ctx, View::Page3)
}

pub fn render_page4(_req: &HandlerRequest, ctx: &AppContext) -> ApiResult<HandlerResponse> {
    render_static(ctx, View::Page4)
}

fn render_static(ctx: &AppContext, view: View) -> ApiResult<HandlerResponse> {
    let page = ctx.views.render(view, json!({}))?;
    Ok(HandlerResponse::html(200, page))
}
