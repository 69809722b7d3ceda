//! Item listing handlers.
//!
//! ```text
//! GET    /api/items?cat=books
//! POST   /api/items
//! PATCH  /api/items/{id}
//! PATCH  /api/items/{id}/live
//! DELETE /api/items/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::{Error, Item, ItemDraft, ItemPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::Identity;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_listing_id;

/// Optional category filter for listing endpoints.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Category to narrow the listing to.
    pub cat: Option<String>,
}

/// Publicly list items, optionally narrowed to a category.
#[utoipa::path(
    get,
    path = "/api/items",
    params(ListQuery),
    responses((status = 200, description = "Matching items", body = [Item])),
    tags = ["items"],
    security([])
)]
#[get("/items")]
pub async fn list_items(
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Vec<Item>>> {
    let items = state.items.list(query.cat.as_deref()).await?;
    Ok(web::Json(items))
}

/// Post a new item as the authenticated user.
#[utoipa::path(
    post,
    path = "/api/items",
    request_body = ItemDraft,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["items"]
)]
#[post("/items")]
pub async fn create_item(
    identity: Identity,
    state: web::Data<HttpState>,
    payload: web::Json<ItemDraft>,
) -> ApiResult<HttpResponse> {
    let item = state
        .items
        .create(identity.claims(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Item successfully posted",
        "item": item,
    })))
}

/// Sparse-patch an item. Only the author may update it.
#[utoipa::path(
    patch,
    path = "/api/items/{id}",
    request_body = ItemPatch,
    responses(
        (status = 200, description = "Item updated"),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "No such item", body = Error)
    ),
    tags = ["items"]
)]
#[patch("/items/{id}")]
pub async fn update_item(
    identity: Identity,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ItemPatch>,
) -> ApiResult<HttpResponse> {
    let id = parse_listing_id(&path)?;
    state
        .items
        .update(identity.email(), &id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Item updated successfully" })))
}

/// Toggle an item's visibility. Only the author may flip it.
#[utoipa::path(
    patch,
    path = "/api/items/{id}/live",
    responses(
        (status = 200, description = "Live flag flipped"),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "No such item", body = Error)
    ),
    tags = ["items"]
)]
#[patch("/items/{id}/live")]
pub async fn toggle_item_live(
    identity: Identity,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_listing_id(&path)?;
    let live = state.items.toggle_live(identity.email(), &id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Item live status updated successfully",
        "live": live,
    })))
}

/// Delete an item. Only the author may remove it.
#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    responses(
        (status = 200, description = "Item deleted"),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "No such item", body = Error)
    ),
    tags = ["items"]
)]
#[delete("/items/{id}")]
pub async fn delete_item(
    identity: Identity,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_listing_id(&path)?;
    state.items.delete(identity.email(), &id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Item deleted successfully" })))
}
