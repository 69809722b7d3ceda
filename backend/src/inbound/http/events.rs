//! Event listing handlers.
//!
//! ```text
//! GET   /api/events?cat=music
//! POST  /api/events
//! PATCH /api/events/{id}/notifications
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, Event, EventDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::items::ListQuery;
use crate::inbound::http::session::Identity;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{missing_field_error, parse_listing_id};

/// Publicly list events, optionally narrowed to a category.
#[utoipa::path(
    get,
    path = "/api/events",
    params(ListQuery),
    responses((status = 200, description = "Matching events", body = [Event])),
    tags = ["events"],
    security([])
)]
#[get("/events")]
pub async fn list_events(
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Vec<Event>>> {
    let events = state.events.list(query.cat.as_deref()).await?;
    Ok(web::Json(events))
}

/// Post a new event as the authenticated user.
#[utoipa::path(
    post,
    path = "/api/events",
    request_body = EventDraft,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["events"]
)]
#[post("/events")]
pub async fn create_event(
    identity: Identity,
    state: web::Data<HttpState>,
    payload: web::Json<EventDraft>,
) -> ApiResult<HttpResponse> {
    let event = state
        .events
        .create(identity.claims(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Event successfully posted",
        "event": event,
    })))
}

/// Request body for reminder sign-up.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRequest {
    /// Push delivery token to notify before the event starts.
    pub fcm_token: Option<String>,
}

/// Register a push token for an event reminder. Any signed-in caller may
/// register, not just the author.
#[utoipa::path(
    patch,
    path = "/api/events/{id}/notifications",
    request_body = ReminderRequest,
    responses(
        (status = 200, description = "Token registered"),
        (status = 400, description = "Missing token", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "No such event", body = Error)
    ),
    tags = ["events"]
)]
#[patch("/events/{id}/notifications")]
pub async fn register_event_reminder(
    _identity: Identity,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ReminderRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_listing_id(&path)?;
    let token = payload
        .into_inner()
        .fcm_token
        .ok_or_else(|| missing_field_error("fcmToken"))?;
    state.events.add_notification_token(&id, &token).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "FCM token added successfully to event" })))
}
