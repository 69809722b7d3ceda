//! OpenAPI document for the REST surface.
//!
//! Swagger UI serves this in debug builds at `/docs`; the document also backs
//! external tooling that wants a machine-readable description of the API.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::listing::{
    AuthorSnapshot, Event, EventDraft, Item, ItemDraft, ItemPatch, ListingId, Liveness,
};
use crate::domain::user::User;
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::auth::GoogleAuthRequest;
use crate::inbound::http::events::ReminderRequest;
use crate::inbound::http::users::{FavouriteRequest, PhoneNumberRequest, PushTokenRequest};

/// Register the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "token",
                "Signed session token issued by POST /api/auth/google.",
            ))),
        );
    }
}

/// OpenAPI document for the marketplace API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "tradepost API",
        description = "Campus marketplace: Google-authenticated listings, favourites, and event reminders."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::google_auth,
        crate::inbound::http::auth::verify,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::upload_url,
        crate::inbound::http::auth::upload_url_post,
        crate::inbound::http::items::list_items,
        crate::inbound::http::items::create_item,
        crate::inbound::http::items::update_item,
        crate::inbound::http::items::toggle_item_live,
        crate::inbound::http::items::delete_item,
        crate::inbound::http::events::list_events,
        crate::inbound::http::events::create_event,
        crate::inbound::http::events::register_event_reminder,
        crate::inbound::http::users::update_push_token,
        crate::inbound::http::users::list_own_items,
        crate::inbound::http::users::check_login,
        crate::inbound::http::users::toggle_favourite,
        crate::inbound::http::users::list_favourites,
        crate::inbound::http::users::register_or_update,
        crate::inbound::http::users::update_phone_number,
        crate::inbound::http::users::has_push_token,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Item,
        ItemDraft,
        ItemPatch,
        Event,
        EventDraft,
        AuthorSnapshot,
        ListingId,
        Liveness,
        GoogleAuthRequest,
        ReminderRequest,
        PushTokenRequest,
        FavouriteRequest,
        PhoneNumberRequest,
    )),
    tags(
        (name = "auth", description = "Session establishment and uploads"),
        (name = "items", description = "Marketplace items"),
        (name = "events", description = "Campus events and reminders"),
        (name = "user", description = "The signed-in user's own record"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_builds_and_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/api/auth/google",
            "/api/auth/verify",
            "/api/auth/logout",
            "/api/upload",
            "/api/items",
            "/api/items/{id}",
            "/api/items/{id}/live",
            "/api/events",
            "/api/events/{id}/notifications",
            "/api/user/token",
            "/api/user/items",
            "/api/user/checkLogin",
            "/api/user/favorites",
            "/api/user/registerOrUpdate",
            "/api/user/updatePhoneNumber",
            "/api/user/hasFcmToken",
            "/health/ready",
            "/health/live",
        ] {
            assert!(paths.contains_key(path), "missing path: {path}");
        }
    }
}
