//! Signed-in user handlers: profile, favourites, and push tokens.
//!
//! ```text
//! POST  /api/user/token
//! GET   /api/user/items
//! GET   /api/user/checkLogin
//! POST  /api/user/favorites
//! GET   /api/user/favorites
//! POST  /api/user/registerOrUpdate
//! PATCH /api/user/updatePhoneNumber
//! GET   /api/user/hasFcmToken
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, Item};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::GoogleAuthRequest;
use crate::inbound::http::session::{Identity, MaybeIdentity, SessionCookies};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    missing_field_error, parse_contact_number, parse_listing_id,
};

/// Request body for push token registration.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PushTokenRequest {
    /// Push delivery token issued to this device.
    pub token: Option<String>,
}

/// Store the caller's push delivery token.
#[utoipa::path(
    post,
    path = "/api/user/token",
    request_body = PushTokenRequest,
    responses(
        (status = 200, description = "Token stored"),
        (status = 400, description = "Missing token", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["user"]
)]
#[post("/user/token")]
pub async fn update_push_token(
    identity: Identity,
    state: web::Data<HttpState>,
    payload: web::Json<PushTokenRequest>,
) -> ApiResult<HttpResponse> {
    let token = payload
        .into_inner()
        .token
        .ok_or_else(|| missing_field_error("token"))?;
    state.users.set_push_token(identity.email(), &token).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "FCM token updated successfully" })))
}

/// List the caller's posted items.
#[utoipa::path(
    get,
    path = "/api/user/items",
    responses(
        (status = 200, description = "The caller's items", body = [Item]),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["user"]
)]
#[get("/user/items")]
pub async fn list_own_items(
    identity: Identity,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<Item>>> {
    let items = state.items.list_by_author(identity.email()).await?;
    Ok(web::Json(items))
}

/// Echo the decoded identity, or `null` for anonymous callers.
#[utoipa::path(
    get,
    path = "/api/user/checkLogin",
    responses((status = 200, description = "Current identity or null")),
    tags = ["user"],
    security([])
)]
#[get("/user/checkLogin")]
pub async fn check_login(identity: MaybeIdentity) -> HttpResponse {
    match identity.0 {
        Some(claims) => HttpResponse::Ok().json(json!({ "user": {
            "userEmail": claims.email,
            "userName": claims.name,
            "userPicture": claims.picture,
            "contactNumber": claims.contact_number,
        } })),
        None => HttpResponse::Ok().json(json!({ "user": null })),
    }
}

/// Request body for a favourites toggle.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteRequest {
    /// Listing to toggle in the caller's favourite set.
    pub item_id: Option<String>,
}

/// Toggle a listing in the caller's favourites.
#[utoipa::path(
    post,
    path = "/api/user/favorites",
    request_body = FavouriteRequest,
    responses(
        (status = 200, description = "Toggled"),
        (status = 400, description = "Missing itemId", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["user"]
)]
#[post("/user/favorites")]
pub async fn toggle_favourite(
    identity: Identity,
    state: web::Data<HttpState>,
    payload: web::Json<FavouriteRequest>,
) -> ApiResult<HttpResponse> {
    let raw = payload
        .into_inner()
        .item_id
        .ok_or_else(|| missing_field_error("itemId"))?;
    let id = parse_listing_id(&raw)?;
    let now_favourite = state.users.toggle_favourite(identity.email(), &id).await?;
    let message = if now_favourite {
        "Item added to favorites"
    } else {
        "Item removed from favorites"
    };
    Ok(HttpResponse::Ok().json(json!({ "message": message, "favourite": now_favourite })))
}

/// List the caller's favourite listing ids.
#[utoipa::path(
    get,
    path = "/api/user/favorites",
    responses(
        (status = 200, description = "Favourite listing ids", body = [String]),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["user"]
)]
#[get("/user/favorites")]
pub async fn list_favourites(
    identity: Identity,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    let favourites = state.users.list_favourites(identity.email()).await?;
    Ok(HttpResponse::Ok().json(favourites))
}

/// Alternate sign-in entry: upsert the profile and issue a short session.
#[utoipa::path(
    post,
    path = "/api/user/registerOrUpdate",
    request_body = GoogleAuthRequest,
    responses(
        (status = 200, description = "Profile upserted, session issued"),
        (status = 400, description = "Missing required field", body = Error),
        (status = 401, description = "Verification failed", body = Error)
    ),
    tags = ["user"],
    security([])
)]
#[post("/user/registerOrUpdate")]
pub async fn register_or_update(
    state: web::Data<HttpState>,
    cookies: web::Data<SessionCookies>,
    payload: web::Json<GoogleAuthRequest>,
) -> ApiResult<HttpResponse> {
    let GoogleAuthRequest {
        token,
        contact_number,
    } = payload.into_inner();
    let token = token.ok_or_else(|| missing_field_error("token"))?;
    let contact_number = parse_contact_number(contact_number, "contactNumber")?;

    let outcome = state.auth.register_or_update(&token, contact_number).await?;
    Ok(HttpResponse::Ok()
        .cookie(cookies.issue(outcome.token))
        .json(json!({
            "message": "User registered/updated successfully",
            "user": outcome.user,
        })))
}

/// Request body for a contact number change.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumberRequest {
    /// Replacement contact number.
    pub new_phone_number: Option<String>,
}

/// Change the caller's contact number, cascading onto their posted items.
#[utoipa::path(
    patch,
    path = "/api/user/updatePhoneNumber",
    request_body = PhoneNumberRequest,
    responses(
        (status = 200, description = "Number updated; fresh session issued"),
        (status = 400, description = "Missing newPhoneNumber", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["user"]
)]
#[patch("/user/updatePhoneNumber")]
pub async fn update_phone_number(
    identity: Identity,
    state: web::Data<HttpState>,
    cookies: web::Data<SessionCookies>,
    payload: web::Json<PhoneNumberRequest>,
) -> ApiResult<HttpResponse> {
    let number = parse_contact_number(payload.into_inner().new_phone_number, "newPhoneNumber")?;
    let update = state
        .users
        .update_contact_number(identity.email(), number)
        .await?;
    Ok(HttpResponse::Ok()
        .cookie(cookies.issue(update.token))
        .json(json!({
            "message": "Phone number updated successfully",
            "updatedItemsCount": update.items_updated,
        })))
}

/// Whether the caller has a push delivery token registered.
#[utoipa::path(
    get,
    path = "/api/user/hasFcmToken",
    responses(
        (status = 200, description = "Boolean check"),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["user"]
)]
#[get("/user/hasFcmToken")]
pub async fn has_push_token(
    identity: Identity,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    let has = state.users.has_push_token(identity.email()).await?;
    Ok(HttpResponse::Ok().json(json!({ "hasFcmToken": has })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{TestHarness, read_json};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::Value;

    #[actix_web::test]
    async fn check_login_reports_null_for_anonymous_callers() {
        let harness = TestHarness::new().await;
        let res = harness
            .call(test::TestRequest::get().uri("/api/user/checkLogin"))
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = read_json(res).await;
        assert_eq!(body.get("user"), Some(&Value::Null));
    }

    #[actix_web::test]
    async fn check_login_echoes_the_decoded_claims() {
        let harness = TestHarness::new().await;
        let ada = harness.sign_in("ada-token").await;
        let res = harness
            .call(test::TestRequest::get().uri("/api/user/checkLogin").cookie(ada))
            .await;
        let body: Value = read_json(res).await;
        assert_eq!(body.pointer("/user/userEmail"), Some(&json!("a@x.com")));
    }

    #[actix_web::test]
    async fn favourites_toggle_twice_restores_the_set() {
        let harness = TestHarness::new().await;
        let ada = harness.sign_in("ada-token").await;
        let id = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

        let first = harness
            .call(
                test::TestRequest::post()
                    .uri("/api/user/favorites")
                    .cookie(ada.clone())
                    .set_json(json!({ "itemId": id })),
            )
            .await;
        let first: Value = read_json(first).await;
        assert_eq!(first.get("favourite"), Some(&json!(true)));

        let listed = harness
            .call(
                test::TestRequest::get()
                    .uri("/api/user/favorites")
                    .cookie(ada.clone()),
            )
            .await;
        let listed: Value = read_json(listed).await;
        assert_eq!(listed, json!([id]));

        let second = harness
            .call(
                test::TestRequest::post()
                    .uri("/api/user/favorites")
                    .cookie(ada.clone())
                    .set_json(json!({ "itemId": id })),
            )
            .await;
        let second: Value = read_json(second).await;
        assert_eq!(second.get("favourite"), Some(&json!(false)));

        let listed = harness
            .call(test::TestRequest::get().uri("/api/user/favorites").cookie(ada))
            .await;
        let listed: Value = read_json(listed).await;
        assert_eq!(listed, json!([]));
    }

    #[actix_web::test]
    async fn phone_number_change_reports_the_cascade_count() {
        let harness = TestHarness::new().await;
        let ada = harness.sign_in("ada-token").await;
        for _ in 0..2 {
            harness
                .call(
                    test::TestRequest::post()
                        .uri("/api/items")
                        .cookie(ada.clone())
                        .set_json(json!({
                            "itemName": "Desk lamp",
                            "itemDescription": "Barely used",
                            "itemPrice": 450,
                            "itemCategory": "furniture",
                            "itemPicture": "pic",
                        })),
                )
                .await;
        }

        let res = harness
            .call(
                test::TestRequest::patch()
                    .uri("/api/user/updatePhoneNumber")
                    .cookie(ada.clone())
                    .set_json(json!({ "newPhoneNumber": "555-0199" })),
            )
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.response().cookies().any(|c| c.name() == "token"));
        let body: Value = read_json(res).await;
        assert_eq!(body.get("updatedItemsCount"), Some(&json!(2)));

        let items = harness
            .call(test::TestRequest::get().uri("/api/user/items").cookie(ada))
            .await;
        let items: Value = read_json(items).await;
        for item in items.as_array().expect("array") {
            assert_eq!(item.get("contactNumber"), Some(&json!("555-0199")));
        }
    }

    #[actix_web::test]
    async fn phone_number_change_requires_the_field() {
        let harness = TestHarness::new().await;
        let ada = harness.sign_in("ada-token").await;
        let res = harness
            .call(
                test::TestRequest::patch()
                    .uri("/api/user/updatePhoneNumber")
                    .cookie(ada)
                    .set_json(json!({})),
            )
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn push_token_round_trip() {
        let harness = TestHarness::new().await;
        let ada = harness.sign_in("ada-token").await;

        let before = harness
            .call(
                test::TestRequest::get()
                    .uri("/api/user/hasFcmToken")
                    .cookie(ada.clone()),
            )
            .await;
        let before: Value = read_json(before).await;
        assert_eq!(before.get("hasFcmToken"), Some(&json!(false)));

        harness
            .call(
                test::TestRequest::post()
                    .uri("/api/user/token")
                    .cookie(ada.clone())
                    .set_json(json!({ "token": "device-1" })),
            )
            .await;

        let after = harness
            .call(test::TestRequest::get().uri("/api/user/hasFcmToken").cookie(ada))
            .await;
        let after: Value = read_json(after).await;
        assert_eq!(after.get("hasFcmToken"), Some(&json!(true)));
    }

    #[actix_web::test]
    async fn register_or_update_never_overwrites_the_stored_number() {
        let harness = TestHarness::new().await;
        harness.sign_in("ada-token").await;

        let res = harness
            .call(
                test::TestRequest::post()
                    .uri("/api/user/registerOrUpdate")
                    .set_json(json!({ "token": "ada-token", "contactNumber": "555-9999" })),
            )
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = read_json(res).await;
        assert_eq!(
            body.pointer("/user/contactNumber"),
            Some(&json!("555-0100"))
        );
    }
}
