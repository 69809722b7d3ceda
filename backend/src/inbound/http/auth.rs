//! Authentication and upload-URL handlers.
//!
//! ```text
//! POST /api/auth/google   {"token":"<google id token>","contactNumber":"555-0100"}
//! GET  /api/auth/verify
//! POST /api/auth/logout
//! GET|POST /api/upload
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::{Identity, SessionCookies};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{missing_field_error, parse_contact_number};

/// Request body for `POST /api/auth/google`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    /// Identity token issued by Google to the browser client.
    pub token: Option<String>,
    /// Contact number stored if this is the account's first sign-in.
    pub contact_number: Option<String>,
}

/// Exchange a Google identity token for a long-lived session.
#[utoipa::path(
    post,
    path = "/api/auth/google",
    request_body = GoogleAuthRequest,
    responses(
        (status = 200, description = "Session established", body = User,
         headers(("Set-Cookie" = String, description = "Session token cookie"))),
        (status = 400, description = "Missing required field", body = Error),
        (status = 401, description = "Verification failed", body = Error)
    ),
    tags = ["auth"],
    security([])
)]
#[post("/auth/google")]
pub async fn google_auth(
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

    let outcome = state.auth.sign_in(&token, contact_number).await?;
    Ok(HttpResponse::Ok()
        .cookie(cookies.issue(outcome.token))
        .json(json!({
            "message": "Google authentication successful",
            "user": outcome.user,
            "firstTime": outcome.first_time,
        })))
}

/// Re-issue a short-lived session from the stored profile.
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    responses(
        (status = 200, description = "Fresh session issued", body = User),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "User record vanished", body = Error)
    ),
    tags = ["auth"]
)]
#[get("/auth/verify")]
pub async fn verify(
    identity: Identity,
    state: web::Data<HttpState>,
    cookies: web::Data<SessionCookies>,
) -> ApiResult<HttpResponse> {
    let (token, user) = state.auth.re_verify(identity.email()).await?;
    Ok(HttpResponse::Ok().cookie(cookies.issue(token)).json(json!({
        "message": "User verified successfully",
        "user": user,
    })))
}

/// Instruct the client to discard its session. No server-side state changes.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Cookie cleared")),
    tags = ["auth"],
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(cookies: web::Data<SessionCookies>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(cookies.clear())
        .json(json!({ "message": "Logged out successfully" }))
}

async fn presign_upload(identity: Identity, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let key = format!("uploads/{}/{}", identity.email(), Uuid::new_v4());
    let url = state.uploads.presign_upload(&key).await?;
    Ok(HttpResponse::Ok().json(json!({ "url": url, "key": key })))
}

/// Obtain a time-limited upload URL keyed under the caller's email.
#[utoipa::path(
    get,
    path = "/api/upload",
    responses(
        (status = 200, description = "Presigned upload URL"),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["auth"]
)]
#[get("/upload")]
pub async fn upload_url(
    identity: Identity,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    presign_upload(identity, state).await
}

/// POST variant kept for clients that submit the upload form directly.
#[utoipa::path(
    post,
    path = "/api/upload",
    responses(
        (status = 200, description = "Presigned upload URL"),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["auth"]
)]
#[post("/upload")]
pub async fn upload_url_post(
    identity: Identity,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    presign_upload(identity, state).await
}
