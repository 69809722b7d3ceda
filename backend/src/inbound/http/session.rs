//! Session credential plumbing for HTTP handlers.
//!
//! The session is an opaque signed token carried in the `token` cookie:
//! HttpOnly so scripts cannot read it, `SameSite=None` so the browser sends
//! it cross-site, Secure outside local development. [`Identity`] is the
//! access-control gate: extraction fails with 401 when the cookie is missing,
//! garbled, or expired, and handlers taking an [`Identity`] never run without
//! verified claims attached.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};

use crate::domain::{Email, Error, SessionClaims, SessionTokens};

/// Cookie holding the session token.
pub const SESSION_COOKIE: &str = "token";

/// Builds and clears session cookies with the configured transport policy.
#[derive(Debug, Clone, Copy)]
pub struct SessionCookies {
    secure: bool,
}

impl SessionCookies {
    /// `secure` should only be disabled for plain-HTTP local development.
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Wrap a freshly issued token in the session cookie.
    pub fn issue(&self, token: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::None)
            .finish()
    }

    /// A removal cookie instructing the client to discard its session.
    pub fn clear(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::None)
            .finish();
        cookie.make_removal();
        cookie
    }
}

/// Verified identity attached to an authenticated request.
#[derive(Debug, Clone)]
pub struct Identity(SessionClaims);

impl Identity {
    /// The decoded session claims.
    pub fn claims(&self) -> &SessionClaims {
        &self.0
    }

    /// Email of the authenticated user.
    pub fn email(&self) -> &Email {
        &self.0.email
    }

    /// Consume the extractor, yielding the claims.
    pub fn into_claims(self) -> SessionClaims {
        self.0
    }
}

fn decode_request(req: &HttpRequest) -> Result<SessionClaims, Error> {
    let codec = req
        .app_data::<web::Data<SessionTokens>>()
        .ok_or_else(|| Error::internal("session token codec not configured"))?;
    let cookie = req
        .cookie(SESSION_COOKIE)
        .ok_or_else(|| Error::unauthorized("login required"))?;
    codec.decode(cookie.value())
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(decode_request(req).map(Identity))
    }
}

/// Optional identity for endpoints that also serve anonymous callers.
///
/// A missing or rejected credential yields `None` rather than a 401.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<SessionClaims>);

impl FromRequest for MaybeIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(MaybeIdentity(decode_request(req).ok())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContactNumber, TokenTtl, User};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};

    fn codec() -> SessionTokens {
        SessionTokens::new(b"test-secret")
    }

    fn issued_token() -> String {
        let user = User::first_sight(
            Email::new("ada@example.edu").expect("email"),
            "Ada",
            "https://example.com/ada.png",
            ContactNumber::new("555-0100").expect("number"),
        );
        codec().issue(&user, TokenTtl::Short).expect("issue")
    }

    fn test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(codec()))
            .route(
                "/protected",
                web::get().to(|identity: Identity| async move {
                    HttpResponse::Ok().body(identity.email().to_string())
                }),
            )
            .route(
                "/optional",
                web::get().to(|identity: MaybeIdentity| async move {
                    let body = identity
                        .0
                        .map_or_else(|| "anonymous".to_owned(), |claims| claims.email.to_string());
                    HttpResponse::Ok().body(body)
                }),
            )
    }

    #[actix_web::test]
    async fn missing_cookie_is_unauthorised() {
        let app = test::init_service(test_app()).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/protected").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn garbled_cookie_is_unauthorised() {
        let app = test::init_service(test_app()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/protected")
                .cookie(Cookie::new(SESSION_COOKIE, "garbage"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn valid_cookie_attaches_claims() {
        let app = test::init_service(test_app()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/protected")
                .cookie(Cookie::new(SESSION_COOKIE, issued_token()))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, "ada@example.edu");
    }

    #[actix_web::test]
    async fn optional_identity_never_rejects() {
        let app = test::init_service(test_app()).await;
        let anonymous =
            test::call_service(&app, test::TestRequest::get().uri("/optional").to_request()).await;
        assert_eq!(anonymous.status(), StatusCode::OK);
        assert_eq!(test::read_body(anonymous).await, "anonymous");

        let signed_in = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/optional")
                .cookie(Cookie::new(SESSION_COOKIE, issued_token()))
                .to_request(),
        )
        .await;
        assert_eq!(test::read_body(signed_in).await, "ada@example.edu");
    }

    #[actix_web::test]
    async fn issued_cookies_are_locked_down() {
        let cookies = SessionCookies::new(true);
        let cookie = cookies.issue("abc".into());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
    }

    #[actix_web::test]
    async fn clear_produces_a_removal_cookie() {
        let cookie = SessionCookies::new(true).clear();
        assert_eq!(cookie.value(), "");
        assert!(cookie.max_age().is_some_and(|age| age.is_zero()));
    }
}
