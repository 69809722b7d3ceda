//! Handler test harness wired entirely to in-memory ports.

use std::sync::Arc;

use actix_web::body::BoxBody;
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::{App, test, web};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::domain::ports::{
    FixtureUploadUrlSigner, InMemoryEventRepository, InMemoryItemRepository,
    InMemoryUserDirectory, NoOpPushGateway, StaticIdentityProvider, VerifiedIdentity,
};
use crate::domain::{
    AuthService, Email, EventService, ItemService, SessionTokens, UserService,
};
use crate::inbound::http::api_scope;
use crate::inbound::http::session::SessionCookies;
use crate::inbound::http::state::HttpState;

/// In-memory application harness shared by the handler tests.
///
/// State lives behind `Arc`s, so consecutive [`TestHarness::call`]s observe
/// each other's writes even though each call initialises a fresh app.
pub(crate) struct TestHarness {
    state: web::Data<HttpState>,
    codec: web::Data<SessionTokens>,
    cookies: web::Data<SessionCookies>,
}

fn identity(email: &str, name: &str) -> VerifiedIdentity {
    VerifiedIdentity {
        email: Email::new(email).expect("email"),
        name: name.into(),
        picture: format!("https://example.com/{name}.png"),
    }
}

impl TestHarness {
    /// Build a harness recognising the `ada-token` and `grace-token`
    /// identity tokens.
    pub(crate) async fn new() -> Self {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let items = Arc::new(InMemoryItemRepository::new());
        let events = Arc::new(InMemoryEventRepository::new());
        let provider = Arc::new(
            StaticIdentityProvider::new()
                .with_token("ada-token", identity("a@x.com", "Ada"))
                .with_token("grace-token", identity("g@x.com", "Grace")),
        );
        let tokens = SessionTokens::new(b"test-secret");

        let auth = Arc::new(AuthService::new(
            provider,
            Arc::clone(&directory) as _,
            tokens.clone(),
        ));
        let item_service = Arc::new(ItemService::new(
            Arc::clone(&items) as _,
            Arc::clone(&directory) as _,
            Arc::new(NoOpPushGateway),
        ));
        let event_service = Arc::new(EventService::new(Arc::clone(&events) as _));
        let user_service = Arc::new(UserService::new(
            Arc::clone(&directory) as _,
            Arc::clone(&items) as _,
            tokens.clone(),
        ));

        let state = HttpState::new(
            auth,
            item_service,
            event_service,
            user_service,
            Arc::new(FixtureUploadUrlSigner),
        );

        Self {
            state: web::Data::new(state),
            codec: web::Data::new(tokens),
            cookies: web::Data::new(SessionCookies::new(false)),
        }
    }

    fn app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.state.clone())
            .app_data(self.codec.clone())
            .app_data(self.cookies.clone())
            .service(api_scope())
    }

    /// Run a request against a freshly initialised app over the shared state.
    pub(crate) async fn call(&self, req: test::TestRequest) -> ServiceResponse<BoxBody> {
        let app = test::init_service(self.app()).await;
        test::call_service(&app, req.to_request()).await
    }

    /// Sign in with a known identity token, returning the session cookie.
    pub(crate) async fn sign_in(&self, id_token: &str) -> Cookie<'static> {
        let res = self
            .call(
                test::TestRequest::post()
                    .uri("/api/auth/google")
                    .set_json(json!({ "token": id_token, "contactNumber": "555-0100" })),
            )
            .await;
        assert!(res.status().is_success(), "sign-in failed: {}", res.status());
        res.response()
            .cookies()
            .find(|c| c.name() == "token")
            .expect("session cookie")
            .into_owned()
    }
}

/// Deserialise a response body.
pub(crate) async fn read_json<T: DeserializeOwned>(res: ServiceResponse<BoxBody>) -> T {
    test::read_body_json(res).await
}
