//! Server construction and dependency wiring.
//!
//! `create_server` turns a [`ServerConfig`] into a bound Actix server:
//! configured sections select the real adapters (MongoDB, Google, S3, FCM),
//! anything left unset falls back to the in-memory/no-op implementations so
//! the binary always starts.

mod config;

pub use config::{MongoConfig, ServerConfig};

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use tracing::warn;

#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{
    EventRepository, FixtureUploadUrlSigner, IdentityProvider, InMemoryEventRepository,
    InMemoryItemRepository, InMemoryUserDirectory, ItemRepository, NoOpPushGateway, PushGateway,
    StaticIdentityProvider, UploadUrlSigner, UserDirectory,
};
use crate::domain::{AuthService, EventService, ItemService, SessionTokens, UserService};
use crate::inbound::http::api_scope;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::session::SessionCookies;
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;
use crate::outbound::fcm::FcmPushGateway;
use crate::outbound::google::GoogleIdentityProvider;
use crate::outbound::mongo::{
    self, MongoEventRepository, MongoItemRepository, MongoUserDirectory,
};
use crate::outbound::s3::S3UploadSigner;
use crate::reminders;

#[derive(Clone)]
struct AppDependencies {
    health: web::Data<HealthState>,
    state: web::Data<HttpState>,
    codec: web::Data<SessionTokens>,
    cookies: web::Data<SessionCookies>,
    allowed_origins: Arc<Vec<String>>,
}

fn build_cors(origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials();
    for origin in origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}

struct WiredState {
    state: HttpState,
    tokens: SessionTokens,
    events: Arc<dyn EventRepository>,
    push: Arc<dyn PushGateway>,
}

async fn build_state(config: &ServerConfig) -> std::io::Result<WiredState> {
    let (directory, items, events): (
        Arc<dyn UserDirectory>,
        Arc<dyn ItemRepository>,
        Arc<dyn EventRepository>,
    ) = match &config.mongo {
        Some(mongo_config) => {
            let db = mongo::connect(&mongo_config.uri, &mongo_config.database)
                .await
                .map_err(std::io::Error::other)?;
            (
                Arc::new(MongoUserDirectory::new(&db)),
                Arc::new(MongoItemRepository::new(&db)),
                Arc::new(MongoEventRepository::new(&db)),
            )
        }
        None => {
            warn!("no MongoDB configured; records live in memory and vanish on restart");
            (
                Arc::new(InMemoryUserDirectory::new()),
                Arc::new(InMemoryItemRepository::new()),
                Arc::new(InMemoryEventRepository::new()),
            )
        }
    };

    let provider: Arc<dyn IdentityProvider> = match &config.google_client_id {
        Some(client_id) => Arc::new(GoogleIdentityProvider::new(client_id)),
        None => {
            warn!("no Google client id configured; every sign-in will be rejected");
            Arc::new(StaticIdentityProvider::new())
        }
    };

    let push: Arc<dyn PushGateway> = match &config.fcm_server_key {
        Some(key) => Arc::new(FcmPushGateway::new(key)),
        None => Arc::new(NoOpPushGateway),
    };

    let uploads: Arc<dyn UploadUrlSigner> = match &config.s3_bucket {
        Some(bucket) => Arc::new(S3UploadSigner::from_env(bucket).await),
        None => {
            warn!("no S3 bucket configured; upload URLs are signed by the fixture");
            Arc::new(FixtureUploadUrlSigner)
        }
    };

    let tokens = SessionTokens::new(&config.token_secret);

    let auth = Arc::new(AuthService::new(
        provider,
        Arc::clone(&directory),
        tokens.clone(),
    ));
    let item_service = Arc::new(ItemService::new(
        Arc::clone(&items),
        Arc::clone(&directory),
        Arc::clone(&push),
    ));
    let event_service = Arc::new(EventService::new(Arc::clone(&events)));
    let user_service = Arc::new(UserService::new(
        Arc::clone(&directory),
        Arc::clone(&items),
        tokens.clone(),
    ));

    Ok(WiredState {
        state: HttpState::new(auth, item_service, event_service, user_service, uploads),
        tokens,
        events,
        push,
    })
}

/// Construct the HTTP server and start the reminder loop.
///
/// # Errors
/// Propagates [`std::io::Error`] when adapter wiring or socket binding fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let wired = build_state(&config).await?;
    reminders::spawn(Arc::clone(&wired.events), Arc::clone(&wired.push));

    let deps = AppDependencies {
        health: health_state.clone(),
        state: web::Data::new(wired.state),
        codec: web::Data::new(wired.tokens),
        cookies: web::Data::new(SessionCookies::new(config.cookie_secure)),
        allowed_origins: Arc::new(config.allowed_origins.clone()),
    };

    let server = HttpServer::new(move || {
        let AppDependencies {
            health,
            state,
            codec,
            cookies,
            allowed_origins,
        } = deps.clone();

        let app = App::new()
            .app_data(health)
            .app_data(state)
            .app_data(codec)
            .app_data(cookies)
            .wrap(Trace)
            .wrap(build_cors(&allowed_origins))
            .service(api_scope())
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );

        app
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
