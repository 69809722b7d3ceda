//! HTTP adapter: handlers, session plumbing, and error mapping.

pub mod auth;
pub mod error;
pub mod events;
pub mod health;
pub mod items;
pub mod session;
pub mod state;
pub mod users;
pub(crate) mod validation;

#[cfg(test)]
pub(crate) mod test_utils;

use actix_web::{Scope, web};

pub use error::ApiResult;

use crate::domain::Error;

/// Everything mounted under `/api`, shared by the server and the tests.
pub fn api_scope() -> Scope {
    web::scope("/api")
        .app_data(json_config())
        .service(auth::google_auth)
        .service(auth::verify)
        .service(auth::logout)
        .service(auth::upload_url)
        .service(auth::upload_url_post)
        .service(items::list_items)
        .service(items::create_item)
        .service(items::toggle_item_live)
        .service(items::update_item)
        .service(items::delete_item)
        .service(events::list_events)
        .service(events::create_event)
        .service(events::register_event_reminder)
        .service(users::update_push_token)
        .service(users::list_own_items)
        .service(users::check_login)
        .service(users::toggle_favourite)
        .service(users::list_favourites)
        .service(users::register_or_update)
        .service(users::update_phone_number)
        .service(users::has_push_token)
}

/// Map body deserialisation failures onto the shared error envelope.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| Error::invalid_request(err.to_string()).into())
}
