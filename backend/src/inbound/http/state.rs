//! Shared HTTP adapter state.
//!
//! Handlers receive this bundle via `actix_web::web::Data` so they depend on
//! domain services and ports only, staying testable without I/O.

use std::sync::Arc;

use crate::domain::ports::UploadUrlSigner;
use crate::domain::{AuthService, EventService, ItemService, UserService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<AuthService>,
    pub items: Arc<ItemService>,
    pub events: Arc<EventService>,
    pub users: Arc<UserService>,
    pub uploads: Arc<dyn UploadUrlSigner>,
}

impl HttpState {
    /// Bundle the wired services for handler injection.
    pub fn new(
        auth: Arc<AuthService>,
        items: Arc<ItemService>,
        events: Arc<EventService>,
        users: Arc<UserService>,
        uploads: Arc<dyn UploadUrlSigner>,
    ) -> Self {
        Self {
            auth,
            items,
            events,
            users,
            uploads,
        }
    }
}
