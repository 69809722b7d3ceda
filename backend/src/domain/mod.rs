//! Domain types, services, and port seams.
//!
//! Everything here is transport agnostic. Inbound adapters translate HTTP
//! requests into these types and map [`Error`] onto status codes; outbound
//! adapters implement the [`ports`] traits against real infrastructure.

pub mod auth_service;
pub mod error;
pub mod event_service;
pub mod item_service;
pub mod listing;
pub mod ports;
pub mod session;
pub mod user;
pub mod user_service;

pub use self::auth_service::{AuthService, SignInOutcome};
pub use self::error::{Error, ErrorCode};
pub use self::event_service::EventService;
pub use self::item_service::ItemService;
pub use self::listing::{
    AuthorSnapshot, Event, EventDraft, Item, ItemDraft, ItemPatch, ListingId, Liveness, Owned,
    ensure_owner,
};
pub use self::session::{SessionClaims, SessionTokens, TokenTtl};
pub use self::user::{ContactNumber, Email, User, UserValidationError};
pub use self::user_service::{ContactNumberUpdate, UserService};
