//! Campus marketplace backend: Google-authenticated listings, favourites,
//! uploads, and event reminders.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod reminders;
pub mod server;

pub use middleware::Trace;
