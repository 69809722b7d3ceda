//! Outbound adapters backing the domain ports with real infrastructure.

pub mod fcm;
pub mod google;
pub mod mongo;
pub mod s3;
