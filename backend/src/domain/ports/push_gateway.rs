//! Port for push notification delivery.
//!
//! Dispatch is fire-and-forget from the caller's perspective: a failed send
//! is logged and never rolls back the operation that triggered it.

use async_trait::async_trait;
use tracing::debug;

/// Delivery failures raised by push gateway adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PushError {
    /// The push service rejected the request.
    #[error("push service rejected the request: {0}")]
    Rejected(String),
    /// The push service could not be reached.
    #[error("push service unavailable: {0}")]
    Unavailable(String),
}

/// Port delivering a notification to a set of device tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Deliver `title`/`body` to every token in `tokens`.
    async fn notify(&self, tokens: &[String], title: &str, body: &str) -> Result<(), PushError>;
}

/// Gateway that drops every notification, for tests and keyless deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpPushGateway;

#[async_trait]
impl PushGateway for NoOpPushGateway {
    async fn notify(&self, tokens: &[String], title: &str, _body: &str) -> Result<(), PushError> {
        debug!(recipients = tokens.len(), title, "push dispatch skipped (no gateway configured)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_gateway_accepts_everything() {
        let gateway = NoOpPushGateway;
        gateway
            .notify(&["fcm-1".into()], "Event Reminder", "starting soon")
            .await
            .expect("noop send");
    }
}
