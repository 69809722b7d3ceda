//! Push delivery via Firebase Cloud Messaging.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{PushError, PushGateway};

const FCM_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";
// FCM caps a single multicast request at 1000 registration ids.
const MAX_TOKENS_PER_REQUEST: usize = 1000;

/// [`PushGateway`] dispatching through the FCM HTTP API with a server key.
pub struct FcmPushGateway {
    http: reqwest::Client,
    server_key: String,
    endpoint: String,
}

impl FcmPushGateway {
    /// Build a gateway authenticating with the given server key.
    pub fn new(server_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            server_key: server_key.into(),
            endpoint: FCM_ENDPOINT.to_owned(),
        }
    }

    /// Point the gateway at a different endpoint (tests).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl PushGateway for FcmPushGateway {
    async fn notify(&self, tokens: &[String], title: &str, body: &str) -> Result<(), PushError> {
        for chunk in tokens.chunks(MAX_TOKENS_PER_REQUEST) {
            let payload = json!({
                "registration_ids": chunk,
                "notification": { "title": title, "body": body },
            });
            let response = self
                .http
                .post(&self.endpoint)
                .header("Authorization", format!("key={}", self.server_key))
                .json(&payload)
                .send()
                .await
                .map_err(|err| PushError::Unavailable(err.to_string()))?;
            if !response.status().is_success() {
                return Err(PushError::Rejected(format!(
                    "FCM answered {}",
                    response.status()
                )));
            }
            debug!(recipients = chunk.len(), title, "push notification dispatched");
        }
        Ok(())
    }
}
