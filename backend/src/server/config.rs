//! Server configuration assembled by the binary entry-point.

use std::net::SocketAddr;

use zeroize::Zeroizing;

/// MongoDB deployment coordinates.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

/// Builder-style configuration for [`crate::server::create_server`].
///
/// Optional sections select real adapters; anything left unset falls back to
/// the in-memory/no-op implementation, which keeps local development and the
/// test suite free of external services.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) cookie_secure: bool,
    pub(crate) token_secret: Zeroizing<Vec<u8>>,
    pub(crate) allowed_origins: Vec<String>,
    pub(crate) google_client_id: Option<String>,
    pub(crate) mongo: Option<MongoConfig>,
    pub(crate) s3_bucket: Option<String>,
    pub(crate) fcm_server_key: Option<String>,
}

impl ServerConfig {
    /// Required settings: the session signing secret, the cookie transport
    /// policy, and the bind address.
    #[must_use]
    pub fn new(token_secret: Vec<u8>, cookie_secure: bool, bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            cookie_secure,
            token_secret: Zeroizing::new(token_secret),
            allowed_origins: Vec::new(),
            google_client_id: None,
            mongo: None,
            s3_bucket: None,
            fcm_server_key: None,
        }
    }

    /// Browser origins allowed to send the session cookie cross-site.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Verify Google identity tokens minted for this OAuth client.
    #[must_use]
    pub fn with_google_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.google_client_id = Some(client_id.into());
        self
    }

    /// Persist users, items, and events in this MongoDB deployment.
    #[must_use]
    pub fn with_mongo(mut self, mongo: MongoConfig) -> Self {
        self.mongo = Some(mongo);
        self
    }

    /// Sign upload URLs against this S3 bucket.
    #[must_use]
    pub fn with_s3_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.s3_bucket = Some(bucket.into());
        self
    }

    /// Dispatch push notifications through FCM with this server key.
    #[must_use]
    pub fn with_fcm_server_key(mut self, key: impl Into<String>) -> Self {
        self.fcm_server_key = Some(key.into());
        self
    }

    /// The socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
