//! Google ID-token verification.
//!
//! Validates RS256 signatures against Google's published JWKS and enforces
//! the audience and issuer claims. A token minted for a different OAuth
//! client never verifies here, which is what keeps sessions from being
//! bootstrapped with credentials issued to some other application.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ports::{IdentityError, IdentityProvider, VerifiedIdentity};
use crate::domain::user::Email;

const CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
const KEY_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    email: String,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

struct CachedKeys {
    fetched_at: Instant,
    jwks: Jwks,
}

/// [`IdentityProvider`] backed by Google's OpenID Connect infrastructure.
pub struct GoogleIdentityProvider {
    http: reqwest::Client,
    client_id: String,
    certs_url: String,
    keys: RwLock<Option<CachedKeys>>,
}

impl GoogleIdentityProvider {
    /// Verify tokens minted for the given OAuth client id.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: client_id.into(),
            certs_url: CERTS_URL.to_owned(),
            keys: RwLock::new(None),
        }
    }

    /// Point the adapter at a different JWKS endpoint (tests).
    #[must_use]
    pub fn with_certs_url(mut self, url: impl Into<String>) -> Self {
        self.certs_url = url.into();
        self
    }

    async fn signing_keys(&self) -> Result<Jwks, IdentityError> {
        {
            let cached = self.keys.read().await;
            if let Some(entry) = cached.as_ref() {
                if entry.fetched_at.elapsed() < KEY_CACHE_TTL {
                    return Ok(entry.jwks.clone());
                }
            }
        }

        let jwks: Jwks = self
            .http
            .get(&self.certs_url)
            .send()
            .await
            .map_err(|err| IdentityError::Unavailable(err.to_string()))?
            .error_for_status()
            .map_err(|err| IdentityError::Unavailable(err.to_string()))?
            .json()
            .await
            .map_err(|err| IdentityError::Unavailable(err.to_string()))?;

        let mut cached = self.keys.write().await;
        *cached = Some(CachedKeys {
            fetched_at: Instant::now(),
            jwks: jwks.clone(),
        });
        debug!(keys = jwks.keys.len(), "refreshed Google signing keys");
        Ok(jwks)
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let header = jsonwebtoken::decode_header(id_token)
            .map_err(|err| IdentityError::Rejected(format!("malformed token header: {err}")))?;
        let kid = header
            .kid
            .ok_or_else(|| IdentityError::Rejected("token header carries no key id".into()))?;

        let jwks = self.signing_keys().await?;
        let jwk = jwks
            .keys
            .iter()
            .find(|key| key.kid == kid)
            .ok_or_else(|| IdentityError::Rejected("token signed by an unknown key".into()))?;
        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|err| IdentityError::Rejected(format!("unusable signing key: {err}")))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&ISSUERS);

        let data = jsonwebtoken::decode::<GoogleClaims>(id_token, &key, &validation)
            .map_err(|err| IdentityError::Rejected(err.to_string()))?;
        let claims = data.claims;

        if claims.email_verified == Some(false) {
            return Err(IdentityError::Rejected("email is not verified".into()));
        }
        let email = Email::new(claims.email)
            .map_err(|err| IdentityError::Rejected(format!("unusable email claim: {err}")))?;

        Ok(VerifiedIdentity {
            name: claims.name.unwrap_or_else(|| email.to_string()),
            picture: claims.picture.unwrap_or_default(),
            email,
        })
    }
}
