//! Stateless session credentials.
//!
//! A session is an HS256-signed token embedding the holder's identity claims
//! and an expiry. The server keeps no session table: validity is decided
//! entirely by signature and expiry at decode time, and expiry is the only
//! invalidation mechanism. Claims are frozen at issuance and may go stale;
//! every mutating profile operation answers with a freshly issued token.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::Error;
use crate::domain::user::{ContactNumber, Email, User};

/// How long an issued session stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTtl {
    /// 30 days, issued once at social sign-in.
    Long,
    /// 1 day, issued on every subsequent re-verification.
    Short,
}

impl TokenTtl {
    fn duration(self) -> Duration {
        match self {
            Self::Long => Duration::days(30),
            Self::Short => Duration::days(1),
        }
    }
}

/// Identity claims embedded in every session token.
///
/// A flat mapping of scalar fields; wire names match what clients already
/// decode. `contact_number` reflects the value at issuance and is refreshed
/// by re-verification rather than kept live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "userEmail")]
    pub email: Email,
    #[serde(rename = "userName")]
    pub name: String,
    #[serde(rename = "userPicture")]
    pub picture: String,
    #[serde(rename = "contactNumber")]
    pub contact_number: ContactNumber,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
}

/// Issues and verifies session tokens with a process-wide symmetric secret.
///
/// Decoding fails closed: a bad signature, malformed structure, and past
/// expiry are indistinguishable to callers, all reporting an unauthenticated
/// error.
#[derive(Clone)]
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionTokens {
    /// Build a codec from the shared signing secret.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expired means expired; no grace window.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token carrying `user`'s current profile, valid for `ttl`.
    pub fn issue(&self, user: &User, ttl: TokenTtl) -> Result<String, Error> {
        self.issue_at(user, ttl, Utc::now())
    }

    fn issue_at(&self, user: &User, ttl: TokenTtl, now: DateTime<Utc>) -> Result<String, Error> {
        let claims = SessionClaims {
            email: user.email.clone(),
            name: user.name.clone(),
            picture: user.picture.clone(),
            contact_number: user.contact_number.clone(),
            exp: (now + ttl.duration()).timestamp(),
            iat: now.timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| Error::internal(format!("failed to sign session token: {err}")))
    }

    /// Decode and verify a token, returning the embedded claims.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, Error> {
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                debug!(error = %err, "session token rejected");
                Error::unauthorized("invalid or expired session")
            })
    }
}
