//! Port for external identity verification.
//!
//! The provider's only contract is mapping a verified external assertion to
//! the three claims this system needs. Audience checks belong to the adapter:
//! a token minted for another application must never verify here.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::user::Email;

/// Claims extracted from a verified identity assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: Email,
    pub name: String,
    pub picture: String,
}

/// Verification failures raised by identity provider adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The token failed signature, audience, or claim checks.
    #[error("identity token rejected: {0}")]
    Rejected(String),
    /// The provider could not be reached.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Port verifying externally issued identity tokens.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify `id_token` and extract the claims this system needs.
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError>;
}

/// Deterministic provider mapping known token strings to identities.
///
/// Serves tests and keyless development runs; unknown tokens are rejected
/// just like a failed signature check.
#[derive(Debug, Default)]
pub struct StaticIdentityProvider {
    identities: HashMap<String, VerifiedIdentity>,
}

impl StaticIdentityProvider {
    /// Create a provider that rejects everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` as verifying to `identity`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, identity: VerifiedIdentity) -> Self {
        self.identities.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        self.identities
            .get(id_token)
            .cloned()
            .ok_or_else(|| IdentityError::Rejected("unknown token".into()))
    }
}
