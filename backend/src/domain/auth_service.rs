//! Authentication flow: external verification to session issuance.
//!
//! Orchestrates the identity provider, the user directory, and the session
//! token codec. Sign-in deliberately collapses every internal failure into a
//! single unauthenticated error; the distinction between a bad token and a
//! broken directory is logged server-side and kept from the caller.

use std::sync::Arc;

use tracing::error;

use crate::domain::error::Error;
use crate::domain::ports::{IdentityProvider, UserDirectory, VerifiedIdentity};
use crate::domain::session::{SessionTokens, TokenTtl};
use crate::domain::user::{ContactNumber, Email, User};

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignInOutcome {
    /// Freshly issued session token.
    pub token: String,
    /// The stored user record backing the session.
    pub user: User,
    /// True iff the record was created by this sign-in.
    pub first_time: bool,
}

/// Use-case service for establishing and refreshing sessions.
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    directory: Arc<dyn UserDirectory>,
    tokens: SessionTokens,
}

impl AuthService {
    /// Wire the flow from its collaborators.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        directory: Arc<dyn UserDirectory>,
        tokens: SessionTokens,
    ) -> Self {
        Self {
            provider,
            directory,
            tokens,
        }
    }

    /// Exchange an external identity token for a long-lived session.
    ///
    /// First sight of an email creates the user record with the supplied
    /// contact number; a repeat sign-in returns the stored record unchanged.
    /// The stored contact number is never overwritten here.
    pub async fn sign_in(
        &self,
        id_token: &str,
        contact_number: ContactNumber,
    ) -> Result<SignInOutcome, Error> {
        self.establish_session(id_token, contact_number, TokenTtl::Long)
            .await
    }

    /// Alternate entry used by profile registration: same upsert semantics as
    /// [`AuthService::sign_in`] but issues a short-lived session.
    pub async fn register_or_update(
        &self,
        id_token: &str,
        contact_number: ContactNumber,
    ) -> Result<SignInOutcome, Error> {
        self.establish_session(id_token, contact_number, TokenTtl::Short)
            .await
    }

    async fn establish_session(
        &self,
        id_token: &str,
        contact_number: ContactNumber,
        ttl: TokenTtl,
    ) -> Result<SignInOutcome, Error> {
        let identity = self.provider.verify(id_token).await.map_err(|err| {
            error!(error = %err, "external identity verification failed");
            authentication_failed()
        })?;

        let (user, first_time) = self
            .upsert_on_first_sight(identity, contact_number)
            .await
            .map_err(|err| {
                error!(error = %err, "user upsert failed during sign-in");
                authentication_failed()
            })?;

        let token = self.tokens.issue(&user, ttl).map_err(|err| {
            error!(error = %err, "session issuance failed during sign-in");
            authentication_failed()
        })?;

        Ok(SignInOutcome {
            token,
            user,
            first_time,
        })
    }

    async fn upsert_on_first_sight(
        &self,
        identity: VerifiedIdentity,
        contact_number: ContactNumber,
    ) -> Result<(User, bool), Error> {
        if let Some(existing) = self.directory.find_by_email(&identity.email).await? {
            return Ok((existing, false));
        }
        let user = User::first_sight(identity.email, identity.name, identity.picture, contact_number);
        self.directory.insert(&user).await?;
        Ok((user, true))
    }

    /// Re-read the directory and issue a fresh short-lived session.
    ///
    /// Used after profile mutations so the embedded claims catch up with the
    /// stored record. Fails with `NotFound` when the record has vanished.
    pub async fn re_verify(&self, email: &Email) -> Result<(String, User), Error> {
        let user = self
            .directory
            .find_by_email(email)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))?;
        let token = self.tokens.issue(&user, TokenTtl::Short)?;
        Ok((token, user))
    }
}

fn authentication_failed() -> Error {
    Error::unauthorized("authentication failed")
}
