//! Profile maintenance: contact numbers, push tokens, and favourites.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::error::Error;
use crate::domain::listing::ListingId;
use crate::domain::ports::{ItemRepository, UserDirectory};
use crate::domain::session::{SessionTokens, TokenTtl};
use crate::domain::user::{ContactNumber, Email};

/// Result of a contact number change.
#[derive(Debug, Clone)]
pub struct ContactNumberUpdate {
    /// How many of the user's items received the new number.
    pub items_updated: u64,
    /// Fresh short-lived session reflecting the new number.
    pub token: String,
}

/// Use-case service for the signed-in user's own record.
pub struct UserService {
    directory: Arc<dyn UserDirectory>,
    items: Arc<dyn ItemRepository>,
    tokens: SessionTokens,
}

impl UserService {
    /// Wire the service from its collaborators.
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        items: Arc<dyn ItemRepository>,
        tokens: SessionTokens,
    ) -> Self {
        Self {
            directory,
            items,
            tokens,
        }
    }

    /// Change the stored contact number and stamp it onto every item the
    /// user has posted, reporting how many were touched.
    ///
    /// The item fix-up and the user update are independent writes; a crash
    /// between them leaves the denormalised copies stale until the next
    /// change. Ends by issuing a fresh session so the embedded claims catch
    /// up immediately.
    pub async fn update_contact_number(
        &self,
        email: &Email,
        number: ContactNumber,
    ) -> Result<ContactNumberUpdate, Error> {
        let matched = self.directory.update_contact_number(email, &number).await?;
        if !matched {
            return Err(Error::not_found("user not found"));
        }
        let items_updated = self.items.update_contact_for_author(email, &number).await?;

        let user = self
            .directory
            .find_by_email(email)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))?;
        let token = self.tokens.issue(&user, TokenTtl::Short)?;

        Ok(ContactNumberUpdate {
            items_updated,
            token,
        })
    }

    /// Store the user's push delivery token.
    pub async fn set_push_token(&self, email: &Email, token: &str) -> Result<(), Error> {
        if self.directory.set_push_token(email, token).await? {
            Ok(())
        } else {
            Err(Error::not_found("user not found"))
        }
    }

    /// Whether the user has a push delivery token registered.
    pub async fn has_push_token(&self, email: &Email) -> Result<bool, Error> {
        Ok(self.directory.has_push_token(email).await?)
    }

    /// Toggle a listing in the user's favourites, returning whether it is now
    /// a favourite. Toggling twice restores the original set.
    pub async fn toggle_favourite(
        &self,
        email: &Email,
        listing: &ListingId,
    ) -> Result<bool, Error> {
        self.directory
            .toggle_favourite(email, listing)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    /// The user's favourite listing ids.
    pub async fn list_favourites(&self, email: &Email) -> Result<BTreeSet<ListingId>, Error> {
        self.directory
            .list_favourites(email)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}
