//! Port for the first-party user directory.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::listing::ListingId;
use crate::domain::user::{ContactNumber, Email, User};

/// Persistence errors raised by user directory adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// Directory connection could not be established.
    #[error("user directory connection failed: {0}")]
    Connection(String),
    /// Query or mutation failed during execution.
    #[error("user directory query failed: {0}")]
    Query(String),
}

impl From<DirectoryError> for Error {
    fn from(err: DirectoryError) -> Self {
        Self::upstream(err.to_string())
    }
}

/// Storage port for user records keyed by verified email.
///
/// Lookups answering for an absent user return `None`/`false` rather than an
/// error; callers decide whether absence is a 404 or a silent no-op.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a user by email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, DirectoryError>;

    /// Insert a brand-new record. First-sight semantics live in the caller:
    /// this is a plain insert and must not be used to overwrite.
    async fn insert(&self, user: &User) -> Result<(), DirectoryError>;

    /// Set the contact number on an existing record. Returns `false` when no
    /// record matched.
    async fn update_contact_number(
        &self,
        email: &Email,
        number: &ContactNumber,
    ) -> Result<bool, DirectoryError>;

    /// Store the user's push delivery token. Returns `false` when no record
    /// matched.
    async fn set_push_token(&self, email: &Email, token: &str) -> Result<bool, DirectoryError>;

    /// Whether the user has a push delivery token registered. Absent users
    /// simply have none.
    async fn has_push_token(&self, email: &Email) -> Result<bool, DirectoryError>;

    /// Toggle a listing in the user's favourite set. Returns
    /// `Some(now_favourite)` or `None` when the user is absent. Repeated
    /// toggles never duplicate an entry.
    async fn toggle_favourite(
        &self,
        email: &Email,
        listing: &ListingId,
    ) -> Result<Option<bool>, DirectoryError>;

    /// The user's favourite set, or `None` when the user is absent.
    async fn list_favourites(
        &self,
        email: &Email,
    ) -> Result<Option<BTreeSet<ListingId>>, DirectoryError>;

    /// Record a listing the user just posted. Idempotent.
    async fn record_posted_item(
        &self,
        email: &Email,
        listing: &ListingId,
    ) -> Result<(), DirectoryError>;

    /// Every registered push delivery token, for new-item broadcasts.
    async fn all_push_tokens(&self) -> Result<Vec<String>, DirectoryError>;
}

/// In-memory directory for tests and database-less runs.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<HashMap<Email, User>>,
}

impl InMemoryUserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_users<T>(&self, f: impl FnOnce(&mut HashMap<Email, User>) -> T) -> T {
        let mut guard = self.users.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, DirectoryError> {
        Ok(self.with_users(|users| users.get(email).cloned()))
    }

    async fn insert(&self, user: &User) -> Result<(), DirectoryError> {
        self.with_users(|users| {
            users.insert(user.email.clone(), user.clone());
        });
        Ok(())
    }

    async fn update_contact_number(
        &self,
        email: &Email,
        number: &ContactNumber,
    ) -> Result<bool, DirectoryError> {
        Ok(self.with_users(|users| match users.get_mut(email) {
            Some(user) => {
                user.contact_number = number.clone();
                true
            }
            None => false,
        }))
    }

    async fn set_push_token(&self, email: &Email, token: &str) -> Result<bool, DirectoryError> {
        Ok(self.with_users(|users| match users.get_mut(email) {
            Some(user) => {
                user.fcm_token = Some(token.to_owned());
                true
            }
            None => false,
        }))
    }

    async fn has_push_token(&self, email: &Email) -> Result<bool, DirectoryError> {
        Ok(self.with_users(|users| {
            users
                .get(email)
                .is_some_and(|user| user.fcm_token.is_some())
        }))
    }

    async fn toggle_favourite(
        &self,
        email: &Email,
        listing: &ListingId,
    ) -> Result<Option<bool>, DirectoryError> {
        Ok(self.with_users(|users| {
            users.get_mut(email).map(|user| {
                if user.favourite_items.remove(listing) {
                    false
                } else {
                    user.favourite_items.insert(*listing);
                    true
                }
            })
        }))
    }

    async fn list_favourites(
        &self,
        email: &Email,
    ) -> Result<Option<BTreeSet<ListingId>>, DirectoryError> {
        Ok(self.with_users(|users| users.get(email).map(|user| user.favourite_items.clone())))
    }

    async fn record_posted_item(
        &self,
        email: &Email,
        listing: &ListingId,
    ) -> Result<(), DirectoryError> {
        self.with_users(|users| {
            if let Some(user) = users.get_mut(email) {
                user.items_posted.insert(*listing);
            }
        });
        Ok(())
    }

    async fn all_push_tokens(&self) -> Result<Vec<String>, DirectoryError> {
        Ok(self.with_users(|users| {
            users
                .values()
                .filter_map(|user| user.fcm_token.clone())
                .collect()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(raw: &str) -> Email {
        Email::new(raw).expect("email")
    }

    async fn seeded() -> (InMemoryUserDirectory, Email) {
        let directory = InMemoryUserDirectory::new();
        let ada = email("ada@example.edu");
        let user = User::first_sight(
            ada.clone(),
            "Ada",
            "https://example.com/ada.png",
            ContactNumber::new("555-0100").expect("number"),
        );
        directory.insert(&user).await.expect("insert");
        (directory, ada)
    }

    #[tokio::test]
    async fn toggle_favourite_is_an_involution() {
        let (directory, ada) = seeded().await;
        let listing = ListingId::random();

        let before = directory
            .list_favourites(&ada)
            .await
            .expect("query")
            .expect("user");

        let first = directory.toggle_favourite(&ada, &listing).await.expect("toggle");
        assert_eq!(first, Some(true));
        let second = directory.toggle_favourite(&ada, &listing).await.expect("toggle");
        assert_eq!(second, Some(false));

        let after = directory
            .list_favourites(&ada)
            .await
            .expect("query")
            .expect("user");
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn toggle_favourite_reports_absent_user() {
        let directory = InMemoryUserDirectory::new();
        let result = directory
            .toggle_favourite(&email("ghost@example.edu"), &ListingId::random())
            .await
            .expect("query");
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn push_token_round_trip() {
        let (directory, ada) = seeded().await;
        assert!(!directory.has_push_token(&ada).await.expect("query"));
        assert!(directory.set_push_token(&ada, "fcm-1").await.expect("set"));
        assert!(directory.has_push_token(&ada).await.expect("query"));
        assert_eq!(
            directory.all_push_tokens().await.expect("query"),
            vec!["fcm-1".to_owned()]
        );
    }

    #[tokio::test]
    async fn absent_user_has_no_push_token() {
        let directory = InMemoryUserDirectory::new();
        assert!(
            !directory
                .has_push_token(&email("ghost@example.edu"))
                .await
                .expect("query")
        );
    }

    #[tokio::test]
    async fn record_posted_item_is_idempotent() {
        let (directory, ada) = seeded().await;
        let listing = ListingId::random();
        directory.record_posted_item(&ada, &listing).await.expect("record");
        directory.record_posted_item(&ada, &listing).await.expect("record");
        let user = directory
            .find_by_email(&ada)
            .await
            .expect("query")
            .expect("user");
        assert_eq!(user.items_posted.len(), 1);
    }
}
