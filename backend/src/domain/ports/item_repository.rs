//! Port for item persistence.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::listing::{Item, ListingId};
use crate::domain::user::{ContactNumber, Email};

/// Persistence errors raised by listing store adapters (items and events).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingStoreError {
    /// Store connection could not be established.
    #[error("listing store connection failed: {0}")]
    Connection(String),
    /// Query or mutation failed during execution.
    #[error("listing store query failed: {0}")]
    Query(String),
}

impl From<ListingStoreError> for Error {
    fn from(err: ListingStoreError) -> Self {
        Self::upstream(err.to_string())
    }
}

/// Storage port for items.
///
/// Lookup-then-write sequences built on this port are not transactional;
/// concurrent mutations of the same item resolve last-write-wins.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Persist a new item.
    async fn insert(&self, item: &Item) -> Result<(), ListingStoreError>;

    /// Fetch an item by id.
    async fn find(&self, id: &ListingId) -> Result<Option<Item>, ListingStoreError>;

    /// All items, optionally narrowed to a category. No pagination.
    async fn list(&self, category: Option<&str>) -> Result<Vec<Item>, ListingStoreError>;

    /// All items authored by `email`.
    async fn list_by_author(&self, email: &Email) -> Result<Vec<Item>, ListingStoreError>;

    /// Replace the stored item matching `item.id`.
    async fn update(&self, item: &Item) -> Result<(), ListingStoreError>;

    /// Delete an item. Returns `false` when nothing matched.
    async fn delete(&self, id: &ListingId) -> Result<bool, ListingStoreError>;

    /// Stamp a new contact number onto every item authored by `email`,
    /// returning how many items were touched.
    async fn update_contact_for_author(
        &self,
        email: &Email,
        number: &ContactNumber,
    ) -> Result<u64, ListingStoreError>;
}

/// In-memory item store for tests and database-less runs.
#[derive(Debug, Default)]
pub struct InMemoryItemRepository {
    items: Mutex<HashMap<ListingId, Item>>,
}

impl InMemoryItemRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_items<T>(&self, f: impl FnOnce(&mut HashMap<ListingId, Item>) -> T) -> T {
        let mut guard = self.items.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn insert(&self, item: &Item) -> Result<(), ListingStoreError> {
        self.with_items(|items| {
            items.insert(item.id, item.clone());
        });
        Ok(())
    }

    async fn find(&self, id: &ListingId) -> Result<Option<Item>, ListingStoreError> {
        Ok(self.with_items(|items| items.get(id).cloned()))
    }

    async fn list(&self, category: Option<&str>) -> Result<Vec<Item>, ListingStoreError> {
        let mut matched = self.with_items(|items| {
            items
                .values()
                .filter(|item| category.is_none_or(|cat| item.item_category == cat))
                .cloned()
                .collect::<Vec<_>>()
        });
        matched.sort_by(|a, b| b.date_added.cmp(&a.date_added));
        Ok(matched)
    }

    async fn list_by_author(&self, email: &Email) -> Result<Vec<Item>, ListingStoreError> {
        let mut matched = self.with_items(|items| {
            items
                .values()
                .filter(|item| &item.author.email == email)
                .cloned()
                .collect::<Vec<_>>()
        });
        matched.sort_by(|a, b| b.date_added.cmp(&a.date_added));
        Ok(matched)
    }

    async fn update(&self, item: &Item) -> Result<(), ListingStoreError> {
        self.with_items(|items| {
            items.insert(item.id, item.clone());
        });
        Ok(())
    }

    async fn delete(&self, id: &ListingId) -> Result<bool, ListingStoreError> {
        Ok(self.with_items(|items| items.remove(id).is_some()))
    }

    async fn update_contact_for_author(
        &self,
        email: &Email,
        number: &ContactNumber,
    ) -> Result<u64, ListingStoreError> {
        Ok(self.with_items(|items| {
            let mut touched = 0;
            for item in items.values_mut() {
                if &item.author.email == email {
                    item.contact_number = number.clone();
                    touched += 1;
                }
            }
            touched
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::{AuthorSnapshot, ItemDraft};

    fn item(author_email: &str, category: &str) -> Item {
        ItemDraft {
            item_name: "Desk lamp".into(),
            item_description: "Barely used".into(),
            item_price: 450,
            item_category: category.into(),
            item_picture: "https://example.com/lamp.png".into(),
            live: None,
        }
        .into_item(
            AuthorSnapshot {
                email: Email::new(author_email).expect("email"),
                name: "Ada".into(),
                picture: "https://example.com/ada.png".into(),
            },
            ContactNumber::new("555-0100").expect("number"),
        )
    }

    #[tokio::test]
    async fn list_filters_by_category() {
        let repo = InMemoryItemRepository::new();
        repo.insert(&item("ada@example.edu", "furniture"))
            .await
            .expect("insert");
        repo.insert(&item("ada@example.edu", "books"))
            .await
            .expect("insert");

        assert_eq!(repo.list(None).await.expect("list").len(), 2);
        let books = repo.list(Some("books")).await.expect("list");
        assert_eq!(books.len(), 1);
        assert_eq!(books.first().map(|i| i.item_category.as_str()), Some("books"));
        assert!(repo.list(Some("vehicles")).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn contact_cascade_touches_only_the_author() {
        let repo = InMemoryItemRepository::new();
        repo.insert(&item("ada@example.edu", "furniture"))
            .await
            .expect("insert");
        repo.insert(&item("ada@example.edu", "books"))
            .await
            .expect("insert");
        repo.insert(&item("grace@example.edu", "books"))
            .await
            .expect("insert");

        let new_number = ContactNumber::new("555-0199").expect("number");
        let touched = repo
            .update_contact_for_author(&Email::new("ada@example.edu").expect("email"), &new_number)
            .await
            .expect("cascade");
        assert_eq!(touched, 2);

        for stored in repo.list(None).await.expect("list") {
            if stored.author.email.as_ref() == "ada@example.edu" {
                assert_eq!(stored.contact_number, new_number);
            } else {
                assert_eq!(stored.contact_number.as_ref(), "555-0100");
            }
        }
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_matched() {
        let repo = InMemoryItemRepository::new();
        let stored = item("ada@example.edu", "books");
        repo.insert(&stored).await.expect("insert");
        assert!(repo.delete(&stored.id).await.expect("delete"));
        assert!(!repo.delete(&stored.id).await.expect("delete"));
    }
}
