//! Ownership-scoped item lifecycle.
//!
//! Every mutation follows the same contract: look the item up first and
//! report `NotFound` when it is absent, only then compare the stored author
//! against the acting identity. A missing id therefore never leaks ownership
//! information through a `Forbidden`.

use std::sync::Arc;

use tracing::warn;

use crate::domain::error::Error;
use crate::domain::listing::{
    AuthorSnapshot, Item, ItemDraft, ItemPatch, ListingId, Liveness, ensure_owner,
};
use crate::domain::ports::{ItemRepository, PushGateway, UserDirectory};
use crate::domain::session::SessionClaims;
use crate::domain::user::Email;

/// Use-case service for items.
pub struct ItemService {
    items: Arc<dyn ItemRepository>,
    directory: Arc<dyn UserDirectory>,
    push: Arc<dyn PushGateway>,
}

impl ItemService {
    /// Wire the service from its collaborators.
    pub fn new(
        items: Arc<dyn ItemRepository>,
        directory: Arc<dyn UserDirectory>,
        push: Arc<dyn PushGateway>,
    ) -> Self {
        Self {
            items,
            directory,
            push,
        }
    }

    /// Persist a new item stamped with the author's profile snapshot.
    ///
    /// Appends the id to the author's posted set and broadcasts a push
    /// notification to every registered device. Both follow-ups run after the
    /// insert has committed; their failures are logged, never surfaced.
    pub async fn create(&self, author: &SessionClaims, draft: ItemDraft) -> Result<Item, Error> {
        let snapshot = AuthorSnapshot {
            email: author.email.clone(),
            name: author.name.clone(),
            picture: author.picture.clone(),
        };
        let item = draft.into_item(snapshot, author.contact_number.clone());
        self.items.insert(&item).await?;

        if let Err(err) = self
            .directory
            .record_posted_item(&item.author.email, &item.id)
            .await
        {
            warn!(error = %err, item = %item.id, "failed to record posted item");
        }

        self.broadcast_new_item(&item);
        Ok(item)
    }

    fn broadcast_new_item(&self, item: &Item) {
        let directory = Arc::clone(&self.directory);
        let push = Arc::clone(&self.push);
        let name = item.item_name.clone();
        tokio::spawn(async move {
            let tokens = match directory.all_push_tokens().await {
                Ok(tokens) => tokens,
                Err(err) => {
                    warn!(error = %err, "skipping new-item broadcast: token query failed");
                    return;
                }
            };
            if tokens.is_empty() {
                return;
            }
            let body = format!("\"{name}\" was just listed");
            if let Err(err) = push.notify(&tokens, "New item posted", &body).await {
                warn!(error = %err, "new-item broadcast failed");
            }
        });
    }

    /// Publicly visible items, optionally narrowed to a category.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Item>, Error> {
        Ok(self.items.list(category).await?)
    }

    /// Items authored by `email`.
    pub async fn list_by_author(&self, email: &Email) -> Result<Vec<Item>, Error> {
        Ok(self.items.list_by_author(email).await?)
    }

    /// Apply a sparse patch. Existence is checked before ownership.
    pub async fn update(
        &self,
        acting: &Email,
        id: &ListingId,
        patch: ItemPatch,
    ) -> Result<(), Error> {
        let mut item = self.find_existing(id).await?;
        ensure_owner(&item, acting)?;
        patch.apply(&mut item);
        self.items.update(&item).await?;
        Ok(())
    }

    /// Delete an item. Existence is checked before ownership.
    pub async fn delete(&self, acting: &Email, id: &ListingId) -> Result<(), Error> {
        let item = self.find_existing(id).await?;
        ensure_owner(&item, acting)?;
        // Favourite sets referencing the id are left as-is.
        self.items.delete(id).await?;
        Ok(())
    }

    /// Flip the live flag, returning the new state. Existence before ownership.
    pub async fn toggle_live(&self, acting: &Email, id: &ListingId) -> Result<Liveness, Error> {
        let mut item = self.find_existing(id).await?;
        ensure_owner(&item, acting)?;
        item.live = item.live.toggled();
        self.items.update(&item).await?;
        Ok(item.live)
    }

    async fn find_existing(&self, id: &ListingId) -> Result<Item, Error> {
        self.items
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("item not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::{InMemoryItemRepository, InMemoryUserDirectory, NoOpPushGateway};
    use crate::domain::user::{ContactNumber, User};

    fn claims(email: &str) -> SessionClaims {
        SessionClaims {
            email: Email::new(email).expect("email"),
            name: "Ada".into(),
            picture: "https://example.com/ada.png".into(),
            contact_number: ContactNumber::new("555-0100").expect("number"),
            exp: 0,
            iat: 0,
        }
    }

    fn draft(name: &str) -> ItemDraft {
        ItemDraft {
            item_name: name.into(),
            item_description: "desc".into(),
            item_price: 100,
            item_category: "misc".into(),
            item_picture: "https://example.com/p.png".into(),
            live: None,
        }
    }

    fn service_with_directory() -> (ItemService, Arc<InMemoryUserDirectory>) {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let service = ItemService::new(
            Arc::new(InMemoryItemRepository::new()),
            Arc::clone(&directory) as Arc<dyn UserDirectory>,
            Arc::new(NoOpPushGateway),
        );
        (service, directory)
    }

    #[tokio::test]
    async fn create_stamps_the_author_snapshot() {
        let (service, _) = service_with_directory();
        let item = service
            .create(&claims("a@x.com"), draft("Desk lamp"))
            .await
            .expect("create");
        assert_eq!(item.author.email.as_ref(), "a@x.com");
        assert_eq!(item.author.name, "Ada");
        assert_eq!(item.live, Liveness::Live);
    }

    #[tokio::test]
    async fn create_records_the_posted_item() {
        let (service, directory) = service_with_directory();
        let ada = Email::new("a@x.com").expect("email");
        directory
            .insert(&User::first_sight(
                ada.clone(),
                "Ada",
                "pic",
                ContactNumber::new("555-0100").expect("number"),
            ))
            .await
            .expect("insert user");

        let item = service
            .create(&claims("a@x.com"), draft("Desk lamp"))
            .await
            .expect("create");

        let stored = directory
            .find_by_email(&ada)
            .await
            .expect("query")
            .expect("user");
        assert!(stored.items_posted.contains(&item.id));
    }

    #[tokio::test]
    async fn mutations_on_a_missing_id_are_not_found_never_forbidden() {
        let (service, _) = service_with_directory();
        let stranger = Email::new("mallory@x.com").expect("email");
        let missing = ListingId::random();

        let update = service
            .update(&stranger, &missing, ItemPatch::default())
            .await
            .expect_err("update");
        let delete = service.delete(&stranger, &missing).await.expect_err("delete");
        let toggle = service
            .toggle_live(&stranger, &missing)
            .await
            .expect_err("toggle");

        for err in [update, delete, toggle] {
            assert_eq!(err.code(), ErrorCode::NotFound);
        }
    }

    #[tokio::test]
    async fn mutations_by_a_non_owner_are_forbidden() {
        let (service, _) = service_with_directory();
        let item = service
            .create(&claims("a@x.com"), draft("Desk lamp"))
            .await
            .expect("create");
        let mallory = Email::new("mallory@x.com").expect("email");

        let update = service
            .update(&mallory, &item.id, ItemPatch::default())
            .await
            .expect_err("update");
        let delete = service.delete(&mallory, &item.id).await.expect_err("delete");
        let toggle = service
            .toggle_live(&mallory, &item.id)
            .await
            .expect_err("toggle");

        for err in [update, delete, toggle] {
            assert_eq!(err.code(), ErrorCode::Forbidden);
        }
    }

    #[tokio::test]
    async fn owner_can_patch_without_refreshing_date_added() {
        let (service, _) = service_with_directory();
        let ada = Email::new("a@x.com").expect("email");
        let item = service
            .create(&claims("a@x.com"), draft("Desk lamp"))
            .await
            .expect("create");

        service
            .update(
                &ada,
                &item.id,
                ItemPatch {
                    item_price: Some(42),
                    ..ItemPatch::default()
                },
            )
            .await
            .expect("update");

        let stored = service.list(None).await.expect("list");
        let stored = stored.first().expect("item");
        assert_eq!(stored.item_price, 42);
        assert_eq!(stored.item_name, "Desk lamp");
        assert_eq!(stored.date_added, item.date_added);
    }

    #[tokio::test]
    async fn toggle_live_flips_and_reports_the_new_state() {
        let (service, _) = service_with_directory();
        let ada = Email::new("a@x.com").expect("email");
        let item = service
            .create(&claims("a@x.com"), draft("Desk lamp"))
            .await
            .expect("create");

        assert_eq!(
            service.toggle_live(&ada, &item.id).await.expect("toggle"),
            Liveness::Hidden
        );
        assert_eq!(
            service.toggle_live(&ada, &item.id).await.expect("toggle"),
            Liveness::Live
        );
    }

    #[tokio::test]
    async fn delete_then_list_excludes_the_item() {
        let (service, _) = service_with_directory();
        let ada = Email::new("a@x.com").expect("email");
        let item = service
            .create(&claims("a@x.com"), draft("Desk lamp"))
            .await
            .expect("create");

        service.delete(&ada, &item.id).await.expect("delete");
        assert!(service.list(None).await.expect("list").is_empty());
    }
}
