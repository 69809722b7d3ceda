//! MongoDB adapters for the user directory and the listing stores.
//!
//! Documents are the domain structs serialised as-is, so field names on the
//! wire match the JSON API (`userEmail`, `itemCategory`, `favouriteItems`).
//! Mongo's generated `_id` is left alone; lookups go through the `id` field
//! the domain stamps at creation.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection, Database};

use crate::domain::listing::{Event, Item, ListingId};
use crate::domain::ports::{
    DirectoryError, EventRepository, ItemRepository, ListingStoreError, UserDirectory,
};
use crate::domain::user::{ContactNumber, Email, User};

const USERS: &str = "Users";
const ITEMS: &str = "Items";
const EVENTS: &str = "Events";

/// Connect to the deployment and select the application database.
pub async fn connect(uri: &str, database: &str) -> Result<Database, DirectoryError> {
    let client = Client::with_uri_str(uri)
        .await
        .map_err(|err| DirectoryError::Connection(err.to_string()))?;
    Ok(client.database(database))
}

fn directory_error(err: mongodb::error::Error) -> DirectoryError {
    DirectoryError::Query(err.to_string())
}

fn store_error(err: mongodb::error::Error) -> ListingStoreError {
    ListingStoreError::Query(err.to_string())
}

/// Mongo-backed [`UserDirectory`].
#[derive(Clone)]
pub struct MongoUserDirectory {
    users: Collection<User>,
}

impl MongoUserDirectory {
    /// Bind the adapter to the `Users` collection.
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection(USERS),
        }
    }

    fn by_email(email: &Email) -> mongodb::bson::Document {
        doc! { "userEmail": email.as_ref() }
    }
}

#[async_trait]
impl UserDirectory for MongoUserDirectory {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, DirectoryError> {
        self.users
            .find_one(Self::by_email(email))
            .await
            .map_err(directory_error)
    }

    async fn insert(&self, user: &User) -> Result<(), DirectoryError> {
        self.users
            .insert_one(user)
            .await
            .map(|_| ())
            .map_err(directory_error)
    }

    async fn update_contact_number(
        &self,
        email: &Email,
        number: &ContactNumber,
    ) -> Result<bool, DirectoryError> {
        let result = self
            .users
            .update_one(
                Self::by_email(email),
                doc! { "$set": { "contactNumber": number.as_ref() } },
            )
            .await
            .map_err(directory_error)?;
        Ok(result.matched_count > 0)
    }

    async fn set_push_token(&self, email: &Email, token: &str) -> Result<bool, DirectoryError> {
        let result = self
            .users
            .update_one(
                Self::by_email(email),
                doc! { "$set": { "fcmToken": token } },
            )
            .await
            .map_err(directory_error)?;
        Ok(result.matched_count > 0)
    }

    async fn has_push_token(&self, email: &Email) -> Result<bool, DirectoryError> {
        let user = self.find_by_email(email).await?;
        Ok(user.is_some_and(|u| u.fcm_token.is_some()))
    }

    async fn toggle_favourite(
        &self,
        email: &Email,
        listing: &ListingId,
    ) -> Result<Option<bool>, DirectoryError> {
        // Lookup-then-write; concurrent toggles resolve last-write-wins.
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        let id = listing.to_string();
        let update = if user.favourite_items.contains(listing) {
            doc! { "$pull": { "favouriteItems": &id } }
        } else {
            doc! { "$addToSet": { "favouriteItems": &id } }
        };
        self.users
            .update_one(Self::by_email(email), update)
            .await
            .map_err(directory_error)?;
        Ok(Some(!user.favourite_items.contains(listing)))
    }

    async fn list_favourites(
        &self,
        email: &Email,
    ) -> Result<Option<BTreeSet<ListingId>>, DirectoryError> {
        Ok(self
            .find_by_email(email)
            .await?
            .map(|user| user.favourite_items))
    }

    async fn record_posted_item(
        &self,
        email: &Email,
        listing: &ListingId,
    ) -> Result<(), DirectoryError> {
        self.users
            .update_one(
                Self::by_email(email),
                doc! { "$addToSet": { "itemsPosted": listing.to_string() } },
            )
            .await
            .map(|_| ())
            .map_err(directory_error)
    }

    async fn all_push_tokens(&self) -> Result<Vec<String>, DirectoryError> {
        let users: Vec<User> = self
            .users
            .find(doc! { "fcmToken": { "$exists": true, "$ne": null } })
            .await
            .map_err(directory_error)?
            .try_collect()
            .await
            .map_err(directory_error)?;
        Ok(users.into_iter().filter_map(|u| u.fcm_token).collect())
    }
}

/// Mongo-backed [`ItemRepository`].
#[derive(Clone)]
pub struct MongoItemRepository {
    items: Collection<Item>,
}

impl MongoItemRepository {
    /// Bind the adapter to the `Items` collection.
    pub fn new(db: &Database) -> Self {
        Self {
            items: db.collection(ITEMS),
        }
    }

    fn by_id(id: &ListingId) -> mongodb::bson::Document {
        doc! { "id": id.to_string() }
    }
}

#[async_trait]
impl ItemRepository for MongoItemRepository {
    async fn insert(&self, item: &Item) -> Result<(), ListingStoreError> {
        self.items
            .insert_one(item)
            .await
            .map(|_| ())
            .map_err(store_error)
    }

    async fn find(&self, id: &ListingId) -> Result<Option<Item>, ListingStoreError> {
        self.items
            .find_one(Self::by_id(id))
            .await
            .map_err(store_error)
    }

    async fn list(&self, category: Option<&str>) -> Result<Vec<Item>, ListingStoreError> {
        let filter = match category {
            Some(cat) => doc! { "itemCategory": cat },
            None => doc! {},
        };
        self.items
            .find(filter)
            .await
            .map_err(store_error)?
            .try_collect()
            .await
            .map_err(store_error)
    }

    async fn list_by_author(&self, email: &Email) -> Result<Vec<Item>, ListingStoreError> {
        self.items
            .find(doc! { "userEmail": email.as_ref() })
            .await
            .map_err(store_error)?
            .try_collect()
            .await
            .map_err(store_error)
    }

    async fn update(&self, item: &Item) -> Result<(), ListingStoreError> {
        self.items
            .replace_one(Self::by_id(&item.id), item)
            .await
            .map(|_| ())
            .map_err(store_error)
    }

    async fn delete(&self, id: &ListingId) -> Result<bool, ListingStoreError> {
        let result = self
            .items
            .delete_one(Self::by_id(id))
            .await
            .map_err(store_error)?;
        Ok(result.deleted_count > 0)
    }

    async fn update_contact_for_author(
        &self,
        email: &Email,
        number: &ContactNumber,
    ) -> Result<u64, ListingStoreError> {
        let result = self
            .items
            .update_many(
                doc! { "userEmail": email.as_ref() },
                doc! { "$set": { "contactNumber": number.as_ref() } },
            )
            .await
            .map_err(store_error)?;
        Ok(result.modified_count)
    }
}

/// Mongo-backed [`EventRepository`].
#[derive(Clone)]
pub struct MongoEventRepository {
    events: Collection<Event>,
}

impl MongoEventRepository {
    /// Bind the adapter to the `Events` collection.
    pub fn new(db: &Database) -> Self {
        Self {
            events: db.collection(EVENTS),
        }
    }
}

#[async_trait]
impl EventRepository for MongoEventRepository {
    async fn insert(&self, event: &Event) -> Result<(), ListingStoreError> {
        self.events
            .insert_one(event)
            .await
            .map(|_| ())
            .map_err(store_error)
    }

    async fn find(&self, id: &ListingId) -> Result<Option<Event>, ListingStoreError> {
        self.events
            .find_one(doc! { "id": id.to_string() })
            .await
            .map_err(store_error)
    }

    async fn list(&self, category: Option<&str>) -> Result<Vec<Event>, ListingStoreError> {
        let filter = match category {
            Some(cat) => doc! { "eventCategory": cat },
            None => doc! {},
        };
        self.events
            .find(filter)
            .await
            .map_err(store_error)?
            .try_collect()
            .await
            .map_err(store_error)
    }

    async fn add_notification_token(
        &self,
        id: &ListingId,
        token: &str,
    ) -> Result<bool, ListingStoreError> {
        let result = self
            .events
            .update_one(
                doc! { "id": id.to_string() },
                doc! { "$addToSet": { "notifications": token } },
            )
            .await
            .map_err(store_error)?;
        Ok(result.matched_count > 0)
    }

    async fn starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Event>, ListingStoreError> {
        // Start instants are stored as RFC 3339 strings, which do not range-
        // compare reliably across precision; filter after decoding instead.
        // The collection is small and the scan runs once a minute.
        let events: Vec<Event> = self
            .events
            .find(doc! {})
            .await
            .map_err(store_error)?
            .try_collect()
            .await
            .map_err(store_error)?;
        Ok(events
            .into_iter()
            .filter(|event| event.event_date >= from && event.event_date < to)
            .collect())
    }
}
