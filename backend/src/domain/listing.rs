//! Marketplace listings: items for sale and campus events.
//!
//! Both kinds share the same lifecycle: stamped with a denormalised author
//! snapshot at creation, mutable only by their author, never cleaned up from
//! referencing favourite sets on deletion. The author snapshot is a copy of
//! the profile at creation time and is deliberately not kept in sync with
//! later profile edits.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::error::Error;
use crate::domain::user::{ContactNumber, Email};

/// Identifier shared by items and events.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct ListingId(Uuid);

impl ListingId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ListingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Whether an item is visible in public listings.
///
/// Serialised as `"y"` / `"n"` for compatibility with existing clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Liveness {
    #[serde(rename = "y")]
    Live,
    #[serde(rename = "n")]
    Hidden,
}

impl Liveness {
    /// Flip between live and hidden.
    pub fn toggled(self) -> Self {
        match self {
            Self::Live => Self::Hidden,
            Self::Hidden => Self::Live,
        }
    }
}

/// Author profile copied onto a listing at creation time.
///
/// Wire names keep the `user` prefix existing clients rely on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthorSnapshot {
    #[serde(rename = "userEmail")]
    #[schema(value_type = String)]
    pub email: Email,
    #[serde(rename = "userName")]
    pub name: String,
    #[serde(rename = "userPicture")]
    pub picture: String,
}

/// Marker for records owned by the identity that created them.
pub trait Owned {
    /// Email of the identity that created the record.
    fn author_email(&self) -> &Email;
}

/// Authorise a mutation: the acting identity must be the author.
///
/// Callers must have established existence first so a missing record reports
/// `NotFound` rather than leaking ownership information through `Forbidden`.
pub fn ensure_owner<T: Owned>(resource: &T, acting: &Email) -> Result<(), Error> {
    if resource.author_email() == acting {
        Ok(())
    } else {
        Err(Error::forbidden("you do not own this listing"))
    }
}

/// An item offered for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ListingId,
    #[serde(flatten)]
    pub author: AuthorSnapshot,
    pub item_name: String,
    pub item_description: String,
    pub item_price: i64,
    pub item_category: String,
    pub item_picture: String,
    #[schema(value_type = String)]
    pub contact_number: ContactNumber,
    pub live: Liveness,
    pub date_added: DateTime<Utc>,
}

impl Owned for Item {
    fn author_email(&self) -> &Email {
        &self.author.email
    }
}

/// Fields supplied by the author when posting an item.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub item_name: String,
    pub item_description: String,
    pub item_price: i64,
    pub item_category: String,
    pub item_picture: String,
    #[serde(default)]
    pub live: Option<Liveness>,
}

impl ItemDraft {
    /// Materialise the draft into a stored item stamped with its author.
    pub fn into_item(self, author: AuthorSnapshot, contact_number: ContactNumber) -> Item {
        Item {
            id: ListingId::random(),
            author,
            item_name: self.item_name,
            item_description: self.item_description,
            item_price: self.item_price,
            item_category: self.item_category,
            item_picture: self.item_picture,
            contact_number,
            live: self.live.unwrap_or(Liveness::Live),
            date_added: Utc::now(),
        }
    }
}

/// Sparse patch for an item: only present fields are applied.
///
/// `date_added` is never touched by a patch.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    pub item_name: Option<String>,
    pub item_description: Option<String>,
    pub item_price: Option<i64>,
    pub item_category: Option<String>,
    pub item_picture: Option<String>,
    #[schema(value_type = Option<String>)]
    pub contact_number: Option<ContactNumber>,
    pub live: Option<Liveness>,
}

impl ItemPatch {
    /// Apply the present fields to `item`, leaving the rest untouched.
    pub fn apply(self, item: &mut Item) {
        let Self {
            item_name,
            item_description,
            item_price,
            item_category,
            item_picture,
            contact_number,
            live,
        } = self;
        if let Some(name) = item_name {
            item.item_name = name;
        }
        if let Some(description) = item_description {
            item.item_description = description;
        }
        if let Some(price) = item_price {
            item.item_price = price;
        }
        if let Some(category) = item_category {
            item.item_category = category;
        }
        if let Some(picture) = item_picture {
            item.item_picture = picture;
        }
        if let Some(number) = contact_number {
            item.contact_number = number;
        }
        if let Some(live) = live {
            item.live = live;
        }
    }

    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        matches!(
            self,
            Self {
                item_name: None,
                item_description: None,
                item_price: None,
                item_category: None,
                item_picture: None,
                contact_number: None,
                live: None,
            }
        )
    }
}

/// A campus event open for reminder sign-ups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: ListingId,
    #[serde(flatten)]
    pub author: AuthorSnapshot,
    pub event_name: String,
    pub event_description: String,
    /// Instant the event starts; drives the reminder scan.
    pub event_date: DateTime<Utc>,
    /// Display time as entered by the author, e.g. "18:00".
    pub event_time: String,
    pub event_location: String,
    pub event_category: String,
    /// Push delivery tokens registered for a reminder. Any caller may add
    /// theirs; additions are idempotent.
    pub notifications: BTreeSet<String>,
    pub date_added: DateTime<Utc>,
}

impl Owned for Event {
    fn author_email(&self) -> &Email {
        &self.author.email
    }
}

/// Fields supplied by the author when posting an event.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub event_name: String,
    pub event_description: String,
    pub event_date: DateTime<Utc>,
    pub event_time: String,
    pub event_location: String,
    pub event_category: String,
}

impl EventDraft {
    /// Materialise the draft into a stored event stamped with its author.
    pub fn into_event(self, author: AuthorSnapshot) -> Event {
        Event {
            id: ListingId::random(),
            author,
            event_name: self.event_name,
            event_description: self.event_description,
            event_date: self.event_date,
            event_time: self.event_time,
            event_location: self.event_location,
            event_category: self.event_category,
            notifications: BTreeSet::new(),
            date_added: Utc::now(),
        }
    }
}
