//! Port for event persistence.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::listing::{Event, ListingId};

pub use super::item_repository::ListingStoreError;

/// Storage port for events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Persist a new event.
    async fn insert(&self, event: &Event) -> Result<(), ListingStoreError>;

    /// Fetch an event by id.
    async fn find(&self, id: &ListingId) -> Result<Option<Event>, ListingStoreError>;

    /// All events, optionally narrowed to a category. No pagination.
    async fn list(&self, category: Option<&str>) -> Result<Vec<Event>, ListingStoreError>;

    /// Add a push delivery token to the event's reminder set. Returns `false`
    /// when the event does not exist. Adding the same token twice is a no-op.
    async fn add_notification_token(
        &self,
        id: &ListingId,
        token: &str,
    ) -> Result<bool, ListingStoreError>;

    /// Events starting in the half-open window `[from, to)`.
    async fn starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Event>, ListingStoreError>;
}

/// In-memory event store for tests and database-less runs.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    events: Mutex<HashMap<ListingId, Event>>,
}

impl InMemoryEventRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_events<T>(&self, f: impl FnOnce(&mut HashMap<ListingId, Event>) -> T) -> T {
        let mut guard = self.events.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn insert(&self, event: &Event) -> Result<(), ListingStoreError> {
        self.with_events(|events| {
            events.insert(event.id, event.clone());
        });
        Ok(())
    }

    async fn find(&self, id: &ListingId) -> Result<Option<Event>, ListingStoreError> {
        Ok(self.with_events(|events| events.get(id).cloned()))
    }

    async fn list(&self, category: Option<&str>) -> Result<Vec<Event>, ListingStoreError> {
        let mut matched = self.with_events(|events| {
            events
                .values()
                .filter(|event| category.is_none_or(|cat| event.event_category == cat))
                .cloned()
                .collect::<Vec<_>>()
        });
        matched.sort_by(|a, b| a.event_date.cmp(&b.event_date));
        Ok(matched)
    }

    async fn add_notification_token(
        &self,
        id: &ListingId,
        token: &str,
    ) -> Result<bool, ListingStoreError> {
        Ok(self.with_events(|events| match events.get_mut(id) {
            Some(event) => {
                event.notifications.insert(token.to_owned());
                true
            }
            None => false,
        }))
    }

    async fn starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Event>, ListingStoreError> {
        Ok(self.with_events(|events| {
            events
                .values()
                .filter(|event| event.event_date >= from && event.event_date < to)
                .cloned()
                .collect()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::{AuthorSnapshot, EventDraft};
    use crate::domain::user::Email;
    use chrono::Duration;

    fn event(starts_in: Duration) -> Event {
        EventDraft {
            event_name: "Open mic".into(),
            event_description: "Bring an instrument".into(),
            event_date: Utc::now() + starts_in,
            event_time: "18:00".into(),
            event_location: "Quad".into(),
            event_category: "music".into(),
        }
        .into_event(AuthorSnapshot {
            email: Email::new("ada@example.edu").expect("email"),
            name: "Ada".into(),
            picture: "https://example.com/ada.png".into(),
        })
    }

    #[tokio::test]
    async fn notification_tokens_are_a_set() {
        let repo = InMemoryEventRepository::new();
        let stored = event(Duration::days(1));
        repo.insert(&stored).await.expect("insert");

        assert!(repo.add_notification_token(&stored.id, "fcm-1").await.expect("add"));
        assert!(repo.add_notification_token(&stored.id, "fcm-1").await.expect("add"));
        assert!(repo.add_notification_token(&stored.id, "fcm-2").await.expect("add"));

        let found = repo.find(&stored.id).await.expect("find").expect("event");
        assert_eq!(found.notifications.len(), 2);
    }

    #[tokio::test]
    async fn adding_a_token_to_a_missing_event_reports_absence() {
        let repo = InMemoryEventRepository::new();
        assert!(
            !repo
                .add_notification_token(&ListingId::random(), "fcm-1")
                .await
                .expect("add")
        );
    }

    #[tokio::test]
    async fn window_query_is_half_open() {
        let repo = InMemoryEventRepository::new();
        let soon = event(Duration::minutes(30));
        let later = event(Duration::hours(3));
        repo.insert(&soon).await.expect("insert");
        repo.insert(&later).await.expect("insert");

        let now = Utc::now();
        let within = repo
            .starting_between(now, now + Duration::hours(1))
            .await
            .expect("scan");
        assert_eq!(within.len(), 1);
        assert_eq!(within.first().map(|e| e.id), Some(soon.id));
    }
}
