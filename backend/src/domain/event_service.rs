//! Event lifecycle and reminder sign-ups.

use std::sync::Arc;

use crate::domain::error::Error;
use crate::domain::listing::{AuthorSnapshot, Event, EventDraft, ListingId};
use crate::domain::ports::EventRepository;
use crate::domain::session::SessionClaims;

/// Use-case service for events.
pub struct EventService {
    events: Arc<dyn EventRepository>,
}

impl EventService {
    /// Wire the service from its repository.
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    /// Persist a new event stamped with the author's profile snapshot.
    pub async fn create(&self, author: &SessionClaims, draft: EventDraft) -> Result<Event, Error> {
        let snapshot = AuthorSnapshot {
            email: author.email.clone(),
            name: author.name.clone(),
            picture: author.picture.clone(),
        };
        let event = draft.into_event(snapshot);
        self.events.insert(&event).await?;
        Ok(event)
    }

    /// Publicly visible events, optionally narrowed to a category.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Event>, Error> {
        Ok(self.events.list(category).await?)
    }

    /// Register a push token for an event reminder.
    ///
    /// Deliberately unscoped: any caller may sign up, not just the author.
    /// Repeat registrations are no-ops.
    pub async fn add_notification_token(
        &self,
        id: &ListingId,
        token: &str,
    ) -> Result<(), Error> {
        if self.events.add_notification_token(id, token).await? {
            Ok(())
        } else {
            Err(Error::not_found("event not found"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::InMemoryEventRepository;
    use crate::domain::user::{ContactNumber, Email};
    use chrono::{Duration, Utc};

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

    fn draft() -> EventDraft {
        EventDraft {
            event_name: "Open mic".into(),
            event_description: "Bring an instrument".into(),
            event_date: Utc::now() + Duration::days(2),
            event_time: "18:00".into(),
            event_location: "Quad".into(),
            event_category: "music".into(),
        }
    }

    fn service() -> EventService {
        EventService::new(Arc::new(InMemoryEventRepository::new()))
    }

    #[tokio::test]
    async fn create_stamps_the_author_snapshot() {
        let service = service();
        let event = service.create(&claims("a@x.com"), draft()).await.expect("create");
        assert_eq!(event.author.email.as_ref(), "a@x.com");
        assert!(event.notifications.is_empty());
    }

    #[tokio::test]
    async fn anyone_may_register_for_reminders() {
        let service = service();
        let event = service.create(&claims("a@x.com"), draft()).await.expect("create");

        service
            .add_notification_token(&event.id, "mallory-device")
            .await
            .expect("register");

        let listed = service.list(None).await.expect("list");
        let stored = listed.first().expect("event");
        assert!(stored.notifications.contains("mallory-device"));
    }

    #[tokio::test]
    async fn registering_on_a_missing_event_is_not_found() {
        let service = service();
        let err = service
            .add_notification_token(&ListingId::random(), "device")
            .await
            .expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
