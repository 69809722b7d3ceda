//! Periodic event reminder scan.
//!
//! Once a minute, find events starting roughly an hour from now and notify
//! the devices registered on them. The window is one minute wide and aligned
//! to the scan period, so each event is reminded about once.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::ports::{EventRepository, ListingStoreError, PushGateway};

const SCAN_PERIOD: std::time::Duration = std::time::Duration::from_secs(60);

/// Run the reminder loop until the process exits.
pub fn spawn(events: Arc<dyn EventRepository>, push: Arc<dyn PushGateway>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SCAN_PERIOD);
        loop {
            ticker.tick().await;
            match scan_once(events.as_ref(), push.as_ref(), Utc::now()).await {
                Ok(0) => {}
                Ok(sent) => info!(reminders = sent, "event reminders dispatched"),
                Err(err) => warn!(error = %err, "reminder scan failed"),
            }
        }
    })
}

/// Scan a single window anchored at `now`, returning how many events were
/// reminded. Push failures are logged per event and never abort the scan.
pub async fn scan_once(
    events: &dyn EventRepository,
    push: &dyn PushGateway,
    now: DateTime<Utc>,
) -> Result<usize, ListingStoreError> {
    let from = now + Duration::minutes(59);
    let to = now + Duration::minutes(60);
    let upcoming = events.starting_between(from, to).await?;

    let mut sent = 0;
    for event in upcoming {
        if event.notifications.is_empty() {
            continue;
        }
        let tokens: Vec<String> = event.notifications.iter().cloned().collect();
        let body = format!("Event \"{}\" is starting soon!", event.event_name);
        match push.notify(&tokens, "Event Reminder", &body).await {
            Ok(()) => sent += 1,
            Err(err) => {
                warn!(error = %err, event = %event.id, "reminder dispatch failed");
            }
        }
    }
    Ok(sent)
}
