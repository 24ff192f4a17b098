//! Webhook notifier: POSTs booking events as JSON to a configured endpoint.

use async_trait::async_trait;
use serde_json::json;

use reserva_db::model::booking::Booking;

use super::{ExternalSyncError, Notifier, SyncResult};

pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    async fn post(&self, event: &str, booking: &Booking) -> SyncResult<()> {
        let payload = json!({
            "event": event,
            "booking_id": booking.id,
            "offering_id": booking.offering_id,
            "provider_id": booking.provider_id,
            "requester_id": booking.requester_id,
            "start_time": booking.start_time,
            "end_time": booking.end_time,
            "status": booking.status,
        });

        let response = self.client.post(&self.url).json(&payload).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ExternalSyncError::Rejected(format!(
                "webhook returned {}",
                response.status()
            )))
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify_confirmed(&self, booking: &Booking) -> SyncResult<()> {
        self.post("booking.confirmed", booking).await
    }

    async fn notify_cancelled(&self, booking: &Booking) -> SyncResult<()> {
        self.post("booking.cancelled", booking).await
    }

    async fn notify_reminder(&self, booking: &Booking) -> SyncResult<()> {
        self.post("booking.reminder", booking).await
    }
}
