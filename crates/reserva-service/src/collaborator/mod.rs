//! External collaborator ports: notifications, calendar sync, meetings.
//!
//! Collaborator failures are absorbed here. Every call is best-effort and
//! time-bounded; a slow or failing collaborator is logged and never turns a
//! committed booking transition into an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use reserva_db::model::booking::Booking;

pub mod log;
pub mod webhook;

/// A notification/calendar/meeting collaborator failed. Always caught at the
/// boundary; never propagated as a failure of the transition itself.
#[derive(Error, Debug)]
pub enum ExternalSyncError {
    #[error("Collaborator request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Collaborator rejected the call: {0}")]
    Rejected(String),
}

pub type SyncResult<T> = std::result::Result<T, ExternalSyncError>;

/// Outbound booking notifications (email/webhook/etc. behind the port).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_confirmed(&self, booking: &Booking) -> SyncResult<()>;
    async fn notify_cancelled(&self, booking: &Booking) -> SyncResult<()>;
    async fn notify_reminder(&self, booking: &Booking) -> SyncResult<()>;
}

/// External calendar account sync. `create_event` hands back an opaque
/// reference the engine stores on the booking.
#[async_trait]
pub trait CalendarSync: Send + Sync {
    async fn create_event(&self, booking: &Booking) -> SyncResult<String>;
    async fn delete_event(&self, booking: &Booking, event_ref: &str) -> SyncResult<()>;
}

/// Video-conferencing meeting provisioning.
#[async_trait]
pub trait MeetingProvider: Send + Sync {
    async fn create_meeting(&self, booking: &Booking) -> SyncResult<String>;
    async fn delete_meeting(&self, booking: &Booking, meeting_ref: &str) -> SyncResult<()>;
}

/// The engine's view of all connected collaborators. Calendar and meeting
/// collaborators are optional: `None` means the provider has no external
/// account connected.
pub struct Collaborators {
    pub notifier: Arc<dyn Notifier>,
    pub calendar: Option<Arc<dyn CalendarSync>>,
    pub meeting: Option<Arc<dyn MeetingProvider>>,
    /// Upper bound on a single collaborator call.
    pub sync_timeout: Duration,
}

impl Collaborators {
    /// Logging-only collaborator set; the default when nothing is configured.
    #[must_use]
    pub fn log_only(sync_timeout: Duration) -> Self {
        Self {
            notifier: Arc::new(log::LogNotifier),
            calendar: None,
            meeting: None,
            sync_timeout,
        }
    }

    pub async fn notify_confirmed(&self, booking: &Booking) {
        self.absorb("notify_confirmed", booking, self.notifier.notify_confirmed(booking))
            .await;
    }

    pub async fn notify_cancelled(&self, booking: &Booking) {
        self.absorb("notify_cancelled", booking, self.notifier.notify_cancelled(booking))
            .await;
    }

    pub async fn notify_reminder(&self, booking: &Booking) {
        self.absorb("notify_reminder", booking, self.notifier.notify_reminder(booking))
            .await;
    }

    /// Creates the external calendar event, returning its reference.
    pub async fn create_event(&self, booking: &Booking) -> Option<String> {
        let calendar = self.calendar.as_ref()?;
        self.absorb("create_event", booking, calendar.create_event(booking))
            .await
    }

    pub async fn delete_event(&self, booking: &Booking) {
        if let Some(calendar) = self.calendar.as_ref()
            && let Some(event_ref) = booking.external_event_ref.as_deref()
        {
            self.absorb("delete_event", booking, calendar.delete_event(booking, event_ref))
                .await;
        }
    }

    /// Provisions the external meeting, returning its reference.
    pub async fn create_meeting(&self, booking: &Booking) -> Option<String> {
        let meeting = self.meeting.as_ref()?;
        self.absorb("create_meeting", booking, meeting.create_meeting(booking))
            .await
    }

    pub async fn delete_meeting(&self, booking: &Booking) {
        if let Some(meeting) = self.meeting.as_ref()
            && let Some(meeting_ref) = booking.external_meeting_ref.as_deref()
        {
            self.absorb(
                "delete_meeting",
                booking,
                meeting.delete_meeting(booking, meeting_ref),
            )
            .await;
        }
    }

    /// Runs one collaborator call under the timeout, logging any failure.
    async fn absorb<T>(
        &self,
        operation: &'static str,
        booking: &Booking,
        fut: impl std::future::Future<Output = SyncResult<T>> + Send,
    ) -> Option<T> {
        match tokio::time::timeout(self.sync_timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                tracing::warn!(booking_id = %booking.id, operation, error = %err, "Collaborator call failed");
                None
            }
            Err(_elapsed) => {
                tracing::warn!(booking_id = %booking.id, operation, timeout = ?self.sync_timeout, "Collaborator call timed out");
                None
            }
        }
    }
}
