//! A notifier that records every event it receives.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use reserva_db::model::booking::Booking;
use reserva_service::collaborator::{Notifier, SyncResult};

#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(String, uuid::Uuid)>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(String, uuid::Uuid)>> {
        match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// All `(event, booking_id)` pairs seen so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<(String, uuid::Uuid)> {
        self.lock().clone()
    }

    /// Events of one kind.
    #[must_use]
    pub fn events_named(&self, name: &str) -> Vec<uuid::Uuid> {
        self.lock()
            .iter()
            .filter(|(event, _)| event == name)
            .map(|(_, id)| *id)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_confirmed(&self, booking: &Booking) -> SyncResult<()> {
        self.lock().push(("confirmed".to_string(), booking.id));
        Ok(())
    }

    async fn notify_cancelled(&self, booking: &Booking) -> SyncResult<()> {
        self.lock().push(("cancelled".to_string(), booking.id));
        Ok(())
    }

    async fn notify_reminder(&self, booking: &Booking) -> SyncResult<()> {
        self.lock().push(("reminder".to_string(), booking.id));
        Ok(())
    }
}
