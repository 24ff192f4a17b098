//! Logging-only notifier, used when no webhook endpoint is configured.

use async_trait::async_trait;

use reserva_db::model::booking::Booking;

use super::{Notifier, SyncResult};

pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_confirmed(&self, booking: &Booking) -> SyncResult<()> {
        tracing::info!(booking_id = %booking.id, start = %booking.start_time, "Booking confirmed");
        Ok(())
    }

    async fn notify_cancelled(&self, booking: &Booking) -> SyncResult<()> {
        tracing::info!(booking_id = %booking.id, reason = ?booking.cancellation_reason, "Booking cancelled");
        Ok(())
    }

    async fn notify_reminder(&self, booking: &Booking) -> SyncResult<()> {
        tracing::info!(booking_id = %booking.id, start = %booking.start_time, "Booking reminder");
        Ok(())
    }
}
