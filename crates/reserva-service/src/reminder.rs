//! Periodic reminder scheduler for upcoming confirmed bookings.
//!
//! An explicit background task with a start/stop lifecycle. Each tick scans
//! for confirmed bookings starting within the lead window whose reminder has
//! not been sent, claims each one by persisting `reminder_sent_at`, and only
//! then notifies. Claiming first makes the reminder idempotent across
//! concurrent instances and restarts; a claim that fails (already claimed,
//! or the booking was cancelled meanwhile) skips the notification.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::collaborator::Collaborators;
use crate::error::ServiceResult;
use crate::store::BookingStore;

pub struct ReminderScheduler {
    store: Arc<dyn BookingStore>,
    collaborators: Arc<Collaborators>,
    lead: TimeDelta,
    poll_interval: Duration,
}

/// Handle to a running scheduler; dropping it does not stop the task, call
/// [`ReminderHandle::stop`].
pub struct ReminderHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReminderHandle {
    /// Signals the scheduler to stop and waits for the task to finish.
    pub async fn stop(self) {
        // Send only fails when the task is already gone.
        let _ = self.shutdown.send(true);
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "Reminder scheduler task did not shut down cleanly");
        }
    }
}

impl ReminderScheduler {
    #[must_use]
    pub fn new(
        store: Arc<dyn BookingStore>,
        collaborators: Arc<Collaborators>,
        lead: TimeDelta,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            collaborators,
            lead,
            poll_interval,
        }
    }

    /// Spawns the polling loop and returns its handle.
    #[must_use]
    pub fn start(self) -> ReminderHandle {
        let (shutdown, mut rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            tracing::info!(interval = ?self.poll_interval, lead_hours = self.lead.num_hours(), "Reminder scheduler started");
            let mut ticker = tokio::time::interval(self.poll_interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = self.tick(Utc::now()).await {
                            tracing::error!(error = %err, "Reminder sweep failed");
                        }
                    }
                    _ = rx.changed() => {
                        tracing::info!("Reminder scheduler stopping");
                        break;
                    }
                }
            }
        });
        ReminderHandle { shutdown, task }
    }

    /// ## Summary
    /// One sweep: claim and notify every due reminder as of `now`.
    ///
    /// ## Errors
    /// Only the due-reminder query can fail the sweep; per-booking claim
    /// failures are logged and the sweep continues.
    pub async fn tick(&self, now: DateTime<Utc>) -> ServiceResult<usize> {
        let due = self.store.due_reminders(now, now + self.lead).await?;
        let mut sent = 0;
        for booking in due {
            match self.store.mark_reminder_sent(booking.id, now).await {
                Ok(Some(claimed)) => {
                    self.collaborators.notify_reminder(&claimed).await;
                    sent += 1;
                }
                // Another instance claimed it, or it is no longer confirmed.
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(booking_id = %booking.id, error = %err, "Failed to claim reminder");
                }
            }
        }
        if sent > 0 {
            tracing::info!(sent, "Booking reminders dispatched");
        }
        Ok(sent)
    }
}
