//! Showtime reminder sweep.
//!
//! An explicit tick-driven background task rather than piggybacking on
//! request handling: every tick it asks the ledger for confirmed,
//! un-reminded reservations starting within the reminder window.

use crate::services::notification_service::{NotificationKind, Notifier};
use crate::store::ReservationStore;
use crate::utils::error::AppResult;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Reminders go out when the showtime starts within this many hours.
pub const REMINDER_WINDOW_HOURS: i64 = 2;

pub struct SchedulerService {
    store: Arc<dyn ReservationStore>,
    notifier: Arc<dyn Notifier>,
    interval: std::time::Duration,
}

impl SchedulerService {
    pub fn new(
        store: Arc<dyn ReservationStore>,
        notifier: Arc<dyn Notifier>,
        interval: std::time::Duration,
    ) -> Self {
        SchedulerService {
            store,
            notifier,
            interval,
        }
    }

    /// Spawns the periodic sweep. Errors are logged and the loop continues.
    pub fn start(self) -> JoinHandle<()> {
        info!(interval_secs = self.interval.as_secs(), "reminder scheduler started");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                match self.run_once().await {
                    Ok(sent) if sent > 0 => info!(sent, "showtime reminders sent"),
                    Ok(_) => {}
                    Err(error) => error!(%error, "reminder sweep failed"),
                }
            }
        })
    }

    /// One sweep; also usable as a manual trigger.
    pub async fn run_once(&self) -> AppResult<usize> {
        let now = Utc::now().naive_utc();
        let until = now + Duration::hours(REMINDER_WINDOW_HOURS);
        let due = self.store.reminders_due(now, until).await?;

        let mut sent = 0;
        for reservation in due {
            match self
                .notifier
                .notify(&reservation.id, NotificationKind::Reminder)
                .await
            {
                Ok(()) => {
                    self.store.mark_reminder_sent(&reservation.id).await?;
                    sent += 1;
                }
                Err(error) => {
                    warn!(reservation_id = %reservation.id, %error, "reminder delivery failed")
                }
            }
        }
        Ok(sent)
    }
}
