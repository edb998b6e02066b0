//! Notification collaborator: best-effort, asynchronous, failures logged.

use crate::utils::error::AppResult;
use async_trait::async_trait;
use std::sync::Arc;
use strum_macros::Display;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    BookingConfirmed,
    PaymentConfirmed,
    Reminder,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, reservation_id: &str, kind: NotificationKind) -> AppResult<()>;
}

/// Development notifier that writes notifications to the log stream instead
/// of sending email.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, reservation_id: &str, kind: NotificationKind) -> AppResult<()> {
        info!(%reservation_id, %kind, "notification dispatched");
        Ok(())
    }
}

/// Fire-and-forget dispatch. Runs outside any allocation transaction; a
/// delivery failure never fails the committed reservation.
pub fn dispatch(notifier: Arc<dyn Notifier>, reservation_id: String, kind: NotificationKind) {
    tokio::spawn(async move {
        if let Err(error) = notifier.notify(&reservation_id, kind).await {
            warn!(%reservation_id, %kind, %error, "notification delivery failed");
        }
    });
}
