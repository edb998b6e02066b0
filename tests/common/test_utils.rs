use async_trait::async_trait;
use chrono::{Duration, Utc};
use movie_reservation_system::models::showtime::Showtime;
use movie_reservation_system::services::notification_service::{NotificationKind, Notifier};
use movie_reservation_system::services::reservation_service::ReservationService;
use movie_reservation_system::store::InMemoryReservationStore;
use movie_reservation_system::utils::error::AppResult;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use test_context::AsyncTestContext;
use uuid::Uuid;

/// Notifier that records every dispatch instead of delivering anything.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, NotificationKind)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, NotificationKind)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, reservation_id: &str, kind: NotificationKind) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((reservation_id.to_string(), kind));
        Ok(())
    }
}

pub struct ReservationTestContext {
    pub store: Arc<InMemoryReservationStore>,
    pub service: ReservationService,
    pub notifier: Arc<RecordingNotifier>,
}

#[async_trait]
impl AsyncTestContext for ReservationTestContext {
    async fn setup() -> Self {
        let store = Arc::new(InMemoryReservationStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = ReservationService::new(store.clone(), notifier.clone());

        ReservationTestContext {
            store,
            service,
            notifier,
        }
    }

    async fn teardown(self) {}
}

/// Registers a showtime starting `starts_in` from now with a fixed catalog
/// context, returning it for use in requests.
pub fn seed_showtime(
    store: &InMemoryReservationStore,
    capacity: i32,
    starts_in: Duration,
) -> Showtime {
    let starts_at = Utc::now().naive_utc() + starts_in;
    let showtime = Showtime {
        id: Uuid::new_v4().to_string(),
        movie_id: Uuid::new_v4().to_string(),
        hall_id: Uuid::new_v4().to_string(),
        show_date: starts_at.date(),
        show_time: starts_at.time(),
        base_price: Decimal::from(150),
        capacity,
        is_active: true,
    };
    store.put_showtime(showtime.clone(), "Interstellar", "Hall 1", "Galaxy Cinemas");
    showtime
}

pub fn seats(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}
