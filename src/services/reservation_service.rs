//! Booking orchestrator and cancellation policy.
//!
//! Precondition checks run here against a snapshot for precise rejection
//! reasons; the store re-runs the occupancy checks inside its critical
//! section, so the committed decision is always the locked one.

use crate::models::reservation::{
    CancellationResponse, OccupancyStats, ReservationDetails, ReservationListResponse,
    ReservationRequest, ReservationStatus, ShowtimeReservationsResponse,
};
use crate::models::user::Role;
use crate::services::allocation;
use crate::services::notification_service::{self, NotificationKind, Notifier};
use crate::store::{NewReservation, ReservationStore};
use crate::utils::error::{AppError, AppResult};
use chrono::{Duration, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// Cancellation closes this long before the showtime starts.
pub const CANCELLATION_WINDOW_HOURS: i64 = 2;

/// Time-windowed admission for cancelling a reservation.
pub fn check_cancellation_window(starts_at: NaiveDateTime, now: NaiveDateTime) -> AppResult<()> {
    if starts_at <= now {
        return Err(AppError::ShowtimePassed);
    }
    if now > starts_at - Duration::hours(CANCELLATION_WINDOW_HOURS) {
        return Err(AppError::CancellationWindowClosed);
    }
    Ok(())
}

#[derive(Clone)]
pub struct ReservationService {
    store: Arc<dyn ReservationStore>,
    notifier: Arc<dyn Notifier>,
}

impl ReservationService {
    pub fn new(store: Arc<dyn ReservationStore>, notifier: Arc<dyn Notifier>) -> Self {
        ReservationService { store, notifier }
    }

    pub async fn book(
        &self,
        user_id: &str,
        request: ReservationRequest,
    ) -> AppResult<ReservationDetails> {
        allocation::validate_seat_request(&request.seats)?;

        let showtime = self
            .store
            .find_showtime(&request.showtime_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or(AppError::ShowtimeNotFound)?;

        if showtime.starts_at() <= Utc::now().naive_utc() {
            return Err(AppError::ShowtimeInPast);
        }

        // Snapshot check for a precise rejection; the store repeats it under
        // the showtime lock before committing.
        let occupied = self.store.occupied_seats(&request.showtime_id).await?;
        allocation::check_against_ledger(showtime.capacity, &occupied, &request.seats)?;

        if request.total_amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount);
        }

        let reservation = self
            .store
            .create_reservation(NewReservation {
                user_id: user_id.to_string(),
                showtime_id: request.showtime_id,
                seats: request.seats,
                total_amount: request.total_amount,
            })
            .await?;

        info!(
            reservation_id = %reservation.id,
            user_id,
            seats = ?reservation.seats,
            "reservation created"
        );

        let details = self
            .store
            .reservation_details(&reservation.id)
            .await?
            .ok_or_else(|| {
                AppError::DatabaseError("reservation missing after commit".to_string())
            })?;

        notification_service::dispatch(
            Arc::clone(&self.notifier),
            reservation.id.clone(),
            NotificationKind::BookingConfirmed,
        );

        Ok(details)
    }

    pub async fn get_reservation(
        &self,
        reservation_id: &str,
        caller_id: &str,
        caller_role: Role,
    ) -> AppResult<ReservationDetails> {
        match self.store.reservation_details(reservation_id).await? {
            Some(details)
                if caller_role == Role::Admin || details.reservation.user_id == caller_id =>
            {
                Ok(details)
            }
            // identical answer for "absent" and "not yours"
            _ => Err(AppError::NotFound(
                "Reservation not found or unauthorized".into(),
            )),
        }
    }

    pub async fn list_user_reservations(
        &self,
        user_id: &str,
    ) -> AppResult<ReservationListResponse> {
        let reservations = self.store.list_user_reservations(user_id).await?;
        Ok(ReservationListResponse {
            count: reservations.len(),
            reservations,
        })
    }

    pub async fn list_showtime_reservations(
        &self,
        showtime_id: &str,
    ) -> AppResult<ShowtimeReservationsResponse> {
        let showtime = self
            .store
            .find_showtime(showtime_id)
            .await?
            .ok_or(AppError::ShowtimeNotFound)?;
        let reservations = self.store.list_showtime_reservations(showtime_id).await?;
        let statistics = OccupancyStats::summarize(showtime.capacity, &reservations);
        Ok(ShowtimeReservationsResponse {
            showtime_id: showtime.id,
            statistics,
            count: reservations.len(),
            reservations,
        })
    }

    pub async fn cancel(
        &self,
        reservation_id: &str,
        caller_id: &str,
        caller_role: Role,
    ) -> AppResult<CancellationResponse> {
        let reservation = match self.store.find_reservation(reservation_id).await? {
            Some(r) if caller_role == Role::Admin || r.user_id == caller_id => r,
            // identical answer for "absent" and "not yours"
            _ => {
                return Err(AppError::NotFound(
                    "Reservation not found or unauthorized".into(),
                ))
            }
        };

        if reservation.status == ReservationStatus::Cancelled {
            return Err(AppError::AlreadyCancelled);
        }

        let showtime = self
            .store
            .find_showtime(&reservation.showtime_id)
            .await?
            .ok_or(AppError::ShowtimeNotFound)?;
        check_cancellation_window(showtime.starts_at(), Utc::now().naive_utc())?;

        let cancelled = self.store.cancel_reservation(reservation_id).await?;
        info!(reservation_id = %cancelled.id, caller_id, "reservation cancelled");

        Ok(CancellationResponse {
            reservation_id: cancelled.id,
            status: cancelled.status,
            payment_status: cancelled.payment_status,
            refund_info: "Refund will be processed within 3-5 business days".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, 12)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    #[test]
    fn cancellation_allowed_three_hours_before() {
        let now = start() - Duration::hours(3);
        assert!(check_cancellation_window(start(), now).is_ok());
    }

    #[test]
    fn cancellation_closed_one_hour_before() {
        let now = start() - Duration::hours(1);
        assert!(matches!(
            check_cancellation_window(start(), now),
            Err(AppError::CancellationWindowClosed)
        ));
    }

    #[test]
    fn cancellation_open_exactly_at_the_window_edge() {
        let now = start() - Duration::hours(CANCELLATION_WINDOW_HOURS);
        assert!(check_cancellation_window(start(), now).is_ok());
    }

    #[test]
    fn cancellation_rejected_once_showtime_started() {
        assert!(matches!(
            check_cancellation_window(start(), start()),
            Err(AppError::ShowtimePassed)
        ));
        let now = start() + Duration::minutes(30);
        assert!(matches!(
            check_cancellation_window(start(), now),
            Err(AppError::ShowtimePassed)
        ));
    }
}
