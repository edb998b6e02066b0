//! In-memory reservation ledger for tests and development.
//!
//! A single `RwLock` over the ledger state serializes writers, which is what
//! makes the check-and-claim step atomic here; the MySQL store gets the same
//! guarantee from a per-showtime row lock plus the seat-claims unique index.

use crate::models::reservation::{
    PaymentStatus, Reservation, ReservationDetails, ReservationStatus, ShowtimeContext,
};
use crate::models::showtime::Showtime;
use crate::services::allocation;
use crate::store::{NewReservation, ReservationStore};
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Default)]
struct State {
    showtimes: HashMap<String, Showtime>,
    contexts: HashMap<String, ShowtimeContext>,
    reservations: HashMap<String, Reservation>,
    // showtime id -> seat label -> reservation id
    claims: HashMap<String, HashMap<String, String>>,
}

#[derive(Clone, Default)]
pub struct InMemoryReservationStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a showtime together with its display context.
    pub fn put_showtime(
        &self,
        showtime: Showtime,
        movie_title: &str,
        hall_name: &str,
        theater_name: &str,
    ) {
        let context = ShowtimeContext {
            showtime_id: showtime.id.clone(),
            show_date: showtime.show_date,
            show_time: showtime.show_time,
            base_price: showtime.base_price,
            movie_title: movie_title.to_string(),
            hall_name: hall_name.to_string(),
            theater_name: theater_name.to_string(),
        };
        let mut state = self.state.write().expect("RwLock poisoned");
        state.contexts.insert(showtime.id.clone(), context);
        state.showtimes.insert(showtime.id.clone(), showtime);
    }

    pub fn deactivate_showtime(&self, showtime_id: &str) {
        let mut state = self.state.write().expect("RwLock poisoned");
        if let Some(showtime) = state.showtimes.get_mut(showtime_id) {
            showtime.is_active = false;
        }
    }

    fn details_of(state: &State, reservation: &Reservation) -> Option<ReservationDetails> {
        state
            .contexts
            .get(&reservation.showtime_id)
            .map(|context| ReservationDetails {
                reservation: reservation.clone(),
                showtime: context.clone(),
            })
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn find_showtime(&self, showtime_id: &str) -> AppResult<Option<Showtime>> {
        let state = self.state.read().expect("RwLock poisoned");
        Ok(state.showtimes.get(showtime_id).cloned())
    }

    async fn occupied_seats(&self, showtime_id: &str) -> AppResult<Vec<String>> {
        let state = self.state.read().expect("RwLock poisoned");
        Ok(state
            .claims
            .get(showtime_id)
            .map(|claims| claims.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn create_reservation(&self, new: NewReservation) -> AppResult<Reservation> {
        let mut guard = self.state.write().expect("RwLock poisoned");
        let state = &mut *guard;

        let showtime = state
            .showtimes
            .get(&new.showtime_id)
            .filter(|s| s.is_active)
            .ok_or(AppError::ShowtimeNotFound)?;
        let capacity = showtime.capacity;

        let occupied: Vec<String> = state
            .claims
            .get(&new.showtime_id)
            .map(|claims| claims.keys().cloned().collect())
            .unwrap_or_default();
        allocation::check_against_ledger(capacity, &occupied, &new.seats)?;

        let reservation = Reservation {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            showtime_id: new.showtime_id,
            seats: new.seats,
            total_amount: new.total_amount,
            status: ReservationStatus::Pending,
            payment_status: PaymentStatus::Pending,
            reminder_sent: false,
            created_at: Utc::now().naive_utc(),
        };

        let claims = state
            .claims
            .entry(reservation.showtime_id.clone())
            .or_default();
        for seat in &reservation.seats {
            claims.insert(seat.clone(), reservation.id.clone());
        }
        state
            .reservations
            .insert(reservation.id.clone(), reservation.clone());

        Ok(reservation)
    }

    async fn find_reservation(&self, reservation_id: &str) -> AppResult<Option<Reservation>> {
        let state = self.state.read().expect("RwLock poisoned");
        Ok(state.reservations.get(reservation_id).cloned())
    }

    async fn reservation_details(
        &self,
        reservation_id: &str,
    ) -> AppResult<Option<ReservationDetails>> {
        let state = self.state.read().expect("RwLock poisoned");
        Ok(state
            .reservations
            .get(reservation_id)
            .and_then(|reservation| Self::details_of(&state, reservation)))
    }

    async fn list_user_reservations(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<ReservationDetails>> {
        let state = self.state.read().expect("RwLock poisoned");
        let mut details: Vec<ReservationDetails> = state
            .reservations
            .values()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| Self::details_of(&state, r))
            .collect();
        details.sort_by(|a, b| b.reservation.created_at.cmp(&a.reservation.created_at));
        Ok(details)
    }

    async fn list_showtime_reservations(
        &self,
        showtime_id: &str,
    ) -> AppResult<Vec<Reservation>> {
        let state = self.state.read().expect("RwLock poisoned");
        let mut reservations: Vec<Reservation> = state
            .reservations
            .values()
            .filter(|r| r.showtime_id == showtime_id)
            .cloned()
            .collect();
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reservations)
    }

    async fn cancel_reservation(&self, reservation_id: &str) -> AppResult<Reservation> {
        let mut guard = self.state.write().expect("RwLock poisoned");
        let state = &mut *guard;

        let reservation = state
            .reservations
            .get_mut(reservation_id)
            .ok_or_else(|| AppError::NotFound("Reservation not found".into()))?;
        if reservation.status == ReservationStatus::Cancelled {
            return Err(AppError::AlreadyCancelled);
        }
        reservation.status = ReservationStatus::Cancelled;
        reservation.payment_status = PaymentStatus::Refunded;
        let cancelled = reservation.clone();

        // Releasing the claims is what makes the seats reservable again.
        if let Some(claims) = state.claims.get_mut(&cancelled.showtime_id) {
            claims.retain(|_, holder| holder != reservation_id);
        }

        Ok(cancelled)
    }

    async fn confirm_reservation(&self, reservation_id: &str) -> AppResult<Reservation> {
        let mut state = self.state.write().expect("RwLock poisoned");
        let reservation = state
            .reservations
            .get_mut(reservation_id)
            .ok_or_else(|| AppError::NotFound("Reservation not found".into()))?;
        if reservation.status != ReservationStatus::Pending {
            return Err(AppError::Conflict(
                "Reservation is not awaiting payment".into(),
            ));
        }
        reservation.status = ReservationStatus::Confirmed;
        reservation.payment_status = PaymentStatus::Paid;
        Ok(reservation.clone())
    }

    async fn reminders_due(
        &self,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> AppResult<Vec<Reservation>> {
        let state = self.state.read().expect("RwLock poisoned");
        Ok(state
            .reservations
            .values()
            .filter(|r| r.status == ReservationStatus::Confirmed && !r.reminder_sent)
            .filter(|r| {
                state
                    .showtimes
                    .get(&r.showtime_id)
                    .map(|s| {
                        let starts_at = s.starts_at();
                        from <= starts_at && starts_at <= until
                    })
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn mark_reminder_sent(&self, reservation_id: &str) -> AppResult<()> {
        let mut state = self.state.write().expect("RwLock poisoned");
        if let Some(reservation) = state.reservations.get_mut(reservation_id) {
            reservation.reminder_sent = true;
        }
        Ok(())
    }
}
