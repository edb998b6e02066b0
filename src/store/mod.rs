//! The reservation ledger: the authority for which seats are taken.
//!
//! Policy (who may cancel, window checks, request validation) lives in the
//! services; the store owns status transitions and the atomic check-and-claim
//! step that upholds the seat-uniqueness and capacity invariants. Occupancy
//! is always recomputed from live claims, never read from a stored counter.

pub mod memory;
pub mod mysql;

pub use memory::InMemoryReservationStore;
pub use mysql::MySqlReservationStore;

use crate::models::reservation::{Reservation, ReservationDetails};
use crate::models::showtime::Showtime;
use crate::utils::error::AppResult;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// A reservation to be claimed atomically against a showtime.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: String,
    pub showtime_id: String,
    pub seats: Vec<String>,
    pub total_amount: Decimal,
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn find_showtime(&self, showtime_id: &str) -> AppResult<Option<Showtime>>;

    /// Union of seat labels across non-cancelled reservations for a showtime.
    async fn occupied_seats(&self, showtime_id: &str) -> AppResult<Vec<String>>;

    /// Atomic check-and-claim. Re-validates the showtime and occupancy inside
    /// the store's critical section for this showtime, then persists the
    /// reservation as `pending`/`pending`. Two concurrent conflicting calls
    /// yield exactly one success; the loser gets `SeatsAlreadyTaken` or
    /// `InsufficientCapacity`.
    async fn create_reservation(&self, new: NewReservation) -> AppResult<Reservation>;

    async fn find_reservation(&self, reservation_id: &str) -> AppResult<Option<Reservation>>;

    /// Reservation joined with its showtime/movie/hall/theater context.
    async fn reservation_details(
        &self,
        reservation_id: &str,
    ) -> AppResult<Option<ReservationDetails>>;

    /// The caller's reservations, newest first, with display context.
    async fn list_user_reservations(&self, user_id: &str)
        -> AppResult<Vec<ReservationDetails>>;

    /// All reservations against a showtime (any status), newest first.
    async fn list_showtime_reservations(&self, showtime_id: &str)
        -> AppResult<Vec<Reservation>>;

    /// status -> cancelled, payment status -> refunded, seat claims released,
    /// all in one transition. Fails with `AlreadyCancelled` if a concurrent
    /// cancel won the race.
    async fn cancel_reservation(&self, reservation_id: &str) -> AppResult<Reservation>;

    /// status pending -> confirmed, payment status -> paid. Fails with
    /// `Conflict` when the reservation is not awaiting payment.
    async fn confirm_reservation(&self, reservation_id: &str) -> AppResult<Reservation>;

    /// Confirmed, un-reminded reservations whose showtime starts in
    /// `[from, until]`.
    async fn reminders_due(
        &self,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> AppResult<Vec<Reservation>>;

    async fn mark_reminder_sent(&self, reservation_id: &str) -> AppResult<()>;
}
