//! MySQL-backed reservation ledger.
//!
//! The check-and-claim step runs in a transaction that locks the showtime row
//! (`SELECT ... FOR UPDATE`), which serializes writers per showtime without
//! serializing unrelated showtimes against each other. The unique index on
//! `seat_claims (showtime_id, seat_label)` backstops the same invariant at
//! commit time: if a conflicting insert slips past the lock, the violation is
//! converted into the same `SeatsAlreadyTaken` answer.

use crate::models::reservation::{
    PaymentStatus, Reservation, ReservationDetails, ReservationStatus, ShowtimeContext,
};
use crate::models::showtime::Showtime;
use crate::services::allocation;
use crate::store::{NewReservation, ReservationStore};
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::MySqlPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct MySqlReservationStore {
    pool: MySqlPool,
}

impl MySqlReservationStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlReservationStore { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    id: String,
    user_id: String,
    showtime_id: String,
    seats: Json<Vec<String>>,
    total_amount: Decimal,
    status: String,
    payment_status: String,
    reminder_sent: bool,
    created_at: NaiveDateTime,
}

impl ReservationRow {
    fn into_reservation(self) -> AppResult<Reservation> {
        let status = self
            .status
            .parse::<ReservationStatus>()
            .map_err(|_| AppError::DatabaseError(format!("corrupt status: {}", self.status)))?;
        let payment_status = self.payment_status.parse::<PaymentStatus>().map_err(|_| {
            AppError::DatabaseError(format!("corrupt payment status: {}", self.payment_status))
        })?;
        Ok(Reservation {
            id: self.id,
            user_id: self.user_id,
            showtime_id: self.showtime_id,
            seats: self.seats.0,
            total_amount: self.total_amount,
            status,
            payment_status,
            reminder_sent: self.reminder_sent,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DetailsRow {
    id: String,
    user_id: String,
    showtime_id: String,
    seats: Json<Vec<String>>,
    total_amount: Decimal,
    status: String,
    payment_status: String,
    reminder_sent: bool,
    created_at: NaiveDateTime,
    show_date: NaiveDate,
    show_time: NaiveTime,
    base_price: Decimal,
    movie_title: String,
    hall_name: String,
    theater_name: String,
}

impl DetailsRow {
    fn into_details(self) -> AppResult<ReservationDetails> {
        let showtime = ShowtimeContext {
            showtime_id: self.showtime_id.clone(),
            show_date: self.show_date,
            show_time: self.show_time,
            base_price: self.base_price,
            movie_title: self.movie_title,
            hall_name: self.hall_name,
            theater_name: self.theater_name,
        };
        let row = ReservationRow {
            id: self.id,
            user_id: self.user_id,
            showtime_id: self.showtime_id,
            seats: self.seats,
            total_amount: self.total_amount,
            status: self.status,
            payment_status: self.payment_status,
            reminder_sent: self.reminder_sent,
            created_at: self.created_at,
        };
        Ok(ReservationDetails {
            reservation: row.into_reservation()?,
            showtime,
        })
    }
}

const RESERVATION_COLUMNS: &str = "id, user_id, showtime_id, seats, total_amount, status, \
     payment_status, reminder_sent, created_at";

const DETAILS_QUERY: &str = "SELECT r.id, r.user_id, r.showtime_id, r.seats, r.total_amount, \
     r.status, r.payment_status, r.reminder_sent, r.created_at, \
     s.show_date, s.show_time, s.base_price, \
     m.title AS movie_title, h.name AS hall_name, t.name AS theater_name \
     FROM reservations r \
     JOIN showtimes s ON r.showtime_id = s.id \
     JOIN movies m ON s.movie_id = m.id \
     JOIN halls h ON s.hall_id = h.id \
     JOIN theaters t ON h.theater_id = t.id";

// A duplicate key on seat_claims means another writer committed this seat
// between our check and our insert.
fn claim_error(err: sqlx::Error, seat: &str) -> AppError {
    let unique_violation = err
        .as_database_error()
        .map_or(false, |db| db.is_unique_violation());
    if unique_violation {
        AppError::SeatsAlreadyTaken {
            seats: vec![seat.to_string()],
        }
    } else {
        err.into()
    }
}

#[async_trait]
impl ReservationStore for MySqlReservationStore {
    async fn find_showtime(&self, showtime_id: &str) -> AppResult<Option<Showtime>> {
        let showtime = sqlx::query_as::<_, Showtime>(
            "SELECT id, movie_id, hall_id, show_date, show_time, base_price, capacity, is_active \
             FROM showtimes WHERE id = ?",
        )
        .bind(showtime_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(showtime)
    }

    async fn occupied_seats(&self, showtime_id: &str) -> AppResult<Vec<String>> {
        let seats = sqlx::query_scalar::<_, String>(
            "SELECT seat_label FROM seat_claims WHERE showtime_id = ?",
        )
        .bind(showtime_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(seats)
    }

    async fn create_reservation(&self, new: NewReservation) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        // Lock the showtime row so concurrent claims on the same showtime
        // run one at a time.
        let showtime = sqlx::query_as::<_, Showtime>(
            "SELECT id, movie_id, hall_id, show_date, show_time, base_price, capacity, is_active \
             FROM showtimes WHERE id = ? AND is_active = TRUE FOR UPDATE",
        )
        .bind(&new.showtime_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::ShowtimeNotFound)?;

        let occupied = sqlx::query_scalar::<_, String>(
            "SELECT seat_label FROM seat_claims WHERE showtime_id = ?",
        )
        .bind(&new.showtime_id)
        .fetch_all(&mut *tx)
        .await?;

        allocation::check_against_ledger(showtime.capacity, &occupied, &new.seats)?;

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

        sqlx::query(
            "INSERT INTO reservations \
             (id, user_id, showtime_id, seats, total_amount, status, payment_status, \
              reminder_sent, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&reservation.id)
        .bind(&reservation.user_id)
        .bind(&reservation.showtime_id)
        .bind(Json(&reservation.seats))
        .bind(reservation.total_amount)
        .bind(reservation.status.to_string())
        .bind(reservation.payment_status.to_string())
        .bind(reservation.reminder_sent)
        .bind(reservation.created_at)
        .execute(&mut *tx)
        .await?;

        for seat in &reservation.seats {
            sqlx::query(
                "INSERT INTO seat_claims (showtime_id, seat_label, reservation_id) \
                 VALUES (?, ?, ?)",
            )
            .bind(&reservation.showtime_id)
            .bind(seat)
            .bind(&reservation.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| claim_error(e, seat))?;
        }

        tx.commit().await?;
        Ok(reservation)
    }

    async fn find_reservation(&self, reservation_id: &str) -> AppResult<Option<Reservation>> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {} FROM reservations WHERE id = ?",
            RESERVATION_COLUMNS
        ))
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(ReservationRow::into_reservation).transpose()
    }

    async fn reservation_details(
        &self,
        reservation_id: &str,
    ) -> AppResult<Option<ReservationDetails>> {
        let row = sqlx::query_as::<_, DetailsRow>(&format!("{} WHERE r.id = ?", DETAILS_QUERY))
            .bind(reservation_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(DetailsRow::into_details).transpose()
    }

    async fn list_user_reservations(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<ReservationDetails>> {
        let rows = sqlx::query_as::<_, DetailsRow>(&format!(
            "{} WHERE r.user_id = ? ORDER BY r.created_at DESC",
            DETAILS_QUERY
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(DetailsRow::into_details).collect()
    }

    async fn list_showtime_reservations(
        &self,
        showtime_id: &str,
    ) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {} FROM reservations WHERE showtime_id = ? ORDER BY created_at DESC",
            RESERVATION_COLUMNS
        ))
        .bind(showtime_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(ReservationRow::into_reservation)
            .collect()
    }

    async fn cancel_reservation(&self, reservation_id: &str) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {} FROM reservations WHERE id = ? FOR UPDATE",
            RESERVATION_COLUMNS
        ))
        .bind(reservation_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Reservation not found".into()))?;

        let mut reservation = row.into_reservation()?;
        if reservation.status == ReservationStatus::Cancelled {
            return Err(AppError::AlreadyCancelled);
        }

        reservation.status = ReservationStatus::Cancelled;
        reservation.payment_status = PaymentStatus::Refunded;

        sqlx::query("UPDATE reservations SET status = ?, payment_status = ? WHERE id = ?")
            .bind(reservation.status.to_string())
            .bind(reservation.payment_status.to_string())
            .bind(reservation_id)
            .execute(&mut *tx)
            .await?;

        // Releasing the claims is what makes the seats reservable again.
        sqlx::query("DELETE FROM seat_claims WHERE reservation_id = ?")
            .bind(reservation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(reservation)
    }

    async fn confirm_reservation(&self, reservation_id: &str) -> AppResult<Reservation> {
        let updated = sqlx::query(
            "UPDATE reservations SET status = ?, payment_status = ? \
             WHERE id = ? AND status = ?",
        )
        .bind(ReservationStatus::Confirmed.to_string())
        .bind(PaymentStatus::Paid.to_string())
        .bind(reservation_id)
        .bind(ReservationStatus::Pending.to_string())
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return match self.find_reservation(reservation_id).await? {
                Some(_) => Err(AppError::Conflict(
                    "Reservation is not awaiting payment".into(),
                )),
                None => Err(AppError::NotFound("Reservation not found".into())),
            };
        }

        self.find_reservation(reservation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reservation not found".into()))
    }

    async fn reminders_due(
        &self,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            "SELECT r.id, r.user_id, r.showtime_id, r.seats, r.total_amount, r.status, \
             r.payment_status, r.reminder_sent, r.created_at \
             FROM reservations r \
             JOIN showtimes s ON r.showtime_id = s.id \
             WHERE r.status = ? AND r.reminder_sent = FALSE \
             AND TIMESTAMP(s.show_date, s.show_time) BETWEEN ? AND ?",
        )
        .bind(ReservationStatus::Confirmed.to_string())
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(ReservationRow::into_reservation)
            .collect()
    }

    async fn mark_reminder_sent(&self, reservation_id: &str) -> AppResult<()> {
        sqlx::query("UPDATE reservations SET reminder_sent = TRUE WHERE id = ?")
            .bind(reservation_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
