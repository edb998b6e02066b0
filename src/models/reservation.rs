use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

/// A claim on a set of seats for one showtime by one user.
///
/// The seat set is immutable after creation; changing seats means
/// cancel-and-rebook.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Reservation {
    pub id: String,
    pub user_id: String,
    pub showtime_id: String,
    pub seats: Vec<String>,
    pub total_amount: Decimal,
    pub status: ReservationStatus,
    pub payment_status: PaymentStatus,
    pub reminder_sent: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReservationRequest {
    pub showtime_id: String,
    pub seats: Vec<String>,
    pub total_amount: Decimal,
}

/// Display context joined from the catalog for a reservation's showtime.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ShowtimeContext {
    pub showtime_id: String,
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub base_price: Decimal,
    pub movie_title: String,
    pub hall_name: String,
    pub theater_name: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ReservationDetails {
    pub reservation: Reservation,
    pub showtime: ShowtimeContext,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ReservationListResponse {
    pub count: usize,
    pub reservations: Vec<ReservationDetails>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CancellationResponse {
    pub reservation_id: String,
    pub status: ReservationStatus,
    pub payment_status: PaymentStatus,
    pub refund_info: String,
}

/// Seat-count breakdown for one showtime, derived from its live reservations.
#[derive(Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub struct OccupancyStats {
    pub total_seats: i32,
    pub reserved_seats: i64,
    pub confirmed_seats: i64,
    pub pending_seats: i64,
    pub available_seats: i64,
}

impl OccupancyStats {
    /// Folds the non-cancelled reservations of a showtime into seat counts.
    pub fn summarize(capacity: i32, reservations: &[Reservation]) -> Self {
        let mut confirmed = 0i64;
        let mut pending = 0i64;
        for reservation in reservations {
            let seats = reservation.seats.len() as i64;
            match reservation.status {
                ReservationStatus::Confirmed => confirmed += seats,
                ReservationStatus::Pending => pending += seats,
                ReservationStatus::Cancelled => {}
            }
        }
        let reserved = confirmed + pending;
        OccupancyStats {
            total_seats: capacity,
            reserved_seats: reserved,
            confirmed_seats: confirmed,
            pending_seats: pending,
            available_seats: capacity as i64 - reserved,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ShowtimeReservationsResponse {
    pub showtime_id: String,
    pub statistics: OccupancyStats,
    pub count: usize,
    pub reservations: Vec<Reservation>,
}
