use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Showtime {
    pub id: String,
    pub movie_id: String,
    pub hall_id: String,
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub base_price: Decimal,
    /// Configured seating capacity of the hall for this screening. Never
    /// decremented; occupancy is derived by scanning active reservations.
    pub capacity: i32,
    pub is_active: bool,
}

impl Showtime {
    /// Scheduled start as a single point in time.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.show_date.and_time(self.show_time)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateShowtimeRequest {
    pub movie_id: String,
    pub hall_id: String,
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub base_price: Decimal,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ShowtimeListResponse {
    pub movie_id: String,
    pub count: usize,
    pub showtimes: Vec<Showtime>,
}
