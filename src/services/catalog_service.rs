//! Catalog administration: theaters, halls, movies, showtimes.
//!
//! Thin CRUD over the pool. The reservation core only ever reads showtimes;
//! a showtime with reservations against it is deactivated, never deleted.

use crate::models::hall::{CreateHallRequest, Hall};
use crate::models::movie::{CreateMovieRequest, Movie};
use crate::models::showtime::{CreateShowtimeRequest, Showtime, ShowtimeListResponse};
use crate::models::theater::{CreateTheaterRequest, Theater};
use crate::utils::error::{AppError, AppResult};
use sqlx::MySqlPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct CatalogService {
    pool: MySqlPool,
}

impl CatalogService {
    pub fn new(pool: MySqlPool) -> Self {
        CatalogService { pool }
    }

    pub async fn create_theater(&self, request: CreateTheaterRequest) -> AppResult<Theater> {
        let theater = Theater {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            address: request.address,
            city: request.city,
        };
        sqlx::query("INSERT INTO theaters (id, name, address, city) VALUES (?, ?, ?, ?)")
            .bind(&theater.id)
            .bind(&theater.name)
            .bind(&theater.address)
            .bind(&theater.city)
            .execute(&self.pool)
            .await?;
        Ok(theater)
    }

    pub async fn create_hall(&self, request: CreateHallRequest) -> AppResult<Hall> {
        if request.total_seats <= 0 {
            return Err(AppError::ValidationError(
                "Hall must have at least one seat".into(),
            ));
        }

        let theater = sqlx::query("SELECT id FROM theaters WHERE id = ?")
            .bind(&request.theater_id)
            .fetch_optional(&self.pool)
            .await?;
        if theater.is_none() {
            return Err(AppError::NotFound("Theater not found".into()));
        }

        let hall = Hall {
            id: Uuid::new_v4().to_string(),
            theater_id: request.theater_id,
            name: request.name,
            format_type: request.format_type,
            total_seats: request.total_seats,
        };
        sqlx::query(
            "INSERT INTO halls (id, theater_id, name, format_type, total_seats) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&hall.id)
        .bind(&hall.theater_id)
        .bind(&hall.name)
        .bind(&hall.format_type)
        .bind(hall.total_seats)
        .execute(&self.pool)
        .await?;
        Ok(hall)
    }

    pub async fn create_movie(&self, request: CreateMovieRequest) -> AppResult<Movie> {
        if request.duration_minutes <= 0 {
            return Err(AppError::ValidationError(
                "Duration must be greater than zero".into(),
            ));
        }

        let movie = Movie {
            id: Uuid::new_v4().to_string(),
            title: request.title,
            genre: request.genre,
            duration_minutes: request.duration_minutes,
            certification: request.certification,
        };
        sqlx::query(
            "INSERT INTO movies (id, title, genre, duration_minutes, certification) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&movie.id)
        .bind(&movie.title)
        .bind(&movie.genre)
        .bind(movie.duration_minutes)
        .bind(&movie.certification)
        .execute(&self.pool)
        .await?;
        Ok(movie)
    }

    /// Creates a showtime; its capacity is taken from the hall's seat count.
    pub async fn create_showtime(&self, request: CreateShowtimeRequest) -> AppResult<Showtime> {
        let movie = sqlx::query("SELECT id FROM movies WHERE id = ?")
            .bind(&request.movie_id)
            .fetch_optional(&self.pool)
            .await?;
        if movie.is_none() {
            return Err(AppError::NotFound("Movie not found".into()));
        }

        let hall = sqlx::query_as::<_, Hall>(
            "SELECT id, theater_id, name, format_type, total_seats FROM halls WHERE id = ?",
        )
        .bind(&request.hall_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Hall not found".into()))?;

        let showtime = Showtime {
            id: Uuid::new_v4().to_string(),
            movie_id: request.movie_id,
            hall_id: request.hall_id,
            show_date: request.show_date,
            show_time: request.show_time,
            base_price: request.base_price,
            capacity: hall.total_seats,
            is_active: true,
        };
        sqlx::query(
            "INSERT INTO showtimes \
             (id, movie_id, hall_id, show_date, show_time, base_price, capacity, is_active) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&showtime.id)
        .bind(&showtime.movie_id)
        .bind(&showtime.hall_id)
        .bind(showtime.show_date)
        .bind(showtime.show_time)
        .bind(showtime.base_price)
        .bind(showtime.capacity)
        .bind(showtime.is_active)
        .execute(&self.pool)
        .await?;
        Ok(showtime)
    }

    pub async fn list_movie_showtimes(&self, movie_id: &str) -> AppResult<ShowtimeListResponse> {
        let movie = sqlx::query("SELECT id FROM movies WHERE id = ?")
            .bind(movie_id)
            .fetch_optional(&self.pool)
            .await?;
        if movie.is_none() {
            return Err(AppError::NotFound("Movie not found".into()));
        }

        let showtimes = sqlx::query_as::<_, Showtime>(
            "SELECT id, movie_id, hall_id, show_date, show_time, base_price, capacity, is_active \
             FROM showtimes WHERE movie_id = ? AND is_active = TRUE \
             ORDER BY show_date ASC, show_time ASC",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ShowtimeListResponse {
            movie_id: movie_id.to_string(),
            count: showtimes.len(),
            showtimes,
        })
    }

    /// Showtimes are never hard-deleted once reservations may exist.
    pub async fn deactivate_showtime(&self, showtime_id: &str) -> AppResult<()> {
        let updated = sqlx::query("UPDATE showtimes SET is_active = FALSE WHERE id = ?")
            .bind(showtime_id)
            .execute(&self.pool)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::ShowtimeNotFound);
        }
        Ok(())
    }
}
