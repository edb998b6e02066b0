use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::Request;
use rocket::Response;
use rocket_okapi::JsonSchema;
use serde::Serialize;
use serde_json::json;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug, Serialize, JsonSchema)]
pub enum AppError {
    #[error("Database error")]
    DatabaseError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid seat format: {}. Use format like A1, B5, etc.", .labels.join(", "))]
    InvalidSeatFormat { labels: Vec<String> },

    #[error("Total amount must be greater than 0")]
    InvalidAmount,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Showtime not found")]
    ShowtimeNotFound,

    #[error("Cannot book tickets for past or ongoing showtimes")]
    ShowtimeInPast,

    #[error("Only {available} seats available, but {requested} requested")]
    InsufficientCapacity { available: i64, requested: usize },

    #[error("Some seats are already booked: {}", .seats.join(", "))]
    SeatsAlreadyTaken { seats: Vec<String> },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Reservation is already cancelled")]
    AlreadyCancelled,

    #[error("Cannot cancel past or ongoing reservations")]
    ShowtimePassed,

    #[error("Cannot cancel reservation less than 2 hours before showtime")]
    CancellationWindowClosed,

    #[error("Payment gateway error: {0}")]
    Gateway(String),
}

// Convert sqlx::Error (database error) to AppError::DatabaseError
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

// Define a type alias for the result type
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> Status {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidSeatFormat { .. }
            | AppError::InvalidAmount
            | AppError::ShowtimeInPast
            | AppError::InsufficientCapacity { .. }
            | AppError::AlreadyCancelled
            | AppError::ShowtimePassed
            | AppError::CancellationWindowClosed => Status::BadRequest,
            AppError::AuthError(_) => Status::Unauthorized,
            AppError::Forbidden(_) => Status::Forbidden,
            AppError::NotFound(_) | AppError::ShowtimeNotFound => Status::NotFound,
            AppError::SeatsAlreadyTaken { .. } | AppError::Conflict(_) => Status::Conflict,
            AppError::Gateway(_) => Status::BadGateway,
            AppError::DatabaseError(_) => Status::InternalServerError,
        }
    }

    // Response body; storage errors are not leaked beyond a generic phrase.
    fn body(&self) -> serde_json::Value {
        match self {
            AppError::DatabaseError(_) => json!({
                "error": "Unable to process request. Please try again later."
            }),
            AppError::InvalidSeatFormat { labels } => json!({
                "error": self.to_string(),
                "invalid_seats": labels,
            }),
            AppError::InsufficientCapacity {
                available,
                requested,
            } => json!({
                "error": self.to_string(),
                "available_seats": available,
                "requested_seats": requested,
            }),
            AppError::SeatsAlreadyTaken { seats } => json!({
                "error": self.to_string(),
                "unavailable_seats": seats,
            }),
            _ => json!({ "error": self.to_string() }),
        }
    }
}

// Implement the Responder trait for AppError
// Format all error from route level to a Http Response at route level
#[rocket::async_trait]
impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        let status = self.status();
        let json = self.body();

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(None, Cursor::new(json.to_string()))
            .ok()
    }
}
