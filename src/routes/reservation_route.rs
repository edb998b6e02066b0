use crate::models::reservation::{
    CancellationResponse, ReservationDetails, ReservationListResponse, ReservationRequest,
    ShowtimeReservationsResponse,
};
use crate::services::reservation_service::ReservationService;
use crate::utils::error::AppError;
use crate::utils::jwt::{AdminUser, AuthenticatedUser};
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Book seats for a showtime
#[openapi(tag = "Reservations")]
#[post("/reservations", format = "json", data = "<request>")]
pub async fn create_reservation(
    request: Json<ReservationRequest>,
    auth: AuthenticatedUser,
    reservation_service: &State<ReservationService>,
) -> Result<Json<ReservationDetails>, AppError> {
    let details = reservation_service
        .book(&auth.user_id, request.into_inner())
        .await?;
    Ok(Json(details))
}

/// The caller's reservations, newest first
#[openapi(tag = "Reservations")]
#[get("/reservations")]
pub async fn get_my_reservations(
    auth: AuthenticatedUser,
    reservation_service: &State<ReservationService>,
) -> Result<Json<ReservationListResponse>, AppError> {
    let response = reservation_service
        .list_user_reservations(&auth.user_id)
        .await?;
    Ok(Json(response))
}

/// A single reservation with showtime context
#[openapi(tag = "Reservations")]
#[get("/reservations/<reservation_id>")]
pub async fn get_reservation(
    reservation_id: String,
    auth: AuthenticatedUser,
    reservation_service: &State<ReservationService>,
) -> Result<Json<ReservationDetails>, AppError> {
    let details = reservation_service
        .get_reservation(&reservation_id, &auth.user_id, auth.role)
        .await?;
    Ok(Json(details))
}

/// Cancel a reservation within the allowed window
#[openapi(tag = "Reservations")]
#[patch("/reservations/<reservation_id>/cancel")]
pub async fn cancel_reservation(
    reservation_id: String,
    auth: AuthenticatedUser,
    reservation_service: &State<ReservationService>,
) -> Result<Json<CancellationResponse>, AppError> {
    let response = reservation_service
        .cancel(&reservation_id, &auth.user_id, auth.role)
        .await?;
    Ok(Json(response))
}

/// All reservations against a showtime, with seat statistics (admin)
#[openapi(tag = "Reservations")]
#[get("/showtimes/<showtime_id>/reservations")]
pub async fn get_showtime_reservations(
    showtime_id: String,
    _admin: AdminUser,
    reservation_service: &State<ReservationService>,
) -> Result<Json<ShowtimeReservationsResponse>, AppError> {
    let response = reservation_service
        .list_showtime_reservations(&showtime_id)
        .await?;
    Ok(Json(response))
}
