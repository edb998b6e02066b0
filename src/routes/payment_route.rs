use crate::models::reservation::Reservation;
use crate::services::payment_service::{
    CreateOrderRequest, PaymentOrder, PaymentService, VerifyPaymentRequest,
};
use crate::utils::error::AppError;
use crate::utils::jwt::AuthenticatedUser;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Create a payment order for a pending reservation
#[openapi(tag = "Payments")]
#[post("/payments/order", format = "json", data = "<request>")]
pub async fn create_payment_order(
    request: Json<CreateOrderRequest>,
    auth: AuthenticatedUser,
    payment_service: &State<PaymentService>,
) -> Result<Json<PaymentOrder>, AppError> {
    let order = payment_service
        .create_order(&auth.user_id, &auth.email, request.into_inner())
        .await?;
    Ok(Json(order))
}

/// Verify a gateway payment and confirm the reservation
#[openapi(tag = "Payments")]
#[post("/payments/verify", format = "json", data = "<request>")]
pub async fn verify_payment(
    request: Json<VerifyPaymentRequest>,
    auth: AuthenticatedUser,
    payment_service: &State<PaymentService>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = payment_service
        .confirm(&auth.user_id, request.into_inner())
        .await?;
    Ok(Json(reservation))
}
