use crate::models::hall::{CreateHallRequest, Hall};
use crate::models::movie::{CreateMovieRequest, Movie};
use crate::models::showtime::{CreateShowtimeRequest, Showtime, ShowtimeListResponse};
use crate::models::theater::{CreateTheaterRequest, Theater};
use crate::services::catalog_service::CatalogService;
use crate::utils::error::AppError;
use crate::utils::jwt::AdminUser;
use rocket::serde::json::Json;
use rocket::serde::json::{json, Value};
use rocket::State;
use rocket_okapi::openapi;

/// Create a theater (admin)
#[openapi(tag = "Catalog")]
#[post("/theaters", format = "json", data = "<request>")]
pub async fn create_theater(
    request: Json<CreateTheaterRequest>,
    _admin: AdminUser,
    catalog_service: &State<CatalogService>,
) -> Result<Json<Theater>, AppError> {
    let theater = catalog_service.create_theater(request.into_inner()).await?;
    Ok(Json(theater))
}

/// Create a hall in a theater (admin)
#[openapi(tag = "Catalog")]
#[post("/halls", format = "json", data = "<request>")]
pub async fn create_hall(
    request: Json<CreateHallRequest>,
    _admin: AdminUser,
    catalog_service: &State<CatalogService>,
) -> Result<Json<Hall>, AppError> {
    let hall = catalog_service.create_hall(request.into_inner()).await?;
    Ok(Json(hall))
}

/// Create a movie (admin)
#[openapi(tag = "Catalog")]
#[post("/movies", format = "json", data = "<request>")]
pub async fn create_movie(
    request: Json<CreateMovieRequest>,
    _admin: AdminUser,
    catalog_service: &State<CatalogService>,
) -> Result<Json<Movie>, AppError> {
    let movie = catalog_service.create_movie(request.into_inner()).await?;
    Ok(Json(movie))
}

/// Schedule a showtime (admin)
#[openapi(tag = "Catalog")]
#[post("/showtimes", format = "json", data = "<request>")]
pub async fn create_showtime(
    request: Json<CreateShowtimeRequest>,
    _admin: AdminUser,
    catalog_service: &State<CatalogService>,
) -> Result<Json<Showtime>, AppError> {
    let showtime = catalog_service.create_showtime(request.into_inner()).await?;
    Ok(Json(showtime))
}

/// Active showtimes for a movie
#[openapi(tag = "Catalog")]
#[get("/movies/<movie_id>/showtimes")]
pub async fn get_movie_showtimes(
    movie_id: String,
    catalog_service: &State<CatalogService>,
) -> Result<Json<ShowtimeListResponse>, AppError> {
    let response = catalog_service.list_movie_showtimes(&movie_id).await?;
    Ok(Json(response))
}

/// Deactivate a showtime (admin); existing reservations stay on record
#[openapi(tag = "Catalog")]
#[patch("/showtimes/<showtime_id>/deactivate")]
pub async fn deactivate_showtime(
    showtime_id: String,
    _admin: AdminUser,
    catalog_service: &State<CatalogService>,
) -> Result<Json<Value>, AppError> {
    catalog_service.deactivate_showtime(&showtime_id).await?;
    Ok(Json(json!({ "showtime_id": showtime_id, "is_active": false })))
}
