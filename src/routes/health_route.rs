use crate::utils::error::AppError;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use schemars::JsonSchema;
use serde::Serialize;
use sqlx::MySqlPool;

#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

/// Liveness plus a database round trip
#[openapi(tag = "Health")]
#[get("/health")]
pub async fn health(pool: &State<MySqlPool>) -> Result<Json<HealthResponse>, AppError> {
    let database = match sqlx::query("SELECT 1").execute(pool.inner()).await {
        Ok(_) => "up".to_string(),
        Err(_) => "down".to_string(),
    };
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        database,
    }))
}
