use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub genre: String,
    pub duration_minutes: i32,
    pub certification: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateMovieRequest {
    pub title: String,
    pub genre: String,
    pub duration_minutes: i32,
    pub certification: String,
}
