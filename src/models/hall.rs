use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Hall {
    pub id: String,
    pub theater_id: String,
    pub name: String,
    pub format_type: String,
    pub total_seats: i32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHallRequest {
    pub theater_id: String,
    pub name: String,
    pub format_type: String,
    pub total_seats: i32,
}
