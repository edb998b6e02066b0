use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Theater {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTheaterRequest {
    pub name: String,
    pub address: String,
    pub city: String,
}
