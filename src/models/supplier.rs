use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::blank_to_none;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub company_name: Option<String>,
    pub gstin: Option<String>,
    pub address: Option<String>,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SupplierInput {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    #[serde(default, deserialize_with = "blank_to_none")]
    #[validate(length(max = 255))]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "blank_to_none")]
    #[validate(length(max = 15))]
    pub gstin: Option<String>,
    #[serde(default, deserialize_with = "blank_to_none")]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 15, message = "phone_number must be 1-15 characters"))]
    pub phone_number: String,
}
