use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::blank_to_none;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    pub gstin: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Writable customer fields. Blank optional strings are stored as NULL so
/// the unique columns accept any number of customers without them.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 15, message = "phone_number must be 1-15 characters"))]
    pub phone_number: String,
    #[serde(default, deserialize_with = "blank_to_none")]
    #[validate(length(max = 15, message = "gstin cannot exceed 15 characters"))]
    pub gstin: Option<String>,
    #[serde(default, deserialize_with = "blank_to_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "blank_to_none")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "blank_to_none")]
    #[validate(length(max = 255, message = "company_name cannot exceed 255 characters"))]
    pub company_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_optionals_become_none() {
        let input: CustomerInput = serde_json::from_value(json!({
            "name": "Ravi Electricals",
            "phone_number": "9876543210",
            "gstin": "",
            "email": "  ",
        }))
        .unwrap();
        assert!(input.gstin.is_none());
        assert!(input.email.is_none());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn invalid_email_is_rejected() {
        let input: CustomerInput = serde_json::from_value(json!({
            "name": "Ravi",
            "phone_number": "98765",
            "email": "not-an-address",
        }))
        .unwrap();
        assert!(input.validate().unwrap_err().field_errors().contains_key("email"));
    }

    #[test]
    fn long_phone_number_is_rejected() {
        let input: CustomerInput = serde_json::from_value(json!({
            "name": "Ravi",
            "phone_number": "+91 98765 43210 99",
        }))
        .unwrap();
        assert!(input.validate().is_err());
    }
}
