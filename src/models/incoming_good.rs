use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::money::amount;

/// Goods received from a supplier, listed with the supplier's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IncomingGood {
    pub id: i64,
    pub supplier: i64,
    pub supplier_name: String,
    pub date: NaiveDate,
    pub item_name: String,
    pub quantity: String,
    pub price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IncomingGoodInput {
    pub supplier: i64,
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 255, message = "item_name must be 1-255 characters"))]
    pub item_name: String,
    /// Free text such as "50 kg" or "10 pcs".
    #[validate(length(min = 1, max = 100, message = "quantity must be 1-100 characters"))]
    pub quantity: String,
    #[validate(custom(function = "amount"))]
    pub price: BigDecimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn input(price: serde_json::Value) -> IncomingGoodInput {
        serde_json::from_value(json!({
            "supplier": 3,
            "date": "2024-04-12",
            "item_name": "Copper wire 22 SWG",
            "quantity": "50 kg",
            "price": price,
        }))
        .unwrap()
    }

    #[test]
    fn delivery_with_free_text_quantity_is_valid() {
        let good = input(json!("42500.00"));
        assert_eq!(good.quantity, "50 kg");
        assert_eq!(good.price, BigDecimal::from(42500));
        assert!(good.validate().is_ok());
    }

    #[test]
    fn price_must_fit_the_column() {
        assert!(input(json!("-1")).validate().is_err());
        assert!(input(json!("425.005")).validate().is_err());
        assert!(input(json!("1000000000")).validate().is_err());
    }

    #[test]
    fn empty_item_name_is_rejected() {
        let mut good = input(json!("10"));
        good.item_name = String::new();
        assert!(good.validate().unwrap_err().field_errors().contains_key("item_name"));
    }

    #[test]
    fn listing_carries_supplier_name() {
        let good = IncomingGood {
            id: 9,
            supplier: 3,
            supplier_name: "Sri Copper Wires".into(),
            date: NaiveDate::from_ymd_opt(2024, 4, 12).unwrap(),
            item_name: "Copper wire 22 SWG".into(),
            quantity: "50 kg".into(),
            price: BigDecimal::from_str("42500.00").unwrap(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&good).unwrap();
        assert_eq!(value["supplier"], 3);
        assert_eq!(value["supplier_name"], "Sri Copper Wires");
        assert_eq!(value["quantity"], "50 kg");
    }
}
