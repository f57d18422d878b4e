use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::line_item::{InvoiceLine, LineItem, ProposedLineItem};
use super::money::{amount, percentage};
use super::present;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl TryFrom<String> for InvoiceStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            other => Err(format!("unknown invoice status: {}", other)),
        }
    }
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, FromRow, Validate)]
pub struct InvoiceHeader {
    #[validate(length(min = 1, max = 50, message = "invoice_id must be 1-50 characters"))]
    pub invoice_id: String,
    pub customer: i64,
    pub date: NaiveDate,
    #[serde(default)]
    #[sqlx(try_from = "String")]
    pub status: InvoiceStatus,
    /// Amount billed, as computed by the client including GST.
    #[validate(custom(function = "amount"))]
    pub final_amount: BigDecimal,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub gst_applied: bool,
    #[serde(default)]
    #[validate(custom(function = "percentage"))]
    pub gst_rate: BigDecimal,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InvoiceInput {
    #[serde(flatten)]
    #[validate(nested)]
    pub header: InvoiceHeader,
    #[validate(nested)]
    pub items: Vec<ProposedLineItem<InvoiceLine>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoicePatch {
    pub invoice_id: Option<String>,
    pub customer: Option<i64>,
    pub date: Option<NaiveDate>,
    pub status: Option<InvoiceStatus>,
    pub final_amount: Option<BigDecimal>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
    pub gst_applied: Option<bool>,
    pub gst_rate: Option<BigDecimal>,
    pub items: Option<Vec<ProposedLineItem<InvoiceLine>>>,
}

impl InvoicePatch {
    pub fn apply(
        self,
        current: InvoiceHeader,
    ) -> (InvoiceHeader, Option<Vec<ProposedLineItem<InvoiceLine>>>) {
        let header = InvoiceHeader {
            invoice_id: self.invoice_id.unwrap_or(current.invoice_id),
            customer: self.customer.unwrap_or(current.customer),
            date: self.date.unwrap_or(current.date),
            status: self.status.unwrap_or(current.status),
            final_amount: self.final_amount.unwrap_or(current.final_amount),
            notes: self.notes.unwrap_or(current.notes),
            gst_applied: self.gst_applied.unwrap_or(current.gst_applied),
            gst_rate: self.gst_rate.unwrap_or(current.gst_rate),
        };
        (header, self.items)
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InvoiceRow {
    pub id: i64,
    pub invoice_id: String,
    pub customer: i64,
    pub date: NaiveDate,
    pub status: String,
    pub final_amount: BigDecimal,
    pub notes: Option<String>,
    pub gst_applied: bool,
    pub gst_rate: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_address: Option<String>,
    pub customer_email: Option<String>,
    pub customer_gst: Option<String>,
    pub customer_phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: InvoiceRow,
    pub items: Vec<LineItem<InvoiceLine>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gst_rate_defaults_to_zero_for_invoices() {
        let input: InvoiceInput = serde_json::from_value(json!({
            "invoice_id": "INV-001",
            "customer": 1,
            "date": "2024-06-01",
            "final_amount": "590.00",
            "items": [
                {"sl_no": 1, "description": "rewind", "quantity": 2, "rate": "250", "price": "500"},
            ],
        }))
        .unwrap();
        assert_eq!(input.header.gst_rate, BigDecimal::from(0));
        assert_eq!(input.header.status, InvoiceStatus::Pending);
        assert_eq!(input.items[0].fields.quantity, 2);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn negative_final_amount_is_invalid() {
        let input: InvoiceInput = serde_json::from_value(json!({
            "invoice_id": "INV-002",
            "customer": 1,
            "date": "2024-06-01",
            "final_amount": "-1",
            "items": [],
        }))
        .unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn missing_items_fails_to_parse() {
        let parsed: Result<InvoiceInput, _> = serde_json::from_value(json!({
            "invoice_id": "INV-003",
            "customer": 1,
            "date": "2024-06-01",
            "final_amount": "0",
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn patch_replaces_items_only_when_given() {
        let current = InvoiceHeader {
            invoice_id: "INV-004".into(),
            customer: 1,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            status: InvoiceStatus::Pending,
            final_amount: BigDecimal::from(100),
            notes: None,
            gst_applied: false,
            gst_rate: BigDecimal::from(0),
        };
        let patch: InvoicePatch = serde_json::from_value(json!({"status": "paid", "items": []})).unwrap();
        let (header, items) = patch.apply(current);
        assert_eq!(header.status, InvoiceStatus::Paid);
        assert_eq!(header.final_amount, BigDecimal::from(100));
        assert_eq!(items.map(|i| i.len()), Some(0));
    }

    #[test]
    fn patch_null_clears_notes() {
        let current = InvoiceHeader {
            invoice_id: "INV-005".into(),
            customer: 1,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            status: InvoiceStatus::Pending,
            final_amount: BigDecimal::from(100),
            notes: Some("due in 30 days".into()),
            gst_applied: false,
            gst_rate: BigDecimal::from(0),
        };

        let patch: InvoicePatch = serde_json::from_value(json!({"status": "overdue"})).unwrap();
        assert_eq!(patch.apply(current.clone()).0.notes.as_deref(), Some("due in 30 days"));

        let patch: InvoicePatch = serde_json::from_value(json!({"notes": null})).unwrap();
        assert_eq!(patch.apply(current).0.notes, None);
    }

    #[test]
    fn amounts_beyond_the_column_are_invalid() {
        let input: InvoiceInput = serde_json::from_value(json!({
            "invoice_id": "INV-006",
            "customer": 1,
            "date": "2024-06-01",
            "final_amount": "590.001",
            "items": [
                {"sl_no": 1, "description": "rewind", "rate": "1000000000", "price": "500"},
            ],
        }))
        .unwrap();
        let errors = input.validate().unwrap_err();
        assert!(!errors.is_empty());
    }
}
