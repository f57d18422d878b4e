use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::line_item::{subtotal, LineItem, ProposedLineItem, QuotationLine};
use super::money::{percentage, with_gst};
use super::present;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl TryFrom<String> for QuotationStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown quotation status: {}", other)),
        }
    }
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

/// Scalar fields of a quotation as written by callers.
#[derive(Debug, Clone, PartialEq, Deserialize, FromRow, Validate)]
pub struct QuotationHeader {
    #[validate(length(min = 1, max = 50, message = "quotation_id must be 1-50 characters"))]
    pub quotation_id: String,
    pub customer: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub gst_applied: bool,
    #[serde(default = "default_gst_rate")]
    #[validate(custom(function = "percentage"))]
    pub gst_rate: BigDecimal,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    #[sqlx(try_from = "String")]
    pub status: QuotationStatus,
}

fn default_gst_rate() -> BigDecimal {
    BigDecimal::from(18)
}

/// Body of `POST` and `PUT /api/quotations`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuotationInput {
    #[serde(flatten)]
    #[validate(nested)]
    pub header: QuotationHeader,
    #[validate(nested)]
    pub items: Vec<ProposedLineItem<QuotationLine>>,
}

/// Body of `PATCH /api/quotations/{id}`. Absent fields keep their value;
/// absent `items` leaves the lines untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuotationPatch {
    pub quotation_id: Option<String>,
    pub customer: Option<i64>,
    pub date: Option<NaiveDate>,
    pub gst_applied: Option<bool>,
    pub gst_rate: Option<BigDecimal>,
    /// `null` clears the notes.
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
    pub status: Option<QuotationStatus>,
    pub items: Option<Vec<ProposedLineItem<QuotationLine>>>,
}

impl QuotationPatch {
    /// Merge onto the stored header, returning the new header and items.
    pub fn apply(
        self,
        current: QuotationHeader,
    ) -> (QuotationHeader, Option<Vec<ProposedLineItem<QuotationLine>>>) {
        let header = QuotationHeader {
            quotation_id: self.quotation_id.unwrap_or(current.quotation_id),
            customer: self.customer.unwrap_or(current.customer),
            date: self.date.unwrap_or(current.date),
            gst_applied: self.gst_applied.unwrap_or(current.gst_applied),
            gst_rate: self.gst_rate.unwrap_or(current.gst_rate),
            notes: self.notes.unwrap_or(current.notes),
            status: self.status.unwrap_or(current.status),
        };
        (header, self.items)
    }
}

/// Quotation row joined with its customer's contact fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuotationRow {
    pub id: i64,
    pub quotation_id: String,
    pub customer: i64,
    pub date: NaiveDate,
    pub gst_applied: bool,
    pub gst_rate: BigDecimal,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_address: Option<String>,
    pub customer_mail: Option<String>,
    pub customer_gst: Option<String>,
    pub customer_phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuotationDetail {
    #[serde(flatten)]
    pub quotation: QuotationRow,
    pub items: Vec<LineItem<QuotationLine>>,
    pub total_amount: BigDecimal,
}

impl QuotationDetail {
    pub fn new(quotation: QuotationRow, items: Vec<LineItem<QuotationLine>>) -> Self {
        let total_amount = with_gst(&subtotal(&items), quotation.gst_applied, &quotation.gst_rate);
        Self {
            quotation,
            items,
            total_amount,
        }
    }
}
