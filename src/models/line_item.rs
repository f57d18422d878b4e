use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use validator::{Validate, ValidationErrors};

use super::money::amount;

/// A persisted child row of a quotation or invoice.
///
/// `id` and `parent_id` never change after insertion; only `fields` is
/// replaced on update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem<F> {
    pub id: i64,
    #[serde(skip)]
    pub parent_id: i64,
    #[serde(flatten)]
    pub fields: F,
}

/// Rows carry `id`, `parent_id` and the columns of `F`.
impl<'r, F> FromRow<'r, PgRow> for LineItem<F>
where
    F: FromRow<'r, PgRow>,
{
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            parent_id: row.try_get("parent_id")?,
            fields: F::from_row(row)?,
        })
    }
}

impl<F> LineItem<F> {
    /// New value for the same row carrying the given fields.
    pub fn with_fields(&self, fields: F) -> Self {
        Self {
            id: self.id,
            parent_id: self.parent_id,
            fields,
        }
    }
}

/// One entry of an incoming `items` array. A missing `id` asks for a new row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProposedLineItem<F> {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub fields: F,
}

impl<F> ProposedLineItem<F> {
    pub fn new(fields: F) -> Self {
        Self { id: None, fields }
    }

    pub fn existing(id: i64, fields: F) -> Self {
        Self { id: Some(id), fields }
    }
}

impl<F: Validate> Validate for ProposedLineItem<F> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.fields.validate()
    }
}

/// Editable fields of a quotation line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate)]
pub struct QuotationLine {
    #[serde(alias = "sequence_number")]
    #[validate(range(min = 1, message = "sl_no must be a positive integer"))]
    pub sl_no: i32,
    #[validate(length(min = 1, max = 255, message = "description must be 1-255 characters"))]
    pub description: String,
    #[validate(custom(function = "amount"))]
    pub price: BigDecimal,
}

/// Editable fields of an invoice line. `price` is the line amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate)]
pub struct InvoiceLine {
    #[serde(alias = "sequence_number")]
    #[validate(range(min = 1, message = "sl_no must be a positive integer"))]
    pub sl_no: i32,
    #[validate(length(min = 1, max = 255, message = "description must be 1-255 characters"))]
    pub description: String,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 0, message = "quantity cannot be negative"))]
    pub quantity: i32,
    #[validate(custom(function = "amount"))]
    pub rate: BigDecimal,
    #[validate(custom(function = "amount"))]
    pub price: BigDecimal,
}

fn default_quantity() -> i32 {
    1
}

/// Line fields that carry a price.
pub trait Priced {
    fn price(&self) -> &BigDecimal;
}

impl Priced for QuotationLine {
    fn price(&self) -> &BigDecimal {
        &self.price
    }
}

impl Priced for InvoiceLine {
    fn price(&self) -> &BigDecimal {
        &self.price
    }
}

/// Sum of line prices.
pub fn subtotal<F: Priced>(items: &[LineItem<F>]) -> BigDecimal {
    items
        .iter()
        .fold(BigDecimal::from(0), |acc, item| acc + item.fields.price())
}
