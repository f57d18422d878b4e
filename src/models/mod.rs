pub mod customer;
pub mod incoming_good;
pub mod invoice;
pub mod line_item;
pub mod money;
pub mod motor;
pub mod quotation;
pub mod supplier;

pub use customer::{Customer, CustomerInput};
pub use incoming_good::{IncomingGood, IncomingGoodInput};
pub use invoice::{InvoiceDetail, InvoiceHeader, InvoiceInput, InvoicePatch, InvoiceRow, InvoiceStatus};
pub use line_item::{InvoiceLine, LineItem, ProposedLineItem, QuotationLine};
pub use motor::{Motor, MotorInput, MotorType, WindingSection};
pub use quotation::{
    QuotationDetail, QuotationHeader, QuotationInput, QuotationPatch, QuotationRow, QuotationStatus,
};
pub use supplier::{Supplier, SupplierInput};

use serde::{Deserialize, Deserializer};

/// Treats a missing, null or whitespace-only string as `None`.
pub(crate) fn blank_to_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// For PATCH bodies: an absent key stays `None` (with `#[serde(default)]`)
/// while an explicit `null` becomes `Some(None)`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
