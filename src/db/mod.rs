pub mod customers;
pub mod incoming_goods;
pub mod invoices;
pub mod line_items;
pub mod motors;
pub mod pool;
pub mod quotations;
pub mod suppliers;

pub use line_items::LineItemStore;
pub use pool::{create_pool, migrate};
