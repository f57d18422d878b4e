pub mod invoices;
pub mod mailer;
pub mod quotations;
pub mod reconcile;

pub use invoices::InvoiceService;
pub use mailer::{EmailAttachment, Mailer, OutgoingEmail, SmtpMailer};
pub use quotations::QuotationService;
pub use reconcile::{reconcile, ForeignIdPolicy, ReconcileOutcome, ReconcilePlan};
