//! Quotation pricing module.
//!
//! Builds warehousing quotations out of location groups and line items,
//! keeps their totals current on every edit, and exposes the JSON API the
//! quotation builder front end talks to.

pub mod amount;
pub mod audit;
pub mod calculators;
pub mod catalog;
pub mod clients;
pub mod document;
pub mod email;
pub mod models;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod validation;

// Re-export commonly used items
pub use amount::{Amount, AmountError, LineTotal};
pub use audit::{
    track_changes, track_client_changes, AuditAction, AuditEntry, ClientAuditAction,
    ClientAuditEntry,
};
pub use calculators::{round_money, LocationTotals, QuotationTotals, TAX_LABEL, TAX_RATE};
pub use catalog::{ServiceKind, StorageUnitType, DEFAULT_CATALOG};
pub use clients::{Client, ClientInput, NewClient};
pub use document::QuotationDocument;
pub use email::{LogMailer, MailError, Mailer, QuotationEmail};
pub use models::{
    ItemDescription, LineItem, LocationGroup, Quotation, QuotationError, QuotationHeader,
    QuotationStatus, RecordState,
};
pub use routes::router;
pub use validation::{FieldError, ValidationErrors};
