//! Invoice lifecycle: totals, payments, overdue derivation and aging.

pub mod error;
pub mod service;
pub mod totals;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::InvoiceError;
pub use service::InvoiceService;
pub use totals::{InvoiceTotals, compute_line, compute_totals};
pub use types::{
    AgingBucket, AgingBucketTotal, AgingReport, Invoice, InvoiceLine, InvoiceLineInput,
    InvoiceStatus, InvoiceType, InvoiceView, NewInvoice,
};
