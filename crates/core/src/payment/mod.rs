//! Receipts and payments, optionally settling invoices.

pub mod error;
pub mod service;
pub mod types;

pub use error::PaymentError;
pub use service::PaymentService;
pub use types::{NewPayment, Payment, PaymentMethod, PaymentStatus, PaymentType};
