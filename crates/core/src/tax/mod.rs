//! Periodic tax records: PPh withholding, PPh 25 instalments and PPN.

pub mod error;
pub mod service;
pub mod types;

pub use error::TaxError;
pub use service::TaxService;
pub use types::{
    TaxCalculation, TaxFigures, TaxFiling, TaxRecord, TaxStatus, TaxType, VatPosition,
};
