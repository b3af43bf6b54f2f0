//! Shared types, errors, and configuration for FinLedger.
//!
//! This crate provides common types used across all other crates:
//! - Currencies with minor-unit rounding
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - Bearer token validation

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, EngineSettings, PostingAccountCodes};
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
