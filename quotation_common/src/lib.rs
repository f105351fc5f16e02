//!
//! Common types and utilities shared by the quotation server and client.
//!
//! This crate aggregates:
//! - `error` — unified error type `QuotationError` used across the workspace.
//! - `result` — handy `Result<T, QuotationError>` alias.
//! - `currency` — currency codes and the pair type used to address the upstream API.
//! - `quotation` — the canonical quotation record and JSON decoding helpers.
//! - `net` — endpoint constants, deadlines and small helpers.
#![warn(missing_docs)]
pub mod currency;
pub mod error;
pub mod net;
pub mod quotation;
pub mod result;

pub use currency::{Currency, CurrencyPair};
pub use error::{DecodeError, QuotationError};
pub use quotation::CanonicalQuotation;
pub use result::Result;
