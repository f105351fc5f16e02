//! Canonical quotation record and JSON decoding helpers.
//!
//! The upstream API answers with an envelope keyed by the concatenated pair:
//!
//! ```json
//! {"USDBRL": {"code": "USD", "codein": "BRL", "bid": "5.43", ...}}
//! ```
//!
//! Every value is text. The record keeps that text verbatim and only checks
//! that it parses, so writing it back out reproduces the upstream values exactly.
use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::CurrencyPair;
use crate::error::DecodeError;

/// Layout of `create_date` in upstream payloads.
pub const CREATE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One exchange-rate snapshot as published by the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalQuotation {
    /// Base currency code, e.g. `USD`.
    pub code: String,
    /// Quote currency code, e.g. `BRL`.
    pub codein: String,
    /// Display name, e.g. `Dólar Americano/Real Brasileiro`.
    pub name: String,
    /// Session high.
    pub high: String,
    /// Session low.
    pub low: String,
    /// Absolute bid variation.
    pub var_bid: String,
    /// Percent change.
    pub pct_change: String,
    /// Bid price.
    pub bid: String,
    /// Ask price.
    pub ask: String,
    /// Upstream timestamp, epoch seconds.
    pub timestamp: String,
    /// Upstream creation date, `YYYY-MM-DD HH:MM:SS`.
    #[serde(rename = "create_date")]
    pub create_date: String,
}

impl CanonicalQuotation {
    /// Decode the entry for `pair` out of an upstream JSON body.
    ///
    /// Fails without producing a partial record if the entry is missing, any
    /// field is absent or not text, a numeric field is not an exact decimal,
    /// or the record describes another pair.
    pub fn from_upstream(body: &[u8], pair: &CurrencyPair) -> Result<Self, DecodeError> {
        let mut envelope: HashMap<String, serde_json::Value> = serde_json::from_slice(body)?;
        let key = pair.key();
        let entry = envelope
            .remove(&key)
            .ok_or_else(|| DecodeError::MissingPair(key.clone()))?;
        let quotation: CanonicalQuotation = serde_json::from_value(entry)?;
        quotation.validate(pair)?;
        Ok(quotation)
    }

    fn validate(&self, pair: &CurrencyPair) -> Result<(), DecodeError> {
        let actual = format!("{}{}", self.code, self.codein);
        if actual != pair.key() {
            return Err(DecodeError::PairMismatch {
                expected: pair.key(),
                actual,
            });
        }
        for (field, value) in [
            ("high", &self.high),
            ("low", &self.low),
            ("varBid", &self.var_bid),
            ("pctChange", &self.pct_change),
            ("bid", &self.bid),
            ("ask", &self.ask),
        ] {
            check_decimal(field, value)?;
        }
        if self.timestamp.parse::<i64>().is_err() {
            return Err(invalid("timestamp", &self.timestamp));
        }
        if NaiveDateTime::parse_from_str(&self.create_date, CREATE_DATE_FORMAT).is_err() {
            return Err(invalid("create_date", &self.create_date));
        }
        Ok(())
    }
}

/// Bid-only view of the envelope entry, used by the client.
#[derive(Debug, Deserialize)]
struct BidOnly {
    bid: String,
}

/// Extract just the bid of `pair` from a server response body.
pub fn extract_bid(body: &[u8], pair: &CurrencyPair) -> Result<String, DecodeError> {
    let mut envelope: HashMap<String, serde_json::Value> = serde_json::from_slice(body)?;
    let key = pair.key();
    let entry = envelope
        .remove(&key)
        .ok_or(DecodeError::MissingPair(key))?;
    let BidOnly { bid } = serde_json::from_value(entry)?;
    check_decimal("bid", &bid)?;
    Ok(bid)
}

fn check_decimal(field: &'static str, value: &str) -> Result<(), DecodeError> {
    Decimal::from_str(value)
        .map(|_| ())
        .map_err(|_| invalid(field, value))
}

fn invalid(field: &'static str, value: &str) -> DecodeError {
    DecodeError::InvalidField {
        field,
        value: value.to_string(),
    }
}
