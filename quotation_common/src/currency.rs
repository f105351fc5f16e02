//! Currency codes and the pair type used to address the upstream API.
//!
//! The upstream API is addressed with a dash-separated pair in the URL
//! (`USD-BRL`) and answers with the same pair concatenated as the JSON
//! envelope key (`USDBRL`). `CurrencyPair` produces both forms.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::VariantNames;
use strum_macros::{Display, EnumString};

use crate::error::QuotationError;

/// Set of supported currency codes.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    VariantNames,
    Hash,
    Eq,
    PartialEq,
)]
#[strum(ascii_case_insensitive)]
pub enum Currency {
    USD,
    BRL,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    CHF,
    CNY,
    ARS,
    BTC,
    ETH,
}

/// Ordered pair of currencies: the price of one `base` expressed in `quote`.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct CurrencyPair {
    /// Currency being priced.
    pub base: Currency,
    /// Currency the price is expressed in.
    pub quote: Currency,
}

impl CurrencyPair {
    /// Creates a pair, rejecting a currency quoted against itself.
    pub fn new(base: Currency, quote: Currency) -> Result<Self, QuotationError> {
        if base == quote {
            return Err(QuotationError::InvalidPair(format!(
                "{} cannot be quoted against itself",
                base
            )));
        }
        Ok(Self { base, quote })
    }

    /// Key of the pair inside the upstream JSON envelope, e.g. `USDBRL`.
    pub fn key(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self {
            base: Currency::USD,
            quote: Currency::BRL,
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.quote)
    }
}

impl FromStr for CurrencyPair {
    type Err = QuotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) = s.trim().split_once('-').ok_or_else(|| {
            QuotationError::InvalidPair(format!("expected BASE-QUOTE, got '{}'", s))
        })?;
        let parse = |code: &str| {
            code.parse::<Currency>().map_err(|_| {
                QuotationError::InvalidPair(format!(
                    "unsupported currency '{}', expected one of {}",
                    code,
                    Currency::VARIANTS.join(", ")
                ))
            })
        };
        Self::new(parse(base)?, parse(quote)?)
    }
}
