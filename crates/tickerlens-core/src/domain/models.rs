use serde::{Deserialize, Serialize};

use crate::{Symbol, TradingDate, ValidationError};

/// One trading day's quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: TradingDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(
        date: TradingDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;
        if close == 0.0 {
            return Err(ValidationError::NonPositiveValue { field: "close" });
        }

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Bar whose open, high, low and close are all `price`.
    pub fn flat(date: TradingDate, price: f64, volume: u64) -> Result<Self, ValidationError> {
        Self::new(date, price, price, price, price, volume)
    }
}

/// Instrument class reported by symbol search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Equity,
    Etf,
    MutualFund,
    Other,
}

impl AssetClass {
    /// Maps the free-text `type` column of a search match.
    pub fn from_match_type(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "equity" | "common stock" => Self::Equity,
            "etf" | "exchange traded fund" => Self::Etf,
            "mutual fund" | "fund" => Self::MutualFund,
            _ => Self::Other,
        }
    }
}

/// Symbol directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: Symbol,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub asset_class: AssetClass,
}

impl Instrument {
    pub fn new(symbol: Symbol, name: impl Into<String>, asset_class: AssetClass) -> Self {
        Self {
            symbol,
            name: name.into(),
            region: None,
            currency: None,
            asset_class,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the currency, dropping anything that is not a 3-letter code.
    pub fn with_currency(mut self, currency: &str) -> Self {
        let normalized = currency.trim().to_ascii_uppercase();
        if normalized.len() == 3 && normalized.chars().all(|ch| ch.is_ascii_alphabetic()) {
            self.currency = Some(normalized);
        }
        self
    }

    /// Whether the name contains `query`, ignoring case.
    pub fn name_contains(&self, query: &str) -> bool {
        self.name
            .to_ascii_lowercase()
            .contains(&query.trim().to_ascii_lowercase())
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
