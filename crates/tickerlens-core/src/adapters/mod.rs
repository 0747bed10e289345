//! Market-data provider adapters.

pub mod alphavantage;

pub use alphavantage::AlphaVantageAdapter;
