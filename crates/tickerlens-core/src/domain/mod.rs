//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker symbol |
//! | [`TradingDate`] | Session date (`YYYY-MM-DD`) |
//! | [`PriceBar`] | One day's open/high/low/close/volume |
//! | [`Series`] | Non-empty, newest-first run of bars for a symbol |
//! | [`Instrument`] | Symbol directory entry |
//!
//! Construction validates every invariant, so the analytics pipeline can
//! assume a well-formed [`Series`]:
//!
//! ```rust
//! use tickerlens_core::{PriceBar, Series, Symbol, TradingDate, ValidationError};
//!
//! let day = TradingDate::parse("2024-01-02")?;
//! let bar = PriceBar::new(day, 100.0, 105.0, 95.0, 102.0, 1_000)?;
//! let series = Series::new(Symbol::parse("ibm")?, vec![bar])?;
//! assert_eq!(series.latest().close, 102.0);
//!
//! let empty = Series::new(Symbol::parse("IBM")?, Vec::new());
//! assert!(matches!(empty, Err(ValidationError::EmptySeries)));
//! # Ok::<(), ValidationError>(())
//! ```

mod models;
mod series;
mod symbol;
mod trading_date;

pub use models::{AssetClass, Instrument, PriceBar};
pub use series::Series;
pub use symbol::Symbol;
pub use trading_date::TradingDate;
