use std::time::Instant;

use serde::Serialize;
use tickerlens_core::{DailySeriesRequest, EnvelopeError, PriceBar, Symbol};

use crate::cli::BarsArgs;
use crate::error::CliError;

use super::{elapsed_ms, CommandResult, Context};

#[derive(Debug, Serialize)]
struct BarsResponseData {
    symbol: Symbol,
    bars: Vec<PriceBar>,
}

pub async fn run(args: &BarsArgs, context: &Context) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let request = DailySeriesRequest::new(symbol.clone(), args.limit)
        .map_err(|error| CliError::Command(error.message().to_owned()))?;

    let source_id = context.source.id();
    let started = Instant::now();

    let (bars, errors) = match context.source.daily_series(request).await {
        Ok(series) => (series.into_bars(), Vec::new()),
        Err(error) => (
            Vec::new(),
            vec![EnvelopeError::from_source_error(&error, source_id)],
        ),
    };

    let data = serde_json::to_value(BarsResponseData { symbol, bars })?;
    Ok(CommandResult::ok(data, vec![source_id])
        .with_errors(errors)
        .with_latency(elapsed_ms(started))
        .with_cache_hit(false))
}
