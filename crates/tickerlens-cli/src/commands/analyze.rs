use std::time::Instant;

use serde_json::json;
use tickerlens_core::{Dashboard, EnvelopeError, Symbol, MAX_DAILY_BARS};

use crate::cli::AnalyzeArgs;
use crate::error::CliError;

use super::{elapsed_ms, CommandResult, Context};

pub async fn run(args: &AnalyzeArgs, context: &Context) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let window = args.window.unwrap_or(context.config.ma_window);

    if window == 0 {
        return Err(CliError::Command(String::from(
            "--window must be greater than zero",
        )));
    }
    if args.limit == 0 || args.limit > MAX_DAILY_BARS {
        return Err(CliError::Command(format!(
            "--limit must be between 1 and {MAX_DAILY_BARS}"
        )));
    }

    let dashboard = Dashboard::new(context.source.clone())
        .with_window(window)
        .with_limit(args.limit);
    let source_id = dashboard.source_id();
    let started = Instant::now();

    match dashboard.load(&symbol).await {
        Ok(view) => {
            let mut result = CommandResult::ok(serde_json::to_value(&view)?, vec![source_id])
                .with_latency(view.latency_ms)
                .with_cache_hit(false);
            if view.summary.moving_average.is_empty() {
                result = result.with_warning(format!(
                    "{} bar(s) are not enough for a {window}-day moving average",
                    view.bar_count
                ));
            }
            Ok(result)
        }
        Err(error) => Ok(CommandResult::ok(json!({ "symbol": symbol }), vec![source_id])
            .with_errors(vec![EnvelopeError::from_source_error(&error, source_id)])
            .with_latency(elapsed_ms(started))
            .with_cache_hit(false)),
    }
}
