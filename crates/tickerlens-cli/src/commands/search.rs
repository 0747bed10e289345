use std::time::Instant;

use serde::Serialize;
use tickerlens_core::{CoreError, DirectoryError, EnvelopeError, Instrument, SearchRequest};

use crate::cli::SearchArgs;
use crate::error::CliError;

use super::{elapsed_ms, CommandResult, Context};

#[derive(Debug, Serialize)]
struct SearchResponseData {
    query: String,
    results: Vec<Instrument>,
}

pub async fn run(args: &SearchArgs, context: &Context) -> Result<CommandResult, CliError> {
    let request = SearchRequest::new(args.query.as_str(), args.limit)
        .map_err(|error| CliError::Command(error.message().to_owned()))?;
    let query = request.query.clone();
    let started = Instant::now();

    match context
        .directory()?
        .search(context.source.as_ref(), request)
        .await
    {
        Ok(outcome) => {
            let data = serde_json::to_value(SearchResponseData {
                query: outcome.query,
                results: outcome.results,
            })?;
            Ok(CommandResult::ok(data, outcome.source_chain)
                .with_warnings(outcome.warnings)
                .with_latency(elapsed_ms(started))
                .with_cache_hit(outcome.cache_hit))
        }
        Err(DirectoryError::Source(error)) => {
            let source_id = context.source.id();
            let data = serde_json::to_value(SearchResponseData {
                query,
                results: Vec::new(),
            })?;
            Ok(CommandResult::ok(data, vec![source_id])
                .with_errors(vec![EnvelopeError::from_source_error(&error, source_id)])
                .with_latency(elapsed_ms(started))
                .with_cache_hit(false))
        }
        Err(other) => Err(CoreError::from(other).into()),
    }
}
