use serde::Serialize;
use serde_json::json;
use time::OffsetDateTime;
use tickerlens_core::{CoreError, Instrument, ProviderId};

use crate::cli::{SymbolsArgs, SymbolsCommand};
use crate::error::CliError;

use super::{CommandResult, Context};

#[derive(Debug, Serialize)]
struct ListingData {
    #[serde(with = "time::serde::rfc3339::option")]
    fetched_at: Option<OffsetDateTime>,
    stale: bool,
    total: usize,
    symbols: Vec<Instrument>,
}

pub fn run(args: &SymbolsArgs, context: &Context) -> Result<CommandResult, CliError> {
    let directory = context.directory()?;

    let data = match &args.command {
        SymbolsCommand::List { limit } => {
            let entries = directory.entries().map_err(CoreError::from)?;
            let fetched_at = directory.fetched_at().map_err(CoreError::from)?;
            let stale = directory
                .is_stale(OffsetDateTime::now_utc())
                .map_err(CoreError::from)?;

            serde_json::to_value(ListingData {
                fetched_at,
                stale,
                total: entries.len(),
                symbols: entries.into_iter().take(*limit).collect(),
            })?
        }
        SymbolsCommand::Clear => {
            let cleared = directory.clear().map_err(CoreError::from)?;
            json!({ "cleared": cleared })
        }
    };

    Ok(CommandResult::ok(data, vec![ProviderId::SymbolDirectory]))
}
