mod analyze;
mod bars;
mod search;
mod symbols;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tickerlens_core::{
    AlphaVantageAdapter, Config, CoreError, DataSource, Envelope, EnvelopeError, FileStore,
    KeyValueStore, ProviderId, ProviderPolicy, ReqwestHttpClient, SymbolDirectory,
    SCHEMA_VERSION,
};
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Metadata;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub cache_hit: bool,
    pub source_chain: Vec<ProviderId>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<ProviderId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            cache_hit: true,
            source_chain,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_cache_hit(mut self, cache_hit: bool) -> Self {
        self.cache_hit = cache_hit;
        self
    }
}

/// Collaborators shared by every command.
pub struct Context {
    pub config: Config,
    pub source: Arc<dyn DataSource>,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl Context {
    pub fn new(config: Config, source: Arc<dyn DataSource>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            config,
            source,
            store: Some(store),
        }
    }

    /// Applies command-line overrides to `config`. The file store under
    /// `config.store_dir()` is opened on first use by [`Context::directory`].
    pub fn from_cli(cli: &Cli, mut config: Config) -> Result<Self, CliError> {
        if let Some(timeout_ms) = cli.timeout_ms {
            if timeout_ms == 0 {
                return Err(CliError::Command(String::from(
                    "--timeout-ms must be greater than zero",
                )));
            }
            config.timeout_ms = timeout_ms;
        }

        let source = build_source(&config, cli.offline);
        Ok(Self {
            config,
            source,
            store: None,
        })
    }

    pub fn directory(&self) -> Result<SymbolDirectory<Arc<dyn KeyValueStore>>, CliError> {
        let store = match &self.store {
            Some(store) => Arc::clone(store),
            None => {
                let store = FileStore::open(self.config.store_dir()).map_err(CoreError::from)?;
                debug!(store = %store.root().display(), "opened store");
                Arc::new(store)
            }
        };
        Ok(SymbolDirectory::new(store).with_ttl(self.config.symbol_ttl))
    }
}

fn build_source(config: &Config, offline: bool) -> Arc<dyn DataSource> {
    if offline {
        return Arc::new(AlphaVantageAdapter::default());
    }

    let policy = ProviderPolicy::alphavantage_default()
        .with_request_timeout(Duration::from_millis(config.timeout_ms));
    Arc::new(
        AlphaVantageAdapter::with_http_client(
            Arc::new(ReqwestHttpClient::new()),
            config.api_key.clone(),
        )
        .with_policy(policy),
    )
}

pub async fn run(cli: &Cli, context: &Context) -> Result<Envelope<Value>, CliError> {
    let command_result = match &cli.command {
        Command::Analyze(args) => analyze::run(args, context).await?,
        Command::Bars(args) => bars::run(args, context).await?,
        Command::Search(args) => search::run(args, context).await?,
        Command::Symbols(args) => symbols::run(args, context)?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
        latency_ms,
        cache_hit,
        source_chain,
    } = command_result;

    let mut metadata = Metadata::new(source_chain, latency_ms, cache_hit)?;
    for warning in warnings {
        metadata.push_warning(warning);
    }

    let meta = metadata.into_envelope_meta(SCHEMA_VERSION)?;
    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
