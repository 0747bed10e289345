//! Cached symbol/name lookup table.
//!
//! The listing lives in a [`KeyValueStore`] under [`LISTING_KEY`] as JSON:
//!
//! ```json
//! { "fetched_at": "2024-06-28T14:00:00Z", "entries": { "IBM": { "symbol": "IBM", ... } } }
//! ```
//!
//! Searches are answered locally while the listing is fresh and holds enough
//! matches; otherwise the data source is asked and its answer merged back.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::data_source::{DataSource, SearchRequest, SourceError};
use crate::store::{KeyValueStore, StoreError};
use crate::{Instrument, ProviderId};

pub const LISTING_KEY: &str = "symbol-directory.v1";

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode symbol listing: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Source(#[from] SourceError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CachedListing {
    #[serde(default, with = "time::serde::rfc3339::option")]
    fetched_at: Option<OffsetDateTime>,
    #[serde(default)]
    entries: BTreeMap<String, Instrument>,
}

impl CachedListing {
    fn is_stale(&self, now: OffsetDateTime, ttl: Duration) -> bool {
        match self.fetched_at {
            Some(fetched_at) => now - fetched_at > ttl,
            None => true,
        }
    }

    fn merge(&mut self, instruments: &[Instrument]) {
        for instrument in instruments {
            self.entries
                .insert(instrument.symbol.as_str().to_owned(), instrument.clone());
        }
    }

    /// Symbol-prefix matches first, then symbol or name substring matches.
    /// Each group keeps symbol order.
    fn rank(&self, query: &str, limit: usize) -> Vec<Instrument> {
        let needle = query.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return self.entries.values().take(limit).cloned().collect();
        }

        let (prefix, rest): (Vec<&Instrument>, Vec<&Instrument>) = self
            .entries
            .values()
            .partition(|instrument| instrument.symbol.starts_with_ignore_case(&needle));

        let contains = rest.into_iter().filter(|instrument| {
            instrument
                .symbol
                .as_str()
                .to_ascii_lowercase()
                .contains(&needle)
                || instrument.name_contains(&needle)
        });

        prefix
            .into_iter()
            .chain(contains)
            .take(limit)
            .cloned()
            .collect()
    }
}

/// Outcome of [`SymbolDirectory::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorySearch {
    pub query: String,
    pub results: Vec<Instrument>,
    pub cache_hit: bool,
    pub source_chain: Vec<ProviderId>,
    pub warnings: Vec<String>,
}

pub struct SymbolDirectory<S> {
    store: S,
    ttl: Duration,
}

impl<S: KeyValueStore> SymbolDirectory<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Local matches for `query`, at most `limit` of them.
    pub fn lookup(&self, query: &str, limit: usize) -> Result<Vec<Instrument>, DirectoryError> {
        Ok(self.load()?.rank(query, limit))
    }

    /// Every cached entry in symbol order.
    pub fn entries(&self) -> Result<Vec<Instrument>, DirectoryError> {
        Ok(self.load()?.entries.into_values().collect())
    }

    pub fn fetched_at(&self) -> Result<Option<OffsetDateTime>, DirectoryError> {
        Ok(self.load()?.fetched_at)
    }

    /// Merges `instruments` into the listing and stamps it as fetched now.
    /// Returns the listing size after the merge.
    pub fn remember(&self, instruments: &[Instrument]) -> Result<usize, DirectoryError> {
        self.remember_at(instruments, OffsetDateTime::now_utc())
    }

    pub fn remember_at(
        &self,
        instruments: &[Instrument],
        fetched_at: OffsetDateTime,
    ) -> Result<usize, DirectoryError> {
        let mut listing = self.load()?;
        listing.merge(instruments);
        listing.fetched_at = Some(fetched_at);
        self.save(&listing)?;
        Ok(listing.entries.len())
    }

    /// True when the listing was never fetched or is older than the TTL.
    pub fn is_stale(&self, now: OffsetDateTime) -> Result<bool, DirectoryError> {
        Ok(self.load()?.is_stale(now, self.ttl))
    }

    /// Drops the cached listing. Returns whether one existed.
    pub fn clear(&self) -> Result<bool, DirectoryError> {
        Ok(self.store.remove(LISTING_KEY)?)
    }

    pub async fn search(
        &self,
        source: &dyn DataSource,
        request: SearchRequest,
    ) -> Result<DirectorySearch, DirectoryError> {
        let now = OffsetDateTime::now_utc();
        let mut listing = self.load()?;
        let local = listing.rank(&request.query, request.limit);

        if !listing.is_stale(now, self.ttl) && local.len() >= request.limit {
            debug!(query = %request.query, hits = local.len(), "symbol directory hit");
            return Ok(DirectorySearch {
                query: request.query,
                results: local,
                cache_hit: true,
                source_chain: vec![ProviderId::SymbolDirectory],
                warnings: Vec::new(),
            });
        }

        match source.search(request.clone()).await {
            Ok(batch) => {
                listing.merge(&batch.results);
                listing.fetched_at = Some(now);
                self.save(&listing)?;
                info!(
                    query = %request.query,
                    remote = batch.results.len(),
                    cached = listing.entries.len(),
                    "merged remote symbol matches"
                );

                let mut results = listing.rank(&request.query, request.limit);
                for instrument in batch.results {
                    if results.len() >= request.limit {
                        break;
                    }
                    if !results.iter().any(|known| known.symbol == instrument.symbol) {
                        results.push(instrument);
                    }
                }

                Ok(DirectorySearch {
                    query: request.query,
                    results,
                    cache_hit: false,
                    source_chain: vec![source.id(), ProviderId::SymbolDirectory],
                    warnings: Vec::new(),
                })
            }
            Err(error) if !local.is_empty() => {
                warn!(query = %request.query, %error, "symbol search failed, serving cached matches");
                Ok(DirectorySearch {
                    query: request.query,
                    results: local,
                    cache_hit: true,
                    source_chain: vec![ProviderId::SymbolDirectory],
                    warnings: vec![format!(
                        "{} search failed, showing cached symbols: {error}",
                        source.id()
                    )],
                })
            }
            Err(error) => Err(error.into()),
        }
    }

    fn load(&self) -> Result<CachedListing, DirectoryError> {
        let Some(raw) = self.store.get(LISTING_KEY)? else {
            return Ok(CachedListing::default());
        };

        match serde_json::from_str(&raw) {
            Ok(listing) => Ok(listing),
            Err(error) => {
                warn!(%error, "discarding unreadable symbol listing");
                Ok(CachedListing::default())
            }
        }
    }

    fn save(&self, listing: &CachedListing) -> Result<(), DirectoryError> {
        self.store.put(LISTING_KEY, serde_json::to_string(listing)?)?;
        Ok(())
    }
}
