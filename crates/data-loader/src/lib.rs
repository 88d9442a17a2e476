//! # Data Loader
//!
//! The contract the engine uses to obtain time-ordered market data, allowing the
//! underlying source (a historical vendor, a flat-file archive, an in-memory fixture)
//! to be swapped out without touching the simulation core.
//!
//! Unlike the live exchange client this crate replaces, every method here is
//! synchronous: the engine's hot loop materialises all data up front and never awaits
//! mid-simulation.

pub mod error;

pub use error::DataLoaderError;

use chrono::{DateTime, Utc};
use core_types::{Bar, Tick};
use std::collections::{BTreeMap, HashSet};

/// The capability the engine needs from a market-data source.
pub trait DataLoader: Send + Sync {
    /// Returns bars for `symbol` in `[start, end]`, strictly ascending by timestamp.
    fn load_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataLoaderError>;

    /// Returns ticks for `symbol` in `[start, end]`, strictly ascending by timestamp.
    /// Returns an empty vector for loaders that only carry bar data.
    fn load_ticks(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Tick>, DataLoaderError>;

    /// The set of symbols this loader can serve.
    fn available_symbols(&self) -> HashSet<String>;

    /// The full `[earliest, latest]` span this loader holds for `symbol`.
    fn data_range(&self, symbol: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), DataLoaderError>;
}

/// An in-memory loader backed by pre-validated bar vectors, used by the engine's own
/// test suite and by callers with already-materialised data (e.g. the walk-forward
/// analyser slicing a parent range into windows).
#[derive(Debug, Default, Clone)]
pub struct InMemoryDataLoader {
    bars: BTreeMap<String, Vec<Bar>>,
}

impl InMemoryDataLoader {
    pub fn new() -> Self {
        Self {
            bars: BTreeMap::new(),
        }
    }

    /// Inserts bars for `symbol`, validating OHLC invariants and strictly ascending
    /// timestamps eagerly so later `load_bars` calls never re-check them.
    pub fn with_bars(mut self, symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, DataLoaderError> {
        let symbol = symbol.into();
        for bar in &bars {
            bar.validate()
                .map_err(|e| DataLoaderError::InvalidBar(symbol.clone(), e))?;
        }
        for pair in bars.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(DataLoaderError::InvalidBar(
                    symbol.clone(),
                    core_types::CoreError::InvalidInput(
                        "timestamp".to_string(),
                        "bars must be strictly ascending".to_string(),
                    ),
                ));
            }
        }
        self.bars.insert(symbol, bars);
        Ok(self)
    }
}

impl DataLoader for InMemoryDataLoader {
    fn load_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataLoaderError> {
        let bars = self
            .bars
            .get(symbol)
            .ok_or_else(|| DataLoaderError::SymbolNotFound(symbol.to_string()))?;
        let slice: Vec<Bar> = bars
            .iter()
            .copied()
            .filter(|b| b.timestamp >= start && b.timestamp <= end)
            .collect();
        if slice.is_empty() {
            return Err(DataLoaderError::EmptyRange {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }
        Ok(slice)
    }

    fn load_ticks(
        &self,
        _symbol: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<Tick>, DataLoaderError> {
        Ok(Vec::new())
    }

    fn available_symbols(&self) -> HashSet<String> {
        self.bars.keys().cloned().collect()
    }

    fn data_range(&self, symbol: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), DataLoaderError> {
        let bars = self
            .bars
            .get(symbol)
            .ok_or_else(|| DataLoaderError::SymbolNotFound(symbol.to_string()))?;
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok((first.timestamp, last.timestamp)),
            _ => Err(DataLoaderError::SymbolNotFound(symbol.to_string())),
        }
    }
}
