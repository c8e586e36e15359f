//! Per-symbol memoization of computed series and statistics.
//!
//! Both maps fill lazily on first request and are reused for the lifetime of
//! one engine instance. There is no eviction policy beyond full invalidation;
//! dataset sizes are bounded by a single file load, and the coordinator
//! clears everything before the engine is replaced or closed.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{OhlcvRecord, StatisticsSummary};

#[derive(Debug, Default)]
pub struct ResultCache {
    series: HashMap<String, Arc<Vec<OhlcvRecord>>>,
    statistics: HashMap<String, StatisticsSummary>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn series(&self, symbol: &str) -> Option<Arc<Vec<OhlcvRecord>>> {
        self.series.get(symbol).cloned()
    }

    pub fn put_series(&mut self, symbol: String, series: Arc<Vec<OhlcvRecord>>) {
        self.series.insert(symbol, series);
    }

    pub fn statistics(&self, symbol: &str) -> Option<StatisticsSummary> {
        self.statistics.get(symbol).cloned()
    }

    pub fn put_statistics(&mut self, symbol: String, statistics: StatisticsSummary) {
        self.statistics.insert(symbol, statistics);
    }

    /// Drop every entry. Must run before a new engine is installed or the
    /// current one is closed; stale data must never be served against a
    /// different database.
    pub fn invalidate_all(&mut self) {
        self.series.clear();
        self.statistics.clear();
    }

    pub fn len(&self) -> usize {
        self.series.len() + self.statistics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty() && self.statistics.is_empty()
    }
}
