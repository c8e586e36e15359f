//! Persisted watchlist: an ordered, id-deduplicated set of assets.
//!
//! The list lives outside the query core, serialized as JSON under a fixed
//! key in the candleview home directory. It is read once at startup and
//! written back on every mutation; insertion order is display order.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::AssetIdentity;
use crate::session::resolve_candleview_home;

/// Fixed key the watchlist is stored under.
pub const WATCHLIST_KEY: &str = "watchlist";

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// In-memory watchlist. Deduplicated by asset id, ordered by insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watchlist {
    entries: Vec<AssetIdentity>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[AssetIdentity] {
        &self.entries
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Append an asset unless its id is already present. Returns whether the
    /// list changed.
    pub fn add(&mut self, asset: AssetIdentity) -> bool {
        if self.contains(&asset.id) {
            return false;
        }
        self.entries.push(asset);
        true
    }

    /// Remove an asset by id. Returns whether the list changed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// File-backed store for the watchlist.
#[derive(Debug, Clone)]
pub struct WatchlistStore {
    path: PathBuf,
}

impl WatchlistStore {
    /// Store rooted at an explicit directory.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            path: directory.into().join(format!("{WATCHLIST_KEY}.json")),
        }
    }

    /// Store under the resolved candleview home.
    pub fn open_default() -> Self {
        Self::new(resolve_candleview_home())
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Read the persisted watchlist. A missing file yields an empty list; a
    /// corrupt one is discarded and replaced by an empty list rather than
    /// poisoning every later read.
    pub fn load(&self) -> Result<Watchlist, WatchlistError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Watchlist::new());
            }
            Err(error) => return Err(error.into()),
        };

        match serde_json::from_str(&text) {
            Ok(watchlist) => Ok(watchlist),
            Err(_) => {
                let _ = fs::remove_file(&self.path);
                Ok(Watchlist::new())
            }
        }
    }

    /// Persist the watchlist, creating the parent directory when needed.
    pub fn save(&self, watchlist: &Watchlist) -> Result<(), WatchlistError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(watchlist)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}
