mod models;
mod timestamp;

pub use models::{AssetIdentity, OhlcvRecord, StatisticsSummary};
pub use timestamp::{normalize_value, RawTimestamp, UtcDateTime};
