pub mod export;
pub mod stats;

pub use export::{ExportCacheError, ExportCacheQuery, ExportCacheResponse};
pub use stats::{CacheStatsQuery, CacheStatsResponse};
