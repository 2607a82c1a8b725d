pub mod queries;
pub mod routes;

pub use queries::{CacheStatsQuery, CacheStatsResponse, ExportCacheError, ExportCacheQuery};
pub use routes::cache_routes;
