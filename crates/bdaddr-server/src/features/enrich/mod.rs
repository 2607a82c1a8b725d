pub mod commands;
pub mod routes;

pub use commands::{EnrichFileCommand, EnrichFileError, EnrichFileResponse};
pub use routes::{enrich_routes, ENRICHED_FILE_NAME};
