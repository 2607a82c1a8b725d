pub mod enrich_file;

pub use enrich_file::{EnrichFileCommand, EnrichFileError, EnrichFileResponse};
