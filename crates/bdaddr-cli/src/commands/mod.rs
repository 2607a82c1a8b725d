//! CLI command implementations

pub mod enrich;
pub mod gazetteer;
pub mod lookup;

use std::path::Path;
use std::sync::Arc;

use bdaddr_common::EnrichMode;
use bdaddr_enrich::{
    AddressCache, EnrichConfig, EnrichmentPipeline, Gazetteer, Matcher, NominatimResolver,
};
use colored::Colorize;

use crate::error::{CliError, Result};

/// Build the pipeline from `BDADDR_*` settings, the `--nominatim-url` flag
/// and an optional custom gazetteer.
pub fn build_pipeline(
    nominatim_url: Option<&str>,
    gazetteer: Option<&Path>,
) -> Result<EnrichmentPipeline> {
    dotenvy::dotenv().ok();

    let mut config = EnrichConfig::from_env()?;
    if let Some(url) = nominatim_url {
        config.resolver = config.resolver.with_base_url(url);
    }

    let gazetteer = match gazetteer {
        Some(path) => load_gazetteer(path)?,
        None => Gazetteer::bundled()?,
    };
    tracing::debug!(entries = gazetteer.len(), "Gazetteer ready");

    let resolver = Arc::new(NominatimResolver::new(&config.resolver)?);
    Ok(EnrichmentPipeline::new(Matcher::new(gazetteer, config.matcher), resolver))
}

fn load_gazetteer(path: &Path) -> Result<Gazetteer> {
    let file = std::fs::File::open(path).map_err(|_| CliError::file_not_found(path))?;
    let (gazetteer, warning) = Gazetteer::load_or_bundled(file)?;
    if let Some(warning) = warning {
        print_warning(&warning);
    }
    Ok(gazetteer)
}

/// Cache used by one command, and whether it may be written back
pub struct RunCache {
    pub cache: AddressCache,
    persist: bool,
}

impl RunCache {
    /// Load the cache for a run. Offline runs never touch it.
    ///
    /// An unreadable cache file is reported, ignored and left as it is on disk.
    pub fn load(path: &Path, mode: EnrichMode) -> Self {
        if !mode.uses_online() {
            return Self {
                cache: AddressCache::new(),
                persist: false,
            };
        }

        match AddressCache::load(path) {
            Ok(cache) => Self {
                cache,
                persist: true,
            },
            Err(err) => {
                print_warning(&format!(
                    "{err}; continuing without a cache, {} will not be updated",
                    path.display()
                ));
                Self {
                    cache: AddressCache::new(),
                    persist: false,
                }
            },
        }
    }

    /// Persist the cache after a run that may have added to it
    pub fn save(&self, path: &Path) -> Result<()> {
        if self.persist {
            self.cache.save(path)?;
        }
        Ok(())
    }
}

pub(crate) fn print_warning(message: &str) {
    eprintln!("{} {}", "Warning:".yellow().bold(), message);
}
