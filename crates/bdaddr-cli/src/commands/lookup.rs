//! `bdaddr lookup` command implementation

use std::path::PathBuf;

use bdaddr_common::{EnrichMode, ResolutionSource};
use colored::Colorize;
use serde::Serialize;

use super::{build_pipeline, RunCache};
use crate::error::Result;
use crate::OutputFormat;

/// Options of one `lookup` invocation
#[derive(Debug, Clone)]
pub struct LookupOptions {
    pub address: String,
    pub mode: EnrichMode,
    pub gazetteer: Option<PathBuf>,
    pub cache: PathBuf,
    pub format: OutputFormat,
    pub nominatim_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct LookupOutput<'a> {
    address: &'a str,
    district: Option<&'a str>,
    thana: Option<&'a str>,
    source: ResolutionSource,
}

/// Resolve one address and print the result
pub async fn run(options: LookupOptions) -> Result<()> {
    let pipeline = build_pipeline(options.nominatim_url.as_deref(), options.gazetteer.as_deref())?;
    let mut run_cache = RunCache::load(&options.cache, options.mode);

    let (resolution, source) = pipeline
        .resolve_address(&options.address, options.mode, &mut run_cache.cache)
        .await;
    run_cache.save(&options.cache)?;

    match options.format {
        OutputFormat::Json => {
            let output = LookupOutput {
                address: options.address.trim(),
                district: resolution.district.as_deref(),
                thana: resolution.thana.as_deref(),
                source,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        },
        OutputFormat::Text => {
            let label = |value: &str, known: bool| {
                if known {
                    value.green().to_string()
                } else {
                    value.red().to_string()
                }
            };
            println!("Address:  {}", options.address.trim());
            println!(
                "District: {}",
                label(resolution.district_label(), resolution.district.is_some())
            );
            println!(
                "Thana:    {}",
                label(resolution.thana_label(), resolution.thana.is_some())
            );
            println!("Source:   {}", source);
        },
    }

    Ok(())
}
