//! `bdaddr enrich` command implementation
//!
//! Reads one worksheet, resolves every row and writes a two-sheet workbook:
//! the untouched original and the enriched copy.

use std::path::{Path, PathBuf};

use bdaddr_common::{EnrichMode, RunSummary};
use bdaddr_enrich::workbook;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

use super::{build_pipeline, print_warning, RunCache};
use crate::error::{CliError, Result};
use crate::progress::create_spinner;

/// Options of one `enrich` invocation
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub address_col: Option<String>,
    pub mode: EnrichMode,
    pub sheet_index: usize,
    pub gazetteer: Option<PathBuf>,
    pub cache: PathBuf,
    pub nominatim_url: Option<String>,
}

/// Enrich a workbook on disk
pub async fn run(options: EnrichOptions) -> Result<()> {
    if !options.input.is_file() {
        return Err(CliError::file_not_found(&options.input));
    }
    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output(&options.input));

    let table = workbook::read_xlsx_path(&options.input, options.sheet_index)?;
    let column = table.address_column(options.address_col.as_deref())?;

    let pipeline = build_pipeline(options.nominatim_url.as_deref(), options.gazetteer.as_deref())?;
    let mut run_cache = RunCache::load(&options.cache, options.mode);

    println!(
        "Enriching {} rows from {} (address column '{}', mode {})",
        table.rows.len(),
        options.input.display(),
        table.headers[column],
        options.mode
    );

    let spinner = create_spinner("Resolving addresses...");
    let run = pipeline
        .run(&table, column, options.mode, &mut run_cache.cache)
        .await;
    spinner.finish_and_clear();

    std::fs::write(&output, workbook::write_enriched(&table, &run.rows)?)?;
    run_cache.save(&options.cache)?;

    for warning in &run.summary.warnings {
        print_warning(warning);
    }
    print_summary(&run.summary);
    println!("{} {}", "Saved".green().bold(), output.display());

    Ok(())
}

/// `customers.xlsx` -> `customers_enriched.xlsx`, next to the input
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}_enriched.xlsx"))
}

fn print_summary(summary: &RunSummary) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Rows", "Offline", "Cache", "Online", "Not found"]);
    table.add_row(vec![
        summary.total_rows.to_string(),
        summary.offline.to_string(),
        summary.cache.to_string(),
        summary.online.to_string(),
        summary.unresolved.to_string(),
    ]);
    println!("{table}");
}
