//! `bdaddr gazetteer` command implementation

use std::path::Path;

use bdaddr_enrich::BUNDLED_GAZETTEER_CSV;
use colored::Colorize;

use crate::error::{CliError, Result};

/// Write the bundled gazetteer to `output`
pub async fn export(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        return Err(CliError::FileExists(output.display().to_string()));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, BUNDLED_GAZETTEER_CSV)?;

    tracing::info!(path = %output.display(), "Exported bundled gazetteer");
    println!("{} {}", "Wrote".green().bold(), output.display());
    println!("Edit it and pass it back with --gazetteer.");

    Ok(())
}
