//! Build automation tasks for the address enricher
//!
//! Currently generates the CLI reference from the clap definitions.

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for bdaddr", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let markdown = clap_markdown::help_markdown::<bdaddr_cli::Cli>();

    let content = format!(
        r#"# bdaddr CLI Reference

This documentation is generated from the CLI source code. Last updated: {}.

## Overview

`bdaddr` adds District and Thana columns to spreadsheets of Bangladeshi
addresses. Rows are matched offline against a gazetteer first; in `auto` and
`online` mode the remaining rows are looked up on OpenStreetMap Nominatim and
the answers are kept in a CSV cache.

## Installation

```bash
cargo install --path crates/bdaddr-cli
```

## Quick Start

```bash
# Enrich a workbook, guessing the address column
bdaddr enrich --input customers.xlsx

# Offline only, explicit column and output
bdaddr enrich -i customers.xlsx -a "Delivery Address" -o enriched.xlsx --mode offline

# Resolve a single address
bdaddr lookup "Road 11, Banani, Dhaka-1213" --format json

# Start a custom gazetteer from the bundled one
bdaddr gazetteer export --output my_gazetteer.csv
bdaddr enrich -i customers.xlsx --gazetteer my_gazetteer.csv
```

## Commands

{}

## Environment Variables

- `BDADDR_NOMINATIM_URL` - Nominatim base URL (default: `https://nominatim.openstreetmap.org`)
- `BDADDR_USER_AGENT` - User-Agent sent to Nominatim
- `BDADDR_REQUEST_INTERVAL_MS` - Minimum delay between Nominatim requests (default: `1100`)
- `BDADDR_REQUEST_TIMEOUT_SECS` - Per-request timeout in seconds (default: `20`)
- `BDADDR_MATCH_THRESHOLD` - Fuzzy match threshold between 0 and 1 (default: `0.85`)
- `LOG_LEVEL` - Logging level (e.g., `debug`, `info`, `warn`, `error`)

## Output

The output workbook has two sheets: the original rows, and an `Enriched` sheet
with `District`, `Thana` and `resolution_source` appended. Unresolved values
are written as `Not found`.

---

*This documentation is generated from the CLI source code. To update, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("✅ Generated CLI documentation at: {}", file_path.display());

    Ok(())
}
