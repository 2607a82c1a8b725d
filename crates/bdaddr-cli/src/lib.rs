//! Address enricher CLI library
//!
//! Runs the enrichment engine on local files:
//!
//! - **Workbooks**: add District and Thana columns to an `.xlsx` (`bdaddr enrich`)
//! - **Single addresses**: resolve one address and print it (`bdaddr lookup`)
//! - **Gazetteer**: write the bundled gazetteer as a template (`bdaddr gazetteer export`)

pub mod commands;
pub mod error;
pub mod progress;

// Re-export commonly used types
pub use error::{CliError, Result};

use std::path::PathBuf;

use bdaddr_common::EnrichMode;
use clap::{Parser, Subcommand, ValueEnum};

/// Default location of the address cache, relative to the working directory
pub const DEFAULT_CACHE_FILE: &str = "cache_geocode.csv";

/// bdaddr - add District and Thana to Bangladeshi addresses
#[derive(Parser, Debug)]
#[command(name = "bdaddr")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base URL of the Nominatim service used for online lookups
    #[arg(long, env = "BDADDR_NOMINATIM_URL", global = true)]
    pub nominatim_url: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enrich a workbook with District and Thana columns
    Enrich {
        /// Input workbook (.xlsx)
        #[arg(short, long)]
        input: PathBuf,

        /// Output workbook (defaults to <input>_enriched.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Header of the address column (detected when omitted)
        #[arg(short, long)]
        address_col: Option<String>,

        /// Resolution mode: auto, offline or online
        #[arg(short, long, default_value = "auto")]
        mode: EnrichMode,

        /// Zero-based worksheet index
        #[arg(long, default_value_t = 0)]
        sheet_index: usize,

        /// Custom gazetteer CSV
        #[arg(short, long)]
        gazetteer: Option<PathBuf>,

        /// Cache CSV, loaded at start and saved at the end
        #[arg(short, long, default_value = DEFAULT_CACHE_FILE)]
        cache: PathBuf,
    },

    /// Resolve a single address
    Lookup {
        /// Free-text address
        address: String,

        /// Resolution mode: auto, offline or online
        #[arg(short, long, default_value = "auto")]
        mode: EnrichMode,

        /// Custom gazetteer CSV
        #[arg(short, long)]
        gazetteer: Option<PathBuf>,

        /// Cache CSV, loaded at start and saved at the end
        #[arg(short, long, default_value = DEFAULT_CACHE_FILE)]
        cache: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Gazetteer utilities
    Gazetteer {
        #[command(subcommand)]
        command: GazetteerCommand,
    },
}

/// Gazetteer subcommands
#[derive(Subcommand, Debug)]
pub enum GazetteerCommand {
    /// Write the bundled gazetteer as a CSV template
    Export {
        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for `lookup`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_enrich_defaults() {
        let cli = Cli::try_parse_from(["bdaddr", "enrich", "--input", "in.xlsx"]).unwrap();
        match cli.command {
            Commands::Enrich {
                mode,
                sheet_index,
                cache,
                output,
                ..
            } => {
                assert_eq!(mode, EnrichMode::Auto);
                assert_eq!(sheet_index, 0);
                assert_eq!(cache, PathBuf::from("cache_geocode.csv"));
                assert!(output.is_none());
            },
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_mode_is_parsed() {
        let cli =
            Cli::try_parse_from(["bdaddr", "lookup", "Mirpur, Dhaka", "--mode", "offline"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Lookup {
                mode: EnrichMode::Offline,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["bdaddr", "lookup", "x", "--mode", "fast"]).is_err());
    }
}
