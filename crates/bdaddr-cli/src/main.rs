//! bdaddr CLI - main entry point

use bdaddr_cli::{
    commands::{
        enrich::{self, EnrichOptions},
        gazetteer,
        lookup::{self, LookupOptions},
    },
    Cli, Commands, GazetteerCommand,
};
use bdaddr_common::logging::{init_logging, ConsoleStream, LogConfig, LogLevel, LogOutput};
use clap::Parser;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Verbose mode logs debug output, otherwise only warnings and errors.
    // Logs stay on stderr so `lookup --format json` output can be piped.
    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .output(LogOutput::Console)
        .console_stream(ConsoleStream::Stderr)
        .log_file_prefix("bdaddr-cli")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging, so a failed init is not fatal
    let _log_guard = init_logging(&log_config).ok().flatten();

    if let Err(e) = execute_command(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: Cli) -> bdaddr_cli::Result<()> {
    let nominatim_url = cli.nominatim_url;

    match cli.command {
        Commands::Enrich {
            input,
            output,
            address_col,
            mode,
            sheet_index,
            gazetteer,
            cache,
        } => {
            enrich::run(EnrichOptions {
                input,
                output,
                address_col,
                mode,
                sheet_index,
                gazetteer,
                cache,
                nominatim_url,
            })
            .await
        },

        Commands::Lookup {
            address,
            mode,
            gazetteer,
            cache,
            format,
        } => {
            lookup::run(LookupOptions {
                address,
                mode,
                gazetteer,
                cache,
                format,
                nominatim_url,
            })
            .await
        },

        Commands::Gazetteer { command } => match command {
            GazetteerCommand::Export { output, force } => gazetteer::export(&output, force).await,
        },
    }
}
