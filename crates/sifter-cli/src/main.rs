//! Sifter CLI - clean messy tabular data and report on its quality.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Clean {
            files,
            output,
            format,
            report,
            pipeline,
        } => commands::clean::run(files, output, format, report, pipeline),

        Commands::Profile {
            files,
            json,
            pipeline,
        } => commands::profile::run(files, json, pipeline, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
