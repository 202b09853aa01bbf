mod categorizer;
mod cli;
mod error;
mod fmt;
mod identifier;
mod importer;
mod models;
mod reports;
mod settings;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Bank { args, columns } => cli::report::bank(&args, &columns),
        Commands::Debit { args } => cli::report::debit(&args),
        Commands::Credit { args } => cli::report::credit(&args),
        Commands::Expenses { args } => cli::report::expenses(&args),
        Commands::Total { args } => cli::report::total(&args),
        Commands::Todo { args } => cli::todo::run(&args),
        Commands::Check { args } => cli::check::run(&args),
    };

    match result {
        Ok(()) => println!(
            "{}",
            format!("\u{2713} Done. Version {}", env!("CARGO_PKG_VERSION")).green()
        ),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
