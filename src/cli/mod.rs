pub mod check;
pub mod report;
pub mod todo;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::{debug, info};

use crate::error::{AccountancyError, Result};
use crate::importer::{load_ledger, CorruptionPolicy};
use crate::models::IdentifiedTransaction;
use crate::settings::{load_config, resolve_rules_path, Config};

#[derive(Parser)]
#[command(
    name = "pico-accountancy",
    version,
    about = "CLI for very simple accountancy cases."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments shared by every conversion.
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// The source QIF bank statement
    pub source: PathBuf,
    /// The destination file
    pub destination: PathBuf,
    /// The path to the rule configuration (default: pico-accountancy.json)
    #[arg(short = 'r', long = "rules-path")]
    pub rules_path: Option<PathBuf>,
    /// Drop corrupted records instead of failing the whole run
    #[arg(long = "skip-corrupted")]
    pub skip_corrupted: bool,
}

impl ConvertArgs {
    pub fn policy(&self) -> CorruptionPolicy {
        if self.skip_corrupted {
            CorruptionPolicy::Skip
        } else {
            CorruptionPolicy::Abort
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a QIF bank statement to CSV.
    Bank {
        #[command(flatten)]
        args: ConvertArgs,
        /// Extra category columns, separated by commas (e.g. Rent,Legal,Shares)
        #[arg(short = 'c', long, value_delimiter = ',')]
        columns: Vec<String>,
    },
    /// Group a QIF bank statement by debit.
    Debit {
        #[command(flatten)]
        args: ConvertArgs,
    },
    /// Group a QIF bank statement by credit.
    Credit {
        #[command(flatten)]
        args: ConvertArgs,
    },
    /// Organise all the expenses from a QIF bank statement.
    Expenses {
        #[command(flatten)]
        args: ConvertArgs,
    },
    /// Summarize the total from a QIF bank statement.
    Total {
        #[command(flatten)]
        args: ConvertArgs,
    },
    /// Identify missing rules for a QIF bank statement.
    Todo {
        #[command(flatten)]
        args: ConvertArgs,
    },
    /// Check for obvious corruption of the QIF file.
    Check {
        #[command(flatten)]
        args: ConvertArgs,
    },
}

pub(crate) struct AccountancyDocs {
    pub config: Config,
    pub qif: String,
}

/// Load the rules configuration then the QIF source, failing on the first problem.
pub(crate) fn load_accountancy_files(args: &ConvertArgs) -> Result<AccountancyDocs> {
    let rules_path = resolve_rules_path(args.rules_path.as_deref());
    debug!("rules configuration: {}", rules_path.display());
    let config = load_config(&rules_path)?;
    let qif = std::fs::read_to_string(&args.source).map_err(|source| AccountancyError::SourceRead {
        path: args.source.display().to_string(),
        source,
    })?;
    Ok(AccountancyDocs { config, qif })
}

pub(crate) fn load_ledger_for(args: &ConvertArgs) -> Result<(Config, Vec<IdentifiedTransaction>)> {
    let docs = load_accountancy_files(args)?;
    let ledger = load_ledger(&docs.qif, &docs.config, args.policy())?;
    Ok((docs.config, ledger))
}

pub(crate) fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format!("{content}\n"))?;
    info!("wrote {}", path.display());
    Ok(())
}
