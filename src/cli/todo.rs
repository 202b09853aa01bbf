use colored::Colorize;

use crate::cli::{load_ledger_for, write_output, ConvertArgs};
use crate::error::Result;
use crate::reports::todo_report;

pub fn run(args: &ConvertArgs) -> Result<()> {
    let (_, ledger) = load_ledger_for(args)?;
    let missing = ledger
        .iter()
        .filter(|t| t.transaction.category.is_none())
        .count();
    write_output(&args.destination, &todo_report(&ledger)?)?;

    if missing == 0 {
        println!("{}", "Every transaction matches a rule.".green());
    } else {
        println!(
            "{} of {} transactions have no matching rule",
            missing.to_string().yellow().bold(),
            ledger.len()
        );
    }
    Ok(())
}
