use comfy_table::{Cell, Table};

use crate::cli::{load_ledger_for, write_output, ConvertArgs};
use crate::error::Result;
use crate::fmt::money;
use crate::reports;

pub fn bank(args: &ConvertArgs, columns: &[String]) -> Result<()> {
    let (_, ledger) = load_ledger_for(args)?;
    write_output(&args.destination, &reports::full_report(&ledger, columns)?)
}

pub fn debit(args: &ConvertArgs) -> Result<()> {
    let (config, ledger) = load_ledger_for(args)?;
    write_output(&args.destination, &reports::expense_summary(&ledger, &config)?)
}

pub fn credit(args: &ConvertArgs) -> Result<()> {
    let (config, ledger) = load_ledger_for(args)?;
    write_output(&args.destination, &reports::credit_summary(&ledger, &config)?)
}

pub fn expenses(args: &ConvertArgs) -> Result<()> {
    let (config, ledger) = load_ledger_for(args)?;
    write_output(&args.destination, &reports::expense_groups(&ledger, &config)?)
}

pub fn total(args: &ConvertArgs) -> Result<()> {
    let (config, ledger) = load_ledger_for(args)?;
    write_output(&args.destination, &reports::total_summary(&ledger, &config))?;

    let mut table = Table::new();
    table.set_header(vec!["Category", "Type", "Total"]);
    for cat in &config.categories {
        table.add_row(vec![
            Cell::new(&cat.title),
            Cell::new(cat.direction.as_str()),
            Cell::new(money(reports::total_by_category(&ledger, cat))),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total credit"),
        Cell::new(""),
        Cell::new(money(reports::total_credit(&ledger))),
    ]);
    table.add_row(vec![
        Cell::new("Total debit"),
        Cell::new(""),
        Cell::new(money(reports::total_debit(&ledger))),
    ]);
    println!("Totals\n{table}");
    Ok(())
}
