use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{load_accountancy_files, write_output, ConvertArgs};
use crate::error::Result;
use crate::importer::verify_qif;
use crate::reports::{check_report, check_rows};

/// Structural check of the statement. Corruption is reported, never fatal.
pub fn run(args: &ConvertArgs) -> Result<()> {
    let docs = load_accountancy_files(args)?;
    let check = verify_qif(&docs.qif, &docs.config);
    write_output(&args.destination, &check_report(&check)?)?;

    let mut table = Table::new();
    table.set_header(vec!["Check", "Value"]);
    for (name, value) in check_rows(&check) {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    println!("QIF check\n{table}");

    if check.is_clean() {
        println!("{}", "No corruption found.".green());
    } else {
        println!("{}", "The QIF file looks corrupted.".red().bold());
    }
    Ok(())
}
