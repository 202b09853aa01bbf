use log::warn;

use crate::error::Result;
use crate::fmt::{csv_line, number, parse_decimal, round2};
use crate::importer::QifCheck;
use crate::models::{Category, Direction, IdentifiedTransaction};
use crate::settings::Config;

const UNCATEGORIZED: &str = "TODO";

// ---------------------------------------------------------------------------
// Sums
// ---------------------------------------------------------------------------

fn sum<'a>(values: impl Iterator<Item = &'a str>) -> f64 {
    let total = values.fold(0.0, |acc, raw| {
        acc + parse_decimal(raw).unwrap_or_else(|| {
            warn!("amount {raw:?} is not a number, counted as 0");
            0.0
        })
    });
    round2(total)
}

fn in_category<'a>(
    ledger: &'a [IdentifiedTransaction],
    direction: Direction,
    category: &'a Category,
) -> impl Iterator<Item = &'a IdentifiedTransaction> {
    ledger
        .iter()
        .filter(move |t| t.transaction.direction == direction && t.transaction.is_in(category))
}

pub fn total_debit(ledger: &[IdentifiedTransaction]) -> f64 {
    sum(ledger
        .iter()
        .filter(|t| t.transaction.direction == Direction::Debit)
        .map(|t| t.transaction.debit.as_str()))
}

pub fn total_credit(ledger: &[IdentifiedTransaction]) -> f64 {
    sum(ledger
        .iter()
        .filter(|t| t.transaction.direction == Direction::Credit)
        .map(|t| t.transaction.credit.as_str()))
}

/// Sum of the unsigned `amount` of every transaction in `category`, whatever its direction.
pub fn total_by_category(ledger: &[IdentifiedTransaction], category: &Category) -> f64 {
    sum(ledger
        .iter()
        .filter(|t| t.transaction.is_in(category))
        .map(|t| t.transaction.amount.as_str()))
}

// ---------------------------------------------------------------------------
// Full ledger
// ---------------------------------------------------------------------------

const LEDGER_HEADERS: [&str; 7] = ["Date", "Description", "Credit", "Debit", "Id", "Type", "Category"];

/// One row per transaction in identifier order. Each extra column carries the
/// amount when the transaction's category has that name.
pub fn full_report(ledger: &[IdentifiedTransaction], extra_columns: &[String]) -> Result<String> {
    let header = LEDGER_HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain(extra_columns.iter().cloned());
    let mut lines = vec![csv_line(header)?];

    for row in ledger {
        let txn = &row.transaction;
        let category = txn.category_name().unwrap_or(UNCATEGORIZED);
        let mut fields = vec![
            txn.yyyymmdd.clone(),
            txn.description.clone(),
            txn.credit.clone(),
            txn.debit.clone(),
            format!("'{}", row.id),
            txn.direction.as_str().to_string(),
            category.to_string(),
        ];
        fields.extend(extra_columns.iter().map(|col| {
            if col == category {
                txn.amount.clone()
            } else {
                String::new()
            }
        }));
        lines.push(csv_line(fields)?);
    }
    Ok(lines.join("\n"))
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

fn summary(ledger: &[IdentifiedTransaction], config: &Config, direction: Direction) -> Result<String> {
    let mut lines = Vec::new();
    for cat in config.categories_by(direction) {
        let amounts: Vec<&str> = in_category(ledger, direction, cat)
            .map(|t| match direction {
                Direction::Debit => t.transaction.debit.as_str(),
                Direction::Credit => t.transaction.credit.as_str(),
            })
            .collect();
        if amounts.is_empty() {
            lines.push(cat.name.clone());
        } else {
            let total = sum(amounts.into_iter());
            lines.push(csv_line([cat.name.clone(), number(total)])?);
        }
    }
    Ok(lines.join("\n"))
}

/// `"Rent","250"` per debit category in configuration order; bare name when unused.
pub fn expense_summary(ledger: &[IdentifiedTransaction], config: &Config) -> Result<String> {
    summary(ledger, config, Direction::Debit)
}

pub fn credit_summary(ledger: &[IdentifiedTransaction], config: &Config) -> Result<String> {
    summary(ledger, config, Direction::Credit)
}

/// Every debit category followed by the id and debit of each of its transactions.
pub fn expense_groups(ledger: &[IdentifiedTransaction], config: &Config) -> Result<String> {
    let mut lines = Vec::new();
    for cat in config.categories_by(Direction::Debit) {
        lines.push(cat.name.clone());
        for row in in_category(ledger, Direction::Debit, cat) {
            let id = format!("'{}", row.id);
            lines.push(csv_line(["", id.as_str(), row.transaction.debit.as_str()])?);
        }
    }
    Ok(lines.join("\n"))
}

pub fn total_summary(ledger: &[IdentifiedTransaction], config: &Config) -> String {
    let mut lines = vec![
        "Summary:".to_string(),
        format!("credit: {}", number(total_credit(ledger))),
        format!("debit: {}", number(total_debit(ledger))),
        String::new(),
        "By category:".to_string(),
    ];
    lines.extend(
        config
            .categories
            .iter()
            .map(|cat| format!("{}: {}", cat.name, number(total_by_category(ledger, cat)))),
    );
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Housekeeping
// ---------------------------------------------------------------------------

/// Transactions no rule matched, so the missing rules can be written.
pub fn todo_report(ledger: &[IdentifiedTransaction]) -> Result<String> {
    let mut lines = vec![csv_line(["Id", "Date", "Description", "Credit", "Debit"])?];
    for row in ledger.iter().filter(|t| t.transaction.category.is_none()) {
        let txn = &row.transaction;
        lines.push(csv_line([
            format!("'{}", row.id),
            txn.yyyymmdd.clone(),
            txn.description.clone(),
            txn.credit.clone(),
            txn.debit.clone(),
        ])?);
    }
    Ok(lines.join("\n"))
}

pub fn check_rows(check: &QifCheck) -> Vec<(String, String)> {
    let mut rows = vec![
        ("Date lines".to_string(), check.date_lines.to_string()),
        ("Amount lines".to_string(), check.amount_lines.to_string()),
        ("Description lines".to_string(), check.description_lines.to_string()),
        ("Terminators".to_string(), check.terminators.to_string()),
        ("Records".to_string(), check.records.to_string()),
        ("Empty records".to_string(), check.empty_records.to_string()),
        ("Corrupted records".to_string(), check.corrupted.len().to_string()),
        (
            "Unterminated record".to_string(),
            if check.unterminated { "yes" } else { "no" }.to_string(),
        ),
    ];
    rows.extend(
        check
            .corrupted
            .iter()
            .map(|e| (format!("Line {}", e.line()), e.to_string())),
    );
    rows
}

pub fn check_report(check: &QifCheck) -> Result<String> {
    let mut lines = vec![csv_line(["Check", "Value"])?];
    for (name, value) in check_rows(check) {
        lines.push(csv_line([name, value])?);
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::{load_ledger, verify_qif, CorruptionPolicy};
    use crate::settings::sample_config;

    const SAMPLE: &str = include_str!("../tests/fixtures/sample.qif");

    fn ledger() -> Vec<IdentifiedTransaction> {
        load_ledger(SAMPLE, &sample_config(), CorruptionPolicy::Abort).unwrap()
    }

    fn category(config: &Config, name: &str) -> Category {
        config
            .categories
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_sample_ids() {
        let ids: Vec<String> = ledger().into_iter().map(|t| t.id).collect();
        assert_eq!(
            ids,
            vec![
                "15-CAP-02",
                "15B-0001-CONTRACT",
                "15C-0001-SPACE-1",
                "15C-0002-CONTRACT",
                "15C-0003-GOOGLE",
                "15C-0004-STUFF",
                "15-INTEREST-03",
            ]
        );
    }

    #[test]
    fn test_full_report() {
        let columns: Vec<String> = ["Rent", "Legal", "Shares", "Interest", "Invoices"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let expected = [
            r#""Date","Description","Credit","Debit","Id","Type","Category","Rent","Legal","Shares","Interest","Invoices""#,
            r#""2015-02-20","Shares issue","250.00","","'15-CAP-02","CREDIT","Shares","","","250.00","","""#,
            r#""2015-02-27","Companies house","","13.00","'15B-0001-CONTRACT","DEBIT","Legal","","13.00","","","""#,
            r#""2015-03-02","Direct debit ltd-management","","250.00","'15C-0001-SPACE-1","DEBIT","Rent","250.00","","","","""#,
            r#""2015-03-10","Card payment to ltd contract 789","","112.48","'15C-0002-CONTRACT","DEBIT","Legal","","112.48","","","""#,
            r#""2015-03-12","Card payment to google *svcsapps 3.30 gbp","","3.30","'15C-0003-GOOGLE","DEBIT","Administration","","","","","""#,
            r#""2015-03-16","Card payment to ltd r/t 28.78 gbp on 16-03-2015 28.78","","28.78","'15C-0004-STUFF","DEBIT","Administration","","","","","""#,
            r#""2015-03-31","Interest (gross)","0.02","","'15-INTEREST-03","CREDIT","Interest","","","","0.02","""#,
        ]
        .join("\n");
        assert_eq!(full_report(&ledger(), &columns).unwrap(), expected);
    }

    #[test]
    fn test_full_report_is_reproducible() {
        let columns = vec!["Rent".to_string()];
        assert_eq!(
            full_report(&ledger(), &columns).unwrap(),
            full_report(&ledger(), &columns).unwrap()
        );
    }

    #[test]
    fn test_uncategorized_shows_todo() {
        let qif = "D01/04/2015\nT-9.99\nPMYSTERY SHOP\n^\n";
        let ledger = load_ledger(qif, &sample_config(), CorruptionPolicy::Abort).unwrap();
        let report = full_report(&ledger, &[]).unwrap();
        assert!(report.ends_with(r#""2015-04-01","Mystery shop","","9.99","'15D-0001","DEBIT","TODO""#));
    }

    #[test]
    fn test_expense_summary() {
        let expected = [
            r#""Rent","250""#,
            "Insurance",
            "Cash",
            r#""Administration","32.08""#,
            "Utilities",
            r#""Legal","125.48""#,
        ]
        .join("\n");
        assert_eq!(expense_summary(&ledger(), &sample_config()).unwrap(), expected);
    }

    #[test]
    fn test_credit_summary() {
        let expected = [r#""Shares","250""#, r#""Interest","0.02""#, "Invoices"].join("\n");
        assert_eq!(credit_summary(&ledger(), &sample_config()).unwrap(), expected);
    }

    #[test]
    fn test_expense_groups() {
        let expected = [
            "Rent",
            r#""","'15C-0001-SPACE-1","250.00""#,
            "Insurance",
            "Cash",
            "Administration",
            r#""","'15C-0003-GOOGLE","3.30""#,
            r#""","'15C-0004-STUFF","28.78""#,
            "Utilities",
            "Legal",
            r#""","'15B-0001-CONTRACT","13.00""#,
            r#""","'15C-0002-CONTRACT","112.48""#,
        ]
        .join("\n");
        assert_eq!(expense_groups(&ledger(), &sample_config()).unwrap(), expected);
    }

    #[test]
    fn test_totals() {
        let ledger = ledger();
        assert_eq!(total_debit(&ledger), 407.56);
        assert_eq!(total_credit(&ledger), 250.02);
        let config = sample_config();
        assert_eq!(total_by_category(&ledger, &category(&config, "Interest")), 0.02);
        assert_eq!(total_by_category(&ledger, &category(&config, "Legal")), 125.48);
        assert_eq!(total_by_category(&ledger, &category(&config, "Cash")), 0.0);
    }

    #[test]
    fn test_debit_plus_credit_is_all_amounts() {
        let ledger = ledger();
        let all = sum(ledger.iter().map(|t| t.transaction.amount.as_str()));
        assert_eq!(round2(total_debit(&ledger) + total_credit(&ledger)), all);
    }

    #[test]
    fn test_unparsable_amount_counts_as_zero() {
        let qif = "D01/04/2015\nT-abc\nPMYSTERY\n^\nD02/04/2015\nT-1.50\nPOTHER\n^\n";
        let ledger = load_ledger(qif, &sample_config(), CorruptionPolicy::Abort).unwrap();
        assert_eq!(total_debit(&ledger), 1.5);
    }

    #[test]
    fn test_special_float_amounts_count_as_zero() {
        let qif = "D01/04/2015\nT-nan\nPA\n^\nD02/04/2015\nT-1.50\nPB\n^\nD03/04/2015\nT-1e3\nPC\n^\nD04/04/2015\nTinf\nPD\n^\n";
        let ledger = load_ledger(qif, &sample_config(), CorruptionPolicy::Abort).unwrap();
        assert_eq!(total_debit(&ledger), 1.5);
        assert_eq!(total_credit(&ledger), 0.0);
    }

    #[test]
    fn test_sums_round_halves_up() {
        let qif = "D01/04/2015\nT-0.125\nPA\n^\nD02/04/2015\nT-1.005\nPB\n^\n";
        let ledger = load_ledger(qif, &sample_config(), CorruptionPolicy::Abort).unwrap();
        assert_eq!(total_debit(&ledger), 1.13);
    }

    #[test]
    fn test_empty_totals_are_plain_zero() {
        let qif = "D01/04/2015\nT5.00\nPSHARES ISSUE\n^\n";
        let ledger = load_ledger(qif, &sample_config(), CorruptionPolicy::Abort).unwrap();
        let text = total_summary(&ledger, &sample_config());
        assert!(text.contains("\ndebit: 0\n"));
        assert!(!text.contains("-0"));
    }

    #[test]
    fn test_total_summary() {
        let text = total_summary(&ledger(), &sample_config());
        assert!(text.starts_with("Summary:\ncredit: 250.02\ndebit: 407.56\n"));
        assert!(text.contains("\nInterest: 0.02\n"));
        assert!(text.contains("\nInsurance: 0\n"));
        assert!(text.ends_with("\nInvoices: 0"));
        assert!(!text.contains("-0"));
    }

    #[test]
    fn test_todo_report() {
        let qif = "D01/04/2015\nT-9.99\nPMYSTERY SHOP\n^\nD02/04/2015\nT-13.00\nPCOMPANIES HOUSE\n^\n";
        let ledger = load_ledger(qif, &sample_config(), CorruptionPolicy::Abort).unwrap();
        let expected = [
            r#""Id","Date","Description","Credit","Debit""#,
            r#""'15D-0002","2015-04-01","Mystery shop","","9.99""#,
        ]
        .join("\n");
        assert_eq!(todo_report(&ledger).unwrap(), expected);
    }

    #[test]
    fn test_check_report() {
        let check = verify_qif("D01/01/2015\nPA\n^\n", &sample_config());
        let report = check_report(&check).unwrap();
        assert!(report.starts_with(r#""Check","Value""#));
        assert!(report.contains(r#""Corrupted records","1""#));
        assert!(report.ends_with(r#""Line 3","record ending at line 3 has no amount""#));
    }
}
