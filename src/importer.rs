use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::categorizer::Categorizer;
use crate::error::{RecordError, Result};
use crate::identifier::assign_ids;
use crate::models::{Category, Direction, IdentifiedTransaction, Transaction};
use crate::settings::Config;

// ---------------------------------------------------------------------------
// Line helpers
// ---------------------------------------------------------------------------

fn chomp<'a>(line: &'a str, prefix: char) -> &'a str {
    line.strip_prefix(prefix).unwrap_or(line)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let rest = chars.as_str().to_lowercase();
            first.to_uppercase().chain(rest.chars()).collect()
        }
        None => String::new(),
    }
}

/// `D07/04/2015` -> 2015-04-07. `None` when the text is not a day/month/year date.
pub fn parse_date(line: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(chomp(line, 'D').trim(), "%d/%m/%Y").ok()
}

/// `T-2.75` -> (Debit, "2.75"). The absolute value keeps its original text.
pub fn parse_amount(line: &str) -> (Direction, String) {
    let raw = collapse_whitespace(chomp(line, 'T'));
    match raw.strip_prefix('-') {
        Some(abs) => (Direction::Debit, abs.to_string()),
        None => (Direction::Credit, raw),
    }
}

/// Commas become spaces so the text can sit in a CSV field.
pub fn parse_description(line: &str) -> String {
    capitalize(&collapse_whitespace(&chomp(line, 'P').replace(',', " ")))
}

// ---------------------------------------------------------------------------
// Record assembly
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct DatePart {
    date: Option<NaiveDate>,
    raw: String,
}

#[derive(Debug, Clone)]
struct AmountPart {
    direction: Direction,
    amount: String,
}

#[derive(Debug, Clone)]
struct DescriptionPart {
    description: String,
    label: Option<String>,
    category: Option<Category>,
}

#[derive(Debug, Default)]
struct CompositeRecord {
    date: Option<DatePart>,
    amount: Option<AmountPart>,
    description: Option<DescriptionPart>,
}

impl CompositeRecord {
    fn is_blank(&self) -> bool {
        self.date.is_none() && self.amount.is_none() && self.description.is_none()
    }
}

pub type RecordResult = std::result::Result<Transaction, RecordError>;

fn join_parts(
    date: DatePart,
    amount: Option<AmountPart>,
    description: Option<DescriptionPart>,
    line: usize,
) -> RecordResult {
    let amount = amount.ok_or(RecordError::MissingAmount { line })?;
    let desc = description.ok_or(RecordError::MissingDescription { line })?;
    let Some(day) = date.date else {
        return Err(RecordError::InvalidDate { line, raw: date.raw });
    };
    let (debit, credit) = match amount.direction {
        Direction::Debit => (amount.amount.clone(), String::new()),
        Direction::Credit => (String::new(), amount.amount.clone()),
    };
    Ok(Transaction {
        date: day,
        yyyymmdd: day.format("%Y-%m-%d").to_string(),
        direction: amount.direction,
        amount: amount.amount,
        debit,
        credit,
        description: desc.description,
        label: desc.label,
        category: desc.category,
    })
}

/// Turns a stream of tagged lines into transactions, one record at a time.
pub struct RecordAssembler<'a> {
    categorizer: Categorizer<'a>,
    pending: CompositeRecord,
    line_no: usize,
    empty_records: usize,
}

impl<'a> RecordAssembler<'a> {
    pub fn new(categorizer: Categorizer<'a>) -> Self {
        Self {
            categorizer,
            pending: CompositeRecord::default(),
            line_no: 0,
            empty_records: 0,
        }
    }

    /// Feed one line. Returns a result only when `^` closes a record that has
    /// a date part; a terminator without one drops the record silently.
    pub fn consume_line(&mut self, line: &str) -> Option<RecordResult> {
        self.line_no += 1;
        match line.chars().next() {
            Some('^') => {
                let record = std::mem::take(&mut self.pending);
                match record.date {
                    Some(date) => Some(join_parts(date, record.amount, record.description, self.line_no)),
                    None => {
                        self.empty_records += 1;
                        None
                    }
                }
            }
            Some('D') => {
                self.pending.date = Some(DatePart {
                    date: parse_date(line),
                    raw: chomp(line, 'D').trim().to_string(),
                });
                None
            }
            Some('T') => {
                let (direction, amount) = parse_amount(line);
                self.pending.amount = Some(AmountPart { direction, amount });
                None
            }
            Some('P') => {
                let description = parse_description(line);
                let rule = self.categorizer.categorize(&description);
                debug!("line {}: {description:?} -> {:?}", self.line_no, rule.map(|r| &r.category.name));
                self.pending.description = Some(DescriptionPart {
                    description,
                    label: rule.map(|r| r.label.clone()),
                    category: rule.map(|r| r.category.clone()),
                });
                None
            }
            _ => None,
        }
    }

    pub fn empty_records(&self) -> usize {
        self.empty_records
    }

    /// Whether input ended with fields that never saw a terminator.
    pub fn has_unterminated(&self) -> bool {
        !self.pending.is_blank()
    }
}

/// What to do with a record that reaches `^` without all of its parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptionPolicy {
    #[default]
    Abort,
    Skip,
}

/// Every record outcome in file order.
pub fn parse_qif<'a>(qif: &str, categorizer: Categorizer<'a>) -> (Vec<RecordResult>, RecordAssembler<'a>) {
    let mut assembler = RecordAssembler::new(categorizer);
    let outcomes: Vec<RecordResult> = qif
        .lines()
        .filter_map(|line| assembler.consume_line(line))
        .collect();
    (outcomes, assembler)
}

/// Complete transactions in file order, with corrupted records handled per `policy`.
pub fn qif_to_rows(qif: &str, config: &Config, policy: CorruptionPolicy) -> Result<Vec<Transaction>> {
    let categorizer = Categorizer::new(&config.rules, config.rule_match);
    let (outcomes, assembler) = parse_qif(qif, categorizer);
    if assembler.has_unterminated() {
        warn!("input ends with an unterminated record, it is ignored");
    }

    let mut rows = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match (outcome, policy) {
            (Ok(txn), _) => rows.push(txn),
            (Err(e), CorruptionPolicy::Abort) => return Err(e.into()),
            (Err(e), CorruptionPolicy::Skip) => warn!("skipping corrupted {e}"),
        }
    }
    Ok(rows)
}

/// Parse, categorize and identify a whole statement.
pub fn load_ledger(qif: &str, config: &Config, policy: CorruptionPolicy) -> Result<Vec<IdentifiedTransaction>> {
    let rows = qif_to_rows(qif, config, policy)?;
    let ledger = assign_ids(rows);
    info!("{} transactions identified", ledger.len());
    Ok(ledger)
}

// ---------------------------------------------------------------------------
// Structural check
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq)]
pub struct QifCheck {
    pub date_lines: usize,
    pub amount_lines: usize,
    pub description_lines: usize,
    pub terminators: usize,
    pub records: usize,
    pub empty_records: usize,
    pub corrupted: Vec<RecordError>,
    pub unterminated: bool,
}

impl QifCheck {
    pub fn is_clean(&self) -> bool {
        self.corrupted.is_empty() && !self.unterminated
    }
}

fn count_starts_with(lines: &[&str], prefix: char) -> usize {
    lines.iter().filter(|l| l.starts_with(prefix)).count()
}

/// Look for obvious corruption without aborting on it.
pub fn verify_qif(qif: &str, config: &Config) -> QifCheck {
    let lines: Vec<&str> = qif.lines().collect();
    let categorizer = Categorizer::new(&config.rules, config.rule_match);
    let (outcomes, assembler) = parse_qif(qif, categorizer);
    let mut check = QifCheck {
        date_lines: count_starts_with(&lines, 'D'),
        amount_lines: count_starts_with(&lines, 'T'),
        description_lines: count_starts_with(&lines, 'P'),
        terminators: count_starts_with(&lines, '^'),
        empty_records: assembler.empty_records(),
        unterminated: assembler.has_unterminated(),
        ..QifCheck::default()
    };
    for outcome in outcomes {
        match outcome {
            Ok(_) => check.records += 1,
            Err(e) => check.corrupted.push(e),
        }
    }
    check
}
