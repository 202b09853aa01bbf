//! Human-readable transaction identifiers.
//!
//! Identifiers depend on processing order: every (direction, category, month)
//! bucket numbers its transactions 1, 2, 3... in the order they are seen.
//! [`assign_ids`] fixes that order as the reverse of file order, so bank
//! statements listed newest first are numbered oldest first.

use std::sync::LazyLock;

use chrono::Datelike;
use log::trace;
use regex::Regex;

use crate::models::{Direction, IdentifiedTransaction, Transaction};

const MONTH_CODES: [char; 12] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L'];

/// Credit categories with their own counters. Anything else, including
/// uncategorized credits, shares the `todo` bucket.
pub const CREDIT_BUCKETS: [&str; 3] = ["Shares", "Interest", "Invoices"];
const DEFAULT_BUCKET: usize = CREDIT_BUCKETS.len();

static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new("-+").expect("valid regex"));

/// Per-month counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterState {
    debit: [u32; 12],
    credit: [[u32; 12]; CREDIT_BUCKETS.len() + 1],
}

impl CounterState {
    fn next_debit(&mut self, month: usize) -> u32 {
        self.debit[month] += 1;
        self.debit[month]
    }

    fn next_credit(&mut self, bucket: usize, month: usize) -> u32 {
        self.credit[bucket][month] += 1;
        self.credit[bucket][month]
    }
}

fn credit_bucket(category: Option<&str>) -> usize {
    category
        .and_then(|name| CREDIT_BUCKETS.iter().position(|b| *b == name))
        .unwrap_or(DEFAULT_BUCKET)
}

fn slug(label: &str) -> String {
    label.replace(' ', "-").to_uppercase()
}

fn present(label: &Option<String>) -> Option<&str> {
    label.as_deref().filter(|l| !l.is_empty())
}

/// Stateful id maker. Not meant to be shared: ids are only reproducible when a
/// fresh generator sees transactions in the same order.
#[derive(Debug, Default)]
pub struct IdGenerator {
    counters: CounterState,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.counters = CounterState::default();
    }

    /// `{yy}{month letter}-{0000}[-{LABEL}]`, e.g. `14B-0001` or `14A-0002-ABOUT`.
    pub fn make_debit_id(&mut self, txn: &Transaction) -> String {
        let year = txn.date.format("%y");
        let month = txn.date.month0() as usize;
        let code = MONTH_CODES[month];
        let num = self.counters.next_debit(month);
        let about = present(&txn.label)
            .map(|l| format!("-{}", slug(l)))
            .unwrap_or_default();
        format!("{year}{code}-{num:04}{about}")
    }

    /// `{yy}-{LABEL|todo}-{mm}[-{0000}]`; the counter is left out for the first
    /// transaction of a bucket in its month.
    pub fn make_credit_id(&mut self, txn: &Transaction) -> String {
        let yy = txn.date.format("%y");
        let mm = txn.date.format("%m");
        let month = txn.date.month0() as usize;
        let bucket = credit_bucket(txn.category_name());
        let num = self.counters.next_credit(bucket, month);
        let about = present(&txn.label)
            .map(slug)
            .unwrap_or_else(|| "todo".to_string());
        let id = if num == 1 {
            format!("{yy}-{about}-{mm}")
        } else {
            format!("{yy}-{about}-{mm}-{num:04}")
        };
        DASHES.replace_all(&id, "-").into_owned()
    }

    pub fn identify(&mut self, transaction: Transaction) -> IdentifiedTransaction {
        let id = match transaction.direction {
            Direction::Debit => self.make_debit_id(&transaction),
            Direction::Credit => self.make_credit_id(&transaction),
        };
        trace!("{} -> {id}", transaction.description);
        IdentifiedTransaction { id, transaction }
    }

    /// Start over from fresh counters and number `file_order` from its end.
    pub fn assign(&mut self, file_order: Vec<Transaction>) -> Vec<IdentifiedTransaction> {
        self.reset();
        file_order
            .into_iter()
            .rev()
            .map(|txn| self.identify(txn))
            .collect()
    }
}

/// Identify transactions given in file order.
///
/// The list is reversed once and then numbered front to back with fresh
/// counters: the last record of the file gets counter 1 in its bucket.
pub fn assign_ids(file_order: Vec<Transaction>) -> Vec<IdentifiedTransaction> {
    IdGenerator::new().assign(file_order)
}
