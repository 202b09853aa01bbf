use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Monetary direction of a transaction, taken from the sign of its amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Category {
    pub name: String,
    pub title: String,
    #[serde(rename = "category")]
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    #[serde(rename = "ifContains")]
    pub match_text: String,
    #[serde(rename = "about")]
    pub label: String,
    pub category: Category,
}

/// A complete record, categorized but not yet identified.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub yyyymmdd: String,
    pub direction: Direction,
    pub amount: String,
    pub debit: String,
    pub credit: String,
    pub description: String,
    pub label: Option<String>,
    pub category: Option<Category>,
}

impl Transaction {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    pub fn is_in(&self, category: &Category) -> bool {
        self.category_name() == Some(category.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifiedTransaction {
    pub id: String,
    pub transaction: Transaction,
}
