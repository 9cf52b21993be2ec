//! Transaction domain models.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, Result};

/// Which tab a transaction was recorded under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expenses,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expenses => "expenses",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expenses" | "expense" => Ok(TransactionKind::Expenses),
            other => Err(Error::invalid_input(format!(
                "Unknown transaction kind '{}'",
                other
            ))),
        }
    }
}

/// Domain model representing a recorded income or expense
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub category: String,
    pub amount: f64,
    pub user_id: Option<String>,
    pub timestamp: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// Input model for recording a transaction
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub category: String,
    pub amount: f64,
    pub user_id: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
}

impl NewTransaction {
    /// Trims text fields, checks the amount and fills in the timestamp.
    pub fn validate(self) -> Result<NewTransaction> {
        let category = self.category.trim().to_string();
        if category.is_empty() {
            return Err(Error::invalid_input("Category cannot be empty"));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::invalid_input(format!(
                "Transaction amount must be positive, got {}",
                self.amount
            )));
        }
        Ok(NewTransaction {
            category,
            user_id: self
                .user_id
                .map(|user| user.trim().to_string())
                .filter(|user| !user.is_empty()),
            timestamp: Some(self.timestamp.unwrap_or_else(|| Utc::now().naive_utc())),
            ..self
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub user_id: Option<String>,
}

/// Sum of transactions in one category.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
    pub transaction_count: usize,
}
