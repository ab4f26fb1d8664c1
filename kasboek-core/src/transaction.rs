//! Canonical transaction record produced by statement normalization

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::KasboekError;

/// Label used when no transaction type could be determined
pub const UNKNOWN_TYPE: &str = "Unknown";

/// Supported issuing banks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Bank {
    #[serde(rename = "ABN Amro")]
    AbnAmro,
    #[serde(rename = "ING")]
    Ing,
}

impl Bank {
    pub const ALL: [Bank; 2] = [Bank::AbnAmro, Bank::Ing];

    /// Human-readable name, also stored on every record
    pub fn name(&self) -> &'static str {
        match self {
            Bank::AbnAmro => "ABN Amro",
            Bank::Ing => "ING",
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Bank {
    type Err = KasboekError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        match key.as_str() {
            "abn" | "abnamro" => Ok(Bank::AbnAmro),
            "ing" => Ok(Bank::Ing),
            _ => Err(KasboekError::UnsupportedFormat(format!("unsupported bank: {}", s.trim()))),
        }
    }
}

/// A normalized statement row, independent of the source bank format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalTransaction {
    pub date: NaiveDate,
    /// Negative = money out, positive = money in
    pub amount: Decimal,
    /// Original casing preserved
    pub description: String,
    pub transaction_type: String,
    pub bank: Bank,
}

/// Key a storage layer uses to skip rows it has already persisted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub bank: Bank,
    pub transaction_type: String,
}

impl CanonicalTransaction {
    pub fn new(
        date: NaiveDate,
        amount: Decimal,
        description: impl Into<String>,
        transaction_type: impl Into<String>,
        bank: Bank,
    ) -> Self {
        Self {
            date,
            amount,
            description: description.into(),
            transaction_type: transaction_type.into(),
            bank,
        }
    }

    /// Returns true if money left the account
    pub fn is_expense(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Returns true if money came in
    pub fn is_income(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    pub fn abs_amount(&self) -> Decimal {
        self.amount.abs()
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            date: self.date,
            description: self.description.clone(),
            amount: self.amount.normalize(),
            bank: self.bank,
            transaction_type: self.transaction_type.clone(),
        }
    }
}
