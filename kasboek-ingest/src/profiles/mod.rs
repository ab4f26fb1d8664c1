//! Bank profile registry: the format contract for each bank × file kind.

pub mod abn_amro;
pub mod ing;

use kasboek_core::{Bank, Result};

use crate::types::FileKind;

/// Canonical fields a raw column can be mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Date,
    Amount,
    Description,
    TransactionType,
}

/// How the sign of the amount is determined
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountPolicy {
    /// Amounts are already signed
    None,
    /// Amounts are magnitudes; rows whose flag equals the debit token
    /// (trimmed, case-insensitive) are negated.
    SignFromFlagColumn {
        column: String,
        debit_token: String,
    },
}

/// Where `transaction_type` comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeStrategy {
    /// Run the description through the transaction-type cascade
    RegexCascade,
    /// Copy a raw column verbatim
    SourceColumn(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankProfile {
    pub bank: Bank,
    pub file_kind: FileKind,
    /// Raw columns that must be present, in the bank's own order
    pub required_columns: Vec<String>,
    /// Raw column name → canonical field
    pub column_mapping: Vec<(String, CanonicalField)>,
    /// Strict chrono pattern, no fallbacks
    pub date_format: String,
    pub amount_policy: AmountPolicy,
    /// Comma is the decimal separator and must become a period before parsing
    pub comma_decimal: bool,
    pub type_strategy: TypeStrategy,
}

impl BankProfile {
    /// Raw column mapped to `field`, if any
    pub fn source_column(&self, field: CanonicalField) -> Option<&str> {
        self.column_mapping
            .iter()
            .find(|(_, f)| *f == field)
            .map(|(raw, _)| raw.as_str())
    }
}

/// Look up the profile for a bank and file kind.
pub fn profile_for(bank: Bank, kind: FileKind) -> Result<BankProfile> {
    match bank {
        Bank::AbnAmro => Ok(abn_amro::profile(kind)),
        Bank::Ing => Ok(ing::profile(kind)),
    }
}

pub(crate) fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
