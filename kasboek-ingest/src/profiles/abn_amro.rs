//! ABN AMRO exports.
//!
//! Spreadsheet (.xlsx/.xls) header, already lower-case:
//!   accountNumber | mutationcode | transactiondate | valuedate | startsaldo | endsaldo | amount | description
//!   123456789     | EUR          | 20240302        | 20240302  | 1000,00    | 987,66   | -12.34 | BEA, Betaalpas ...
//!
//! CSV exports use title-case headers (`Transaction Date`, `Amount`, `Description`).
//! Neither carries a transaction type, so it is derived from the description.

use kasboek_core::Bank;

use super::{AmountPolicy, BankProfile, CanonicalField, TypeStrategy, columns};
use crate::types::FileKind;

pub const DATE_FORMAT: &str = "%Y%m%d";

pub fn profile(kind: FileKind) -> BankProfile {
    let (date, amount, description) = match kind {
        FileKind::Spreadsheet => ("transactiondate", "amount", "description"),
        FileKind::Delimited => ("Transaction Date", "Amount", "Description"),
    };

    BankProfile {
        bank: Bank::AbnAmro,
        file_kind: kind,
        required_columns: columns(&[date, amount, description]),
        column_mapping: vec![
            (date.to_string(), CanonicalField::Date),
            (amount.to_string(), CanonicalField::Amount),
            (description.to_string(), CanonicalField::Description),
        ],
        date_format: DATE_FORMAT.to_string(),
        amount_policy: AmountPolicy::None,
        comma_decimal: false,
        type_strategy: TypeStrategy::RegexCascade,
    }
}
