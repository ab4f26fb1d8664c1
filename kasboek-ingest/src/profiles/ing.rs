//! ING exports (same header for spreadsheet and CSV).
//!
//!   Date;Name / Description;Account;Counterparty;Code;Debit/credit;Amount (EUR);Transaction type;Notifications
//!   20240302;Albert Heijn 1234;NL01INGB0001234567;;BA;Debit;12,34;Payment terminal;Pasvolgnr: 001 ...
//!
//! Amounts are unsigned with a comma decimal separator; the sign lives in `Debit/credit`.

use kasboek_core::Bank;

use super::{AmountPolicy, BankProfile, CanonicalField, TypeStrategy, columns};
use crate::types::FileKind;

pub const DATE_FORMAT: &str = "%Y%m%d";
pub const FLAG_COLUMN: &str = "Debit/credit";
pub const DEBIT_TOKEN: &str = "debit";
pub const TYPE_COLUMN: &str = "Transaction type";

pub fn profile(kind: FileKind) -> BankProfile {
    BankProfile {
        bank: Bank::Ing,
        file_kind: kind,
        required_columns: columns(&[
            "Date",
            "Name / Description",
            "Account",
            "Counterparty",
            "Code",
            FLAG_COLUMN,
            "Amount (EUR)",
            TYPE_COLUMN,
            "Notifications",
        ]),
        column_mapping: vec![
            ("Date".to_string(), CanonicalField::Date),
            ("Amount (EUR)".to_string(), CanonicalField::Amount),
            ("Notifications".to_string(), CanonicalField::Description),
            (TYPE_COLUMN.to_string(), CanonicalField::TransactionType),
        ],
        date_format: DATE_FORMAT.to_string(),
        amount_policy: AmountPolicy::SignFromFlagColumn {
            column: FLAG_COLUMN.to_string(),
            debit_token: DEBIT_TOKEN.to_string(),
        },
        comma_decimal: true,
        type_strategy: TypeStrategy::SourceColumn(TYPE_COLUMN.to_string()),
    }
}
