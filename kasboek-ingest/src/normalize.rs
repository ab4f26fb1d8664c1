//! Statement normalizer: raw table + bank profile → canonical transactions.
//!
//! All-or-nothing: every column and every row is validated before a single
//! record is produced, and the first failing check rejects the whole batch.

use std::str::FromStr;

use chrono::NaiveDate;
use kasboek_core::{CanonicalTransaction, KasboekError, Result, extract};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::profiles::{AmountPolicy, BankProfile, CanonicalField, TypeStrategy};
use crate::types::RawTable;

pub fn normalize(table: &RawTable, profile: &BankProfile) -> Result<Vec<CanonicalTransaction>> {
    check_columns(table, profile)?;
    debug!(bank = %profile.bank, rows = table.len(), "required columns present");

    let dates = parse_dates(&mapped_column(table, profile, CanonicalField::Date)?, &profile.date_format)?;
    let mut amounts = parse_amounts(
        &mapped_column(table, profile, CanonicalField::Amount)?,
        profile.comma_decimal,
    )?;
    let descriptions = mapped_column(table, profile, CanonicalField::Description)?;

    if let AmountPolicy::SignFromFlagColumn { column, debit_token } = &profile.amount_policy {
        let flags = raw_column(table, profile, column)?;
        for (amount, flag) in amounts.iter_mut().zip(flags) {
            if flag.trim().eq_ignore_ascii_case(debit_token) {
                *amount = -*amount;
            }
        }
    }

    let types: Vec<String> = match &profile.type_strategy {
        TypeStrategy::SourceColumn(column) => raw_column(table, profile, column)?
            .into_iter()
            .map(str::to_string)
            .collect(),
        TypeStrategy::RegexCascade => descriptions
            .iter()
            .map(|d| extract::transaction_type(d).to_string())
            .collect(),
    };

    let out: Vec<CanonicalTransaction> = dates
        .into_iter()
        .zip(amounts)
        .zip(descriptions)
        .zip(types)
        .map(|(((date, amount), description), transaction_type)| {
            CanonicalTransaction::new(date, amount, description, transaction_type, profile.bank)
        })
        .collect();

    debug!(bank = %profile.bank, count = out.len(), "normalized statement");
    Ok(out)
}

fn check_columns(table: &RawTable, profile: &BankProfile) -> Result<()> {
    let missing: Vec<String> = profile
        .required_columns
        .iter()
        .filter(|c| table.column_index(c).is_none())
        .cloned()
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    warn!(bank = %profile.bank, ?missing, "statement rejected: missing columns");
    Err(KasboekError::SchemaMismatch {
        bank: profile.bank.name().to_string(),
        missing,
    })
}

fn mapped_column<'a>(table: &'a RawTable, profile: &BankProfile, field: CanonicalField) -> Result<Vec<&'a str>> {
    let raw = profile.source_column(field).ok_or_else(|| {
        KasboekError::UnsupportedFormat(format!("{} profile maps no column to {field:?}", profile.bank))
    })?;
    raw_column(table, profile, raw)
}

fn raw_column<'a>(table: &'a RawTable, profile: &BankProfile, name: &str) -> Result<Vec<&'a str>> {
    table.column(name).ok_or_else(|| KasboekError::SchemaMismatch {
        bank: profile.bank.name().to_string(),
        missing: vec![name.to_string()],
    })
}

fn parse_dates(raw: &[&str], format: &str) -> Result<Vec<NaiveDate>> {
    let mut dates = Vec::with_capacity(raw.len());
    let mut failed = Vec::new();
    for value in raw {
        match NaiveDate::parse_from_str(value.trim(), format) {
            Ok(d) => dates.push(d),
            Err(_) => failed.push(*value),
        }
    }
    if let Some(first) = failed.first() {
        warn!(count = failed.len(), first = *first, "statement rejected: unparseable dates");
        return Err(KasboekError::DateParseFailure {
            count: failed.len(),
            first: first.to_string(),
            format: format.to_string(),
        });
    }
    Ok(dates)
}

/// Keep digits, separators and the minus sign.
fn clean_amount(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect()
}

/// `1.234,56`, `-12,34`: comma decimal point, optional period thousands groups
static COMMA_DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?(?:\d{1,3}(?:\.\d{3})+|\d+),\d+$").unwrap());

/// `1,234.56`, `-1,250`: comma thousands groups, optional period decimals
static COMMA_GROUPED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d{1,3}(?:,\d{3})+(?:\.\d+)?$").unwrap());

/// Rewrite a cleaned amount into `Decimal` syntax, or `None` when its
/// separators do not fit the profile's convention.
fn numeric_text(value: &str, comma_decimal: bool) -> Option<String> {
    if !value.contains(',') {
        return Some(value.to_string());
    }
    if comma_decimal {
        COMMA_DECIMAL
            .is_match(value)
            .then(|| value.replace('.', "").replace(',', "."))
    } else {
        COMMA_GROUPED.is_match(value).then(|| value.replace(',', ""))
    }
}

fn parse_amounts(raw: &[&str], comma_decimal: bool) -> Result<Vec<Decimal>> {
    let mut amounts = Vec::with_capacity(raw.len());
    let mut failed = 0usize;
    for value in raw {
        let parsed = numeric_text(&clean_amount(value), comma_decimal).and_then(|n| Decimal::from_str(&n).ok());
        match parsed {
            Some(d) => amounts.push(d),
            None => failed += 1,
        }
    }
    if failed > 0 {
        warn!(count = failed, "statement rejected: unparseable amounts");
        return Err(KasboekError::AmountParseFailure { count: failed });
    }
    Ok(amounts)
}
