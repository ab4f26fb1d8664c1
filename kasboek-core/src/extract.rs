//! Regex cascades over free-text statement descriptions.
//!
//! Both cascades are ordered tables evaluated top to bottom; the first entry
//! that produces a result wins.
//!
//! Typical ABN AMRO descriptions:
//!   SEPA iDEAL  IBAN: NL12... Naam: Coffee Corner Omschrijving: latte Kenmerk: 123
//!   SEPA Incasso algemeen doorlopend Incassant: NL99... Naam: Vattenfall Machtiging: ...
//!   BEA, Betaalpas  VLOUW BV,PAS041 NR:CT123456, 02.03.24/12:14 AMSTERDAM

use once_cell::sync::Lazy;
use regex::Regex;

use crate::transaction::UNKNOWN_TYPE;

/// One step of the merchant cascade
pub type MerchantExtractor = fn(&str) -> Option<String>;

static TYPE_CASCADE: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("iDEAL", r"(?i)\bideal\b"),
        ("SEPA Overboeking", r"(?i)\bsepa overboeking\b"),
        ("SEPA Incasso", r"(?i)\bsepa incasso\b"),
        ("Tikkie", r"(?i)\btikkie\b"),
        ("Payment Terminal", r"(?i)\bBEA\b"),
    ]
    .into_iter()
    .map(|(label, pattern)| (label, Regex::new(pattern).unwrap()))
    .collect()
});

static TIKKIE_MESSAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Omschrijving:\s*(.*?)\s*Kenmerk:").unwrap());

static INCASSO_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Naam:\s*(.*?)\s*(?:Machtiging|Omschrijving|IBAN|Kenmerk|Voor:|$)").unwrap()
});

static NAME_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Naam:\s*(.+?)\s*(?:Omschrijving|IBAN|Kenmerk|Voor:|$)").unwrap()
});

static POINT_OF_SALE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|,)\s*(?:(?:Google Pay|Betaalpas)\s+)?([^,]+?)\s*,PAS").unwrap()
});

/// Merchant cascade, in evaluation order
pub const MERCHANT_CASCADE: [(&str, MerchantExtractor); 4] = [
    ("payment-app", payment_app_merchant),
    ("direct-debit", direct_debit_merchant),
    ("name-field", name_field_merchant),
    ("point-of-sale", point_of_sale_merchant),
];

/// Classify the transaction type of a description that has no type column.
/// Returns `"Unknown"` when no pattern matches.
pub fn transaction_type(description: &str) -> &'static str {
    TYPE_CASCADE
        .iter()
        .find(|(_, re)| re.is_match(description))
        .map(|(label, _)| *label)
        .unwrap_or(UNKNOWN_TYPE)
}

/// Text between `Omschrijving:` and `Kenmerk:`, i.e. the message a payer typed
/// into a payment-app request.
pub fn payment_app_message(description: &str) -> Option<String> {
    capture(&TIKKIE_MESSAGE, description)
}

/// True when the description is a payment-app transfer (Tikkie)
pub fn is_payment_app(description: &str) -> bool {
    description.to_lowercase().contains("tikkie")
}

/// Identify the counterparty of a transaction, lower-cased and trimmed.
/// Malformed or empty descriptions yield `None`.
pub fn merchant_name(description: &str) -> Option<String> {
    MERCHANT_CASCADE
        .iter()
        .find_map(|(_, extract)| extract(description))
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
}

fn payment_app_merchant(description: &str) -> Option<String> {
    let lower = description.to_lowercase();
    if lower.contains("sepa ideal") && lower.contains("tikkie") {
        payment_app_message(description)
    } else {
        None
    }
}

fn direct_debit_merchant(description: &str) -> Option<String> {
    if description.to_lowercase().contains("sepa incasso") {
        capture(&INCASSO_NAME, description)
    } else {
        None
    }
}

fn name_field_merchant(description: &str) -> Option<String> {
    capture(&NAME_FIELD, description)
}

fn point_of_sale_merchant(description: &str) -> Option<String> {
    capture(&POINT_OF_SALE, description)
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
