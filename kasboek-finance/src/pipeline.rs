//! Statement → classified transactions: normalize, extract merchant, assign category.

use std::path::Path;

use kasboek_core::{Bank, CanonicalTransaction, Result, extract};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::category_rules::{ClassificationRuleSet, UNCLASSIFIED};
use crate::rule_store::{RuleBook, RuleStore};

/// A canonical transaction plus its classification results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedTransaction {
    #[serde(flatten)]
    pub transaction: CanonicalTransaction,
    pub category: String,
    pub merchant: Option<String>,
}

impl ClassifiedTransaction {
    pub fn is_unclassified(&self) -> bool {
        self.category == UNCLASSIFIED
    }
}

pub fn classify_transaction(txn: CanonicalTransaction, rules: &ClassificationRuleSet) -> ClassifiedTransaction {
    let category = rules.classify(&txn.description);
    let merchant = extract::merchant_name(&txn.description);
    ClassifiedTransaction {
        transaction: txn,
        category,
        merchant,
    }
}

/// Classify a batch against one snapshot of the rules.
pub fn classify_all(
    txns: impl IntoIterator<Item = CanonicalTransaction>,
    rules: &ClassificationRuleSet,
) -> Vec<ClassifiedTransaction> {
    txns.into_iter().map(|t| classify_transaction(t, rules)).collect()
}

/// Re-tag every still-unclassified record whose description contains
/// `keyword`. Returns how many records changed.
pub fn apply_keyword(records: &mut [ClassifiedTransaction], keyword: &str, category: &str) -> usize {
    let keyword = keyword.to_lowercase();
    let mut changed = 0;
    for record in records.iter_mut().filter(|r| r.is_unclassified()) {
        if record.transaction.description.to_lowercase().contains(&keyword) {
            record.category = category.to_string();
            changed += 1;
        }
    }
    changed
}

/// Read one statement file for `bank` and classify every row.
pub fn ingest_statement<S: RuleStore>(
    path: impl AsRef<Path>,
    bank: Bank,
    book: &RuleBook<S>,
) -> Result<Vec<ClassifiedTransaction>> {
    let txns = kasboek_ingest::read_statement(path, bank)?;
    let rules = book.load()?;
    let out = classify_all(txns, &rules);
    debug!(
        %bank,
        total = out.len(),
        unclassified = out.iter().filter(|r| r.is_unclassified()).count(),
        "statement classified"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn txn(description: &str) -> CanonicalTransaction {
        CanonicalTransaction::new(
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            Decimal::new(-1250, 2),
            description,
            extract::transaction_type(description),
            Bank::AbnAmro,
        )
    }

    #[test]
    fn test_classify_all_attaches_category_and_merchant() {
        let mut rules = ClassificationRuleSet::with_defaults();
        rules.learn("Eating Out", "coffee corner").unwrap();

        let out = classify_all(
            vec![
                txn("SEPA IDEAL Naam: Coffee Corner Omschrijving: latte Kenmerk: 123"),
                txn("RENTE EN KOSTEN"),
            ],
            &rules,
        );
        assert_eq!(out[0].category, "Eating Out");
        assert_eq!(out[0].merchant.as_deref(), Some("coffee corner"));
        assert_eq!(out[0].transaction.transaction_type, "iDEAL");
        assert!(out[1].is_unclassified());
        assert_eq!(out[1].merchant, None);
    }

    #[test]
    fn test_apply_keyword_only_touches_unclassified() {
        let rules = ClassificationRuleSet::with_defaults();
        let mut out = classify_all(
            vec![
                txn("BEA, Betaalpas VLOUW BV,PAS041"),
                txn("BEA, Betaalpas Vlouw BV,PAS041 AMSTERDAM"),
                txn("BEA, Betaalpas HEMA,PAS041"),
            ],
            &rules,
        );
        out[1].category = "Miscellaneous".to_string();

        let changed = apply_keyword(&mut out, "vlouw bv", "Groceries");
        assert_eq!(changed, 1);
        assert_eq!(out[0].category, "Groceries");
        assert_eq!(out[1].category, "Miscellaneous");
        assert!(out[2].is_unclassified());
    }

    #[test]
    fn test_serializes_flat() {
        let rules = ClassificationRuleSet::with_defaults();
        let record = classify_transaction(txn("RENTE EN KOSTEN"), &rules);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["category"], "Unclassified");
        assert_eq!(value["bank"], "ABN Amro");
        assert_eq!(value["date"], "2024-03-04");
    }
}
