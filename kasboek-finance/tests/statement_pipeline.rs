use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use kasboek_core::{Bank, KasboekError};
use kasboek_finance::{
    ClassificationRuleSet, JsonFileRuleStore, MemoryRuleStore, RuleBook, RuleStore, apply_keyword, ingest_statement,
};
use rust_decimal::Decimal;
use tempfile::TempDir;

const ING_CSV: &str = "\
Date;Name / Description;Account;Counterparty;Code;Debit/credit;Amount (EUR);Transaction type;Notifications
20240301;Albert Heijn 1403;NL01INGB0001234567;;BA;Debit;23,45;Payment terminal;BEA, Betaalpas ALBERT HEIJN 1403,PAS041 NR:CT1
20240302;Coffee Corner;NL01INGB0001234567;NL22ABNA0000000002;ID;Debit;4,50;iDEAL;SEPA IDEAL Naam: Coffee Corner Omschrijving: latte Kenmerk: 123
20240305;Employer BV;NL01INGB0001234567;NL33RABO0000000003;GT;Credit;2.150,00;Transfer;Salaris maart
";

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

/// Real-shaped ING export: normalize, classify, learn, reclassify.
#[test]
fn test_ing_csv_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(&dir, "ing.csv", ING_CSV);
    let book = RuleBook::new(JsonFileRuleStore::new(dir.path().join("classification_rules.json")));
    book.learn("Eating Out", "coffee corner").unwrap();

    let mut records = ingest_statement(&csv, Bank::Ing, &book).unwrap();
    assert_eq!(records.len(), 3);

    let groceries = &records[0];
    assert_eq!(groceries.transaction.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    assert_eq!(groceries.transaction.amount, Decimal::new(-2345, 2));
    assert_eq!(groceries.transaction.transaction_type, "Payment terminal");
    assert_eq!(groceries.merchant.as_deref(), Some("albert heijn 1403"));
    assert!(groceries.is_unclassified());

    assert_eq!(records[1].category, "Eating Out");
    assert_eq!(records[1].transaction.amount, Decimal::new(-450, 2));
    assert_eq!(records[2].transaction.amount, Decimal::new(215000, 2));

    // Confirming the first row teaches its merchant and fixes matching rows
    let learned = book
        .confirm("Groceries", [records[0].transaction.description.as_str()])
        .unwrap();
    assert_eq!(learned, vec!["albert heijn 1403".to_string()]);
    assert_eq!(apply_keyword(&mut records, &learned[0], "Groceries"), 1);
    assert_eq!(records[0].category, "Groceries");

    let again = ingest_statement(&csv, Bank::Ing, &book).unwrap();
    assert_eq!(again[0].category, "Groceries");
}

#[test]
fn test_wrong_bank_is_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(&dir, "ing.csv", ING_CSV);
    let book = RuleBook::new(MemoryRuleStore::new());
    match ingest_statement(&csv, Bank::AbnAmro, &book) {
        Err(KasboekError::SchemaMismatch { missing, .. }) => {
            assert_eq!(missing, vec!["Transaction Date", "Amount", "Description"]);
        }
        other => panic!("expected SchemaMismatch, got {other:?}"),
    }
}

#[test]
fn test_bad_row_rejects_whole_file() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(
        &dir,
        "abn.csv",
        "Transaction Date,Amount,Description\n20240301,-1.00,ok\n20240332,-2.00,bad day\n",
    );
    let book = RuleBook::new(MemoryRuleStore::new());
    let err = ingest_statement(&csv, Bank::AbnAmro, &book).unwrap_err();
    assert!(matches!(err, KasboekError::DateParseFailure { count: 1, .. }));
}

#[test]
fn test_rule_set_round_trip_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.json");

    let mut rules = ClassificationRuleSet::with_defaults();
    rules.add_category("Pets").unwrap();
    rules.learn("Pets", "dierenarts").unwrap();
    rules.learn("Pets", "zooplus").unwrap();
    rules.learn("Alcohol", "gall & gall").unwrap();

    let store = JsonFileRuleStore::new(&path);
    store.save(&rules).unwrap();
    let reloaded = JsonFileRuleStore::new(&path).load().unwrap().unwrap();
    assert_eq!(reloaded, rules);
    assert_eq!(
        reloaded.categories().collect::<Vec<_>>(),
        rules.categories().collect::<Vec<_>>()
    );
    assert_eq!(reloaded.keywords("Pets").unwrap(), ["dierenarts".to_string(), "zooplus".to_string()]);

    let doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["Groceries"], serde_json::json!([]));
}

#[test]
fn test_concurrent_learners_keep_every_keyword() {
    let dir = tempfile::tempdir().unwrap();
    let book = Arc::new(RuleBook::new(JsonFileRuleStore::new(dir.path().join("rules.json"))));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let book = Arc::clone(&book);
            thread::spawn(move || {
                for i in 0..10 {
                    book.learn("Miscellaneous", &format!("shop {worker}-{i}")).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let rules = book.store().load().unwrap().unwrap();
    assert_eq!(rules.keywords("Miscellaneous").unwrap().len(), 80);
}
