use anyhow::{Context, Result};
use kasboek_core::Bank;
use kasboek_finance::{ClassifiedTransaction, JsonFileRuleStore, RuleBook, ingest_statement};
use std::path::PathBuf;
use std::sync::Arc;

/// One file's classified rows
pub struct IngestedFile {
    pub path: PathBuf,
    pub records: Vec<ClassifiedTransaction>,
}

/// Normalize and classify every file on its own blocking task. Each file is
/// all-or-nothing; the first failing file aborts the command.
pub async fn ingest_files(
    files: Vec<PathBuf>,
    bank: Bank,
    book: Arc<RuleBook<JsonFileRuleStore>>,
) -> Result<Vec<IngestedFile>> {
    let handles: Vec<_> = files
        .into_iter()
        .map(|path| {
            let book = Arc::clone(&book);
            tokio::task::spawn_blocking(move || {
                let records = ingest_statement(&path, bank, &*book)
                    .with_context(|| format!("ingesting {}", path.display()))?;
                Ok::<_, anyhow::Error>(IngestedFile { path, records })
            })
        })
        .collect();

    let mut out = Vec::with_capacity(handles.len());
    for handle in handles {
        out.push(handle.await.context("ingest task panicked")??);
    }
    Ok(out)
}

pub fn print_table(files: &[IngestedFile]) {
    for file in files {
        let unclassified = file.records.iter().filter(|r| r.is_unclassified()).count();
        println!(
            "# {} ({} transactions, {} unclassified)\n",
            file.path.display(),
            file.records.len(),
            unclassified
        );
        for r in &file.records {
            let t = &r.transaction;
            println!(
                "{} {:>10.2}  {:<18} {:<16} {}",
                t.date,
                t.amount,
                truncate(&t.transaction_type, 18),
                truncate(&r.category, 16),
                t.description
            );
        }
        println!();
    }
}

pub fn print_json(files: &[IngestedFile]) -> Result<()> {
    let all: Vec<&ClassifiedTransaction> = files.iter().flat_map(|f| f.records.iter()).collect();
    println!("{}", serde_json::to_string_pretty(&all)?);
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Payment terminal", 18), "Payment terminal");
        assert_eq!(truncate("SEPA Overboeking extra", 10), "SEPA Over…");
    }

    #[tokio::test]
    async fn test_ingest_files_in_parallel() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(&a, "Transaction Date,Amount,Description\n20240301,-2.50,BEA COFFEE\n").unwrap();
        fs::write(
            &b,
            "Transaction Date,Amount,Description\n20240302,-9.99,SEPA Incasso Naam: Ziggo\n20240303,1.00,x\n",
        )
        .unwrap();

        let book = Arc::new(RuleBook::new(JsonFileRuleStore::new(dir.path().join("rules.json"))));
        book.learn("Utilities", "ziggo").unwrap();

        let out = ingest_files(vec![a.clone(), b], Bank::AbnAmro, book).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].path, a);
        assert_eq!(out[0].records.len(), 1);
        assert_eq!(out[1].records[0].category, "Utilities");
        assert_eq!(out[1].records[0].transaction.transaction_type, "SEPA Incasso");
    }

    #[tokio::test]
    async fn test_one_bad_file_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.csv");
        fs::write(&good, "Transaction Date,Amount,Description\n20240301,-2.50,x\n").unwrap();
        let book = Arc::new(RuleBook::new(JsonFileRuleStore::new(dir.path().join("rules.json"))));

        let err = ingest_files(vec![good, dir.path().join("missing.csv")], Bank::AbnAmro, book)
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("missing.csv"));
    }
}
