//! Persistence for the classification rule set.
//!
//! The persisted document is the single source of truth: every operation
//! loads it, and every mutation rewrites it in full before returning.
//! [`RuleBook`] serializes those load-mutate-save cycles behind one lock so
//! concurrent learners cannot drop each other's keywords.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use kasboek_core::{KasboekError, Result, extract};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::category_rules::ClassificationRuleSet;

/// Storage port for the rule document
pub trait RuleStore: Send + Sync {
    /// `Ok(None)` when nothing has been persisted yet
    fn load(&self) -> Result<Option<ClassificationRuleSet>>;

    fn save(&self, rules: &ClassificationRuleSet) -> Result<()>;
}

/// Pretty-printed JSON object on disk: `{"Groceries": ["albert heijn"], ...}`
#[derive(Debug, Clone)]
pub struct JsonFileRuleStore {
    path: PathBuf,
}

impl JsonFileRuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RuleStore for JsonFileRuleStore {
    fn load(&self) -> Result<Option<ClassificationRuleSet>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(KasboekError::file_access(&self.path, e)),
        };
        let rules = serde_json::from_str(&text)
            .map_err(|e| KasboekError::RuleStore(format!("parse {}: {e}", self.path.display())))?;
        Ok(Some(rules))
    }

    fn save(&self, rules: &ClassificationRuleSet) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| KasboekError::file_access(dir, e))?;
        }
        let json = serde_json::to_string_pretty(rules)
            .map_err(|e| KasboekError::RuleStore(format!("serialize rules: {e}")))?;

        // Readers never see a half-written document
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| KasboekError::file_access(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| KasboekError::file_access(&self.path, e))?;
        debug!(path = %self.path.display(), categories = rules.len(), "rules written");
        Ok(())
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: Mutex<Option<ClassificationRuleSet>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ClassificationRuleSet) -> Self {
        Self {
            rules: Mutex::new(Some(rules)),
        }
    }
}

impl RuleStore for MemoryRuleStore {
    fn load(&self) -> Result<Option<ClassificationRuleSet>> {
        Ok(self.rules.lock().clone())
    }

    fn save(&self, rules: &ClassificationRuleSet) -> Result<()> {
        *self.rules.lock() = Some(rules.clone());
        Ok(())
    }
}

/// Rule set access through a store, one exclusive cycle at a time.
pub struct RuleBook<S: RuleStore> {
    store: S,
    cycle: Mutex<()>,
}

impl<S: RuleStore> RuleBook<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cycle: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current rule set; the default categories are synthesized and persisted
    /// on first access.
    pub fn load(&self) -> Result<ClassificationRuleSet> {
        let _guard = self.cycle.lock();
        self.load_locked()
    }

    pub fn categories(&self) -> Result<Vec<String>> {
        Ok(self.load()?.categories().map(str::to_string).collect())
    }

    pub fn classify(&self, description: &str) -> Result<String> {
        Ok(self.load()?.classify(description))
    }

    /// Run one load-mutate-save cycle. The document is only rewritten when
    /// `f` reports a change.
    pub fn update<T>(&self, f: impl FnOnce(&mut ClassificationRuleSet) -> Result<(T, bool)>) -> Result<T> {
        let _guard = self.cycle.lock();
        let mut rules = self.load_locked()?;
        let (out, changed) = f(&mut rules)?;
        if changed {
            self.store.save(&rules)?;
        }
        Ok(out)
    }

    /// Teach `category` a new keyword; returns whether it was new.
    pub fn learn(&self, category: &str, keyword: &str) -> Result<bool> {
        let added = self.update(|rules| {
            let added = rules.learn(category, keyword)?;
            Ok((added, added))
        })?;
        if added {
            info!(category, keyword, "learned keyword");
        }
        Ok(added)
    }

    pub fn add_category(&self, name: &str) -> Result<()> {
        self.update(|rules| rules.add_category(name).map(|()| ((), true)))?;
        info!(category = name, "added category");
        Ok(())
    }

    /// Confirm that `descriptions` belong to `category`: the merchant of each
    /// is extracted and learned as a keyword, with a single save. Returns the
    /// merchants that were new to the category.
    pub fn confirm<'a>(
        &self,
        category: &str,
        descriptions: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<String>> {
        let mut merchants: Vec<String> = Vec::new();
        for merchant in descriptions.into_iter().filter_map(extract::merchant_name) {
            if !merchants.contains(&merchant) {
                merchants.push(merchant);
            }
        }

        let learned = self.update(|rules| {
            let mut learned = Vec::new();
            for merchant in &merchants {
                if rules.learn(category, merchant)? {
                    learned.push(merchant.clone());
                }
            }
            let changed = !learned.is_empty();
            Ok((learned, changed))
        })?;
        info!(category, learned = learned.len(), "confirmed category");
        Ok(learned)
    }

    fn load_locked(&self) -> Result<ClassificationRuleSet> {
        match self.store.load()? {
            Some(rules) => Ok(rules),
            None => {
                let rules = ClassificationRuleSet::with_defaults();
                self.store.save(&rules)?;
                info!(categories = rules.len(), "initialized default rule set");
                Ok(rules)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_access_persists_defaults() {
        let book = RuleBook::new(MemoryRuleStore::new());
        assert!(book.store().load().unwrap().is_none());
        let rules = book.load().unwrap();
        assert_eq!(rules, ClassificationRuleSet::with_defaults());
        assert_eq!(book.store().load().unwrap(), Some(rules));
    }

    #[test]
    fn test_learn_writes_through() {
        let book = RuleBook::new(MemoryRuleStore::new());
        assert!(book.learn("Groceries", "Albert Heijn").unwrap());
        assert!(!book.learn("Groceries", "albert heijn").unwrap());
        let stored = book.store().load().unwrap().unwrap();
        assert_eq!(stored.keywords("Groceries").unwrap(), ["albert heijn".to_string()]);
        assert_eq!(book.classify("BEA, Betaalpas ALBERT HEIJN 1403,PAS041").unwrap(), "Groceries");
    }

    #[test]
    fn test_add_category_duplicate_leaves_store_untouched() {
        let book = RuleBook::new(MemoryRuleStore::new());
        book.add_category("Pets").unwrap();
        let err = book.add_category("PETS").unwrap_err();
        assert!(matches!(err, KasboekError::CategoryExists(_)));
        let names = book.categories().unwrap();
        assert_eq!(names.iter().filter(|c| c.as_str() == "Pets").count(), 1);
        assert_eq!(names.last().map(String::as_str), Some("Pets"));
    }

    #[test]
    fn test_confirm_learns_distinct_merchants_once() {
        let book = RuleBook::new(MemoryRuleStore::new());
        let learned = book
            .confirm(
                "Eating Out",
                [
                    "SEPA IDEAL Naam: Coffee Corner Omschrijving: latte Kenmerk: 123",
                    "SEPA IDEAL Naam: COFFEE CORNER Omschrijving: cake Kenmerk: 124",
                    "RENTE EN KOSTEN",
                    "BEA, Google Pay  DE PIZZABAKKER,PAS012",
                ],
            )
            .unwrap();
        assert_eq!(learned, vec!["coffee corner".to_string(), "de pizzabakker".to_string()]);

        let again = book
            .confirm("Eating Out", ["SEPA IDEAL Naam: Coffee Corner Kenmerk: 9"])
            .unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn test_confirm_into_unknown_category_fails() {
        let book = RuleBook::new(MemoryRuleStore::new());
        let err = book
            .confirm("Pets", ["SEPA IDEAL Naam: Dierenarts Kenmerk: 1"])
            .unwrap_err();
        assert!(matches!(err, KasboekError::UnknownCategory(_)));
    }

    #[test]
    fn test_json_store_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileRuleStore::new(dir.path().join("nested").join("rules.json"));
        assert!(store.load().unwrap().is_none());
        store.save(&ClassificationRuleSet::with_defaults()).unwrap();
        assert!(store.path().exists());
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_json_store_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, "{not json").unwrap();
        let err = JsonFileRuleStore::new(&path).load().unwrap_err();
        assert!(matches!(err, KasboekError::RuleStore(_)));
    }
}
