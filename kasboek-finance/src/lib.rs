//! kasboek-finance: keyword classification rules, their persistence, and the classify pipeline

pub mod category_rules;
pub mod pipeline;
pub mod rule_store;

pub use category_rules::{ClassificationRuleSet, DEFAULT_CATEGORIES, UNCLASSIFIED, classify};
pub use pipeline::{ClassifiedTransaction, apply_keyword, classify_all, ingest_statement};
pub use rule_store::{JsonFileRuleStore, MemoryRuleStore, RuleBook, RuleStore};
