//! Keyword rules mapping transaction descriptions to spending categories.
//!
//! Categories are tried in insertion order and keywords in stored order; the
//! first keyword found as a substring of the lower-cased description wins.

use indexmap::IndexMap;
use kasboek_core::{KasboekError, Result, extract};
use serde::{Deserialize, Serialize};

/// Returned when nothing matches
pub const UNCLASSIFIED: &str = "Unclassified";

pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "Groceries",
    "Eating Out",
    "Alcohol",
    "Transport",
    "Housing",
    "Utilities",
    "Entertainment",
    "Healthcare",
    "Personal Care",
    "Miscellaneous",
];

/// Category name → lower-case keyword triggers, in priority order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationRuleSet {
    categories: IndexMap<String, Vec<String>>,
}

impl ClassificationRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default category list, every category without keywords
    pub fn with_defaults() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|c| (c.to_string(), Vec::new()))
                .collect(),
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn keywords(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Exact name of an existing category, compared case-insensitively
    pub fn find_category(&self, name: &str) -> Option<&str> {
        let wanted = name.trim().to_lowercase();
        self.categories().find(|c| c.to_lowercase() == wanted)
    }

    pub fn classify(&self, description: &str) -> String {
        classify(description, self)
    }

    /// Append `keyword` (lower-cased) to `category` unless it is already there.
    /// Returns whether the rule set changed.
    pub fn learn(&mut self, category: &str, keyword: &str) -> Result<bool> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return Ok(false);
        }
        let keywords = self
            .categories
            .get_mut(category)
            .ok_or_else(|| KasboekError::UnknownCategory(category.to_string()))?;
        if keywords.iter().any(|k| k.to_lowercase() == keyword) {
            return Ok(false);
        }
        keywords.push(keyword);
        Ok(true)
    }

    /// Insert a new category with no keywords at the end of the priority order.
    pub fn add_category(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(KasboekError::InvalidCategoryName(name.to_string()));
        }
        if let Some(existing) = self.find_category(name) {
            return Err(KasboekError::CategoryExists(existing.to_string()));
        }
        self.categories.insert(name.to_string(), Vec::new());
        Ok(())
    }
}

/// Assign a category to a transaction description.
pub fn classify(description: &str, rules: &ClassificationRuleSet) -> String {
    let lower = description.to_lowercase();

    // Substring match, so short keywords can hit inside unrelated words
    for (category, keywords) in &rules.categories {
        if keywords.iter().any(|k| lower.contains(k.as_str())) {
            return category.clone();
        }
    }

    if extract::is_payment_app(description) {
        if let Some(category) = payment_app_fallback(description) {
            return category.to_string();
        }
    }

    UNCLASSIFIED.to_string()
}

/// Categorize an unmatched payment-app request by what the payer wrote in it.
fn payment_app_fallback(description: &str) -> Option<&'static str> {
    let message = extract::payment_app_message(description)?.to_lowercase();
    if message.contains("groceries") {
        Some("Groceries")
    } else if message.contains("beer") || message.contains("wine") {
        Some("Alcohol")
    } else if message.contains("restaurant") || message.contains("cafe") {
        Some("Eating Out")
    } else {
        None
    }
}
