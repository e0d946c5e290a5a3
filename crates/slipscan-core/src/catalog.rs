//! Pattern and account repository.
//!
//! The capture pipeline only reads from the repository: one snapshot of
//! active patterns and accounts per run.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CatalogError;
use crate::models::catalog::{ExtractionPattern, PaymentAccount};

/// Read-only source of extraction patterns and payment accounts.
pub trait PatternRepository {
    /// Active patterns ordered by priority ascending, then account type.
    fn list_active_patterns(&self) -> Result<Vec<ExtractionPattern>, CatalogError>;

    /// Active accounts ordered by account type, primary accounts first.
    fn list_active_accounts(&self) -> Result<Vec<PaymentAccount>, CatalogError>;
}

/// In-memory catalog, persisted as a single JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub patterns: Vec<ExtractionPattern>,
    pub accounts: Vec<PaymentAccount>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog holding only the stock GCash pattern.
    pub fn with_default_pattern() -> Self {
        Self {
            patterns: vec![ExtractionPattern::gcash_default()],
            accounts: Vec::new(),
        }
    }

    pub fn add_pattern(&mut self, pattern: ExtractionPattern) {
        self.patterns.push(pattern);
    }

    pub fn add_account(&mut self, account: PaymentAccount) {
        self.accounts.push(account);
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        info!(
            "Loaded catalog from {}: {} patterns, {} accounts",
            path.display(),
            catalog.patterns.len(),
            catalog.accounts.len()
        );
        Ok(catalog)
    }

    /// Save the catalog to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        debug!("Saved catalog to {}", path.display());
        Ok(())
    }
}

impl PatternRepository for Catalog {
    fn list_active_patterns(&self) -> Result<Vec<ExtractionPattern>, CatalogError> {
        let mut patterns: Vec<ExtractionPattern> =
            self.patterns.iter().filter(|p| p.is_active).cloned().collect();

        // Stable: equal keys keep insertion order.
        patterns.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.account_type.cmp(&b.account_type))
        });
        Ok(patterns)
    }

    fn list_active_accounts(&self) -> Result<Vec<PaymentAccount>, CatalogError> {
        let mut accounts: Vec<PaymentAccount> =
            self.accounts.iter().filter(|a| a.is_active).cloned().collect();

        accounts.sort_by(|a, b| {
            a.account_type
                .cmp(&b.account_type)
                .then_with(|| b.is_primary.cmp(&a.is_primary))
        });
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn named(name: &str, account_type: &str, priority: i32) -> ExtractionPattern {
        let mut pattern = ExtractionPattern::new(name, account_type, "a(1)", "r(1)", "d(1)");
        pattern.priority = priority;
        pattern
    }

    #[test]
    fn test_active_patterns_ordered() {
        let mut catalog = Catalog::new();
        catalog.add_pattern(named("bank-late", "bank", 100));
        catalog.add_pattern(named("gcash-first", "gcash", 10));
        catalog.add_pattern(named("gcash-late", "gcash", 100));
        catalog.add_pattern(named("bank-late-2", "bank", 100));
        let mut inactive = named("off", "gcash", 1);
        inactive.is_active = false;
        catalog.add_pattern(inactive);

        let names: Vec<String> = catalog
            .list_active_patterns()
            .unwrap()
            .into_iter()
            .map(|p| p.pattern_name)
            .collect();

        assert_eq!(names, vec!["gcash-first", "bank-late", "bank-late-2", "gcash-late"]);
    }

    #[test]
    fn test_active_accounts_primary_first() {
        let mut catalog = Catalog::new();
        catalog.add_account(PaymentAccount::new("gcash", "Second", "0917", "B"));
        let mut primary = PaymentAccount::new("gcash", "Primary", "0915", "A");
        primary.is_primary = true;
        catalog.add_account(primary);
        catalog.add_account(PaymentAccount::new("bank", "BPI", "1234", "C"));
        let mut closed = PaymentAccount::new("gcash", "Closed", "0918", "D");
        closed.is_active = false;
        catalog.add_account(closed);

        let names: Vec<String> = catalog
            .list_active_accounts()
            .unwrap()
            .into_iter()
            .map(|a| a.account_name)
            .collect();

        assert_eq!(names, vec!["BPI", "Primary", "Second"]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let mut catalog = Catalog::with_default_pattern();
        catalog.add_account(PaymentAccount::new("gcash", "Main", "0915 642 9591", "Maria"));
        catalog.save(&path).unwrap();

        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_malformed_catalog() {
        assert!(matches!(Catalog::from_json("{\"patterns\": 3}"), Err(CatalogError::Parse(_))));
        assert!(matches!(
            Catalog::load(Path::new("/nonexistent/catalog.json")),
            Err(CatalogError::Io(_))
        ));
    }
}
