use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::normalize_ingredient;

static NO_SUBSTITUTES: BTreeSet<String> = BTreeSet::new();

/// Default table: substitute -> ingredients it can stand in for.
const BUILTIN_RULES: &[(&str, &[&str])] = &[
    ("vegetable broth", &["broth"]),
    ("chicken broth", &["broth"]),
    ("coconut milk", &["cream", "milk"]),
    ("milk", &["cream"]),
    ("olive oil", &["butter"]),
    ("butter", &["olive oil"]),
    ("spaghetti", &["noodles"]),
    ("rice", &["noodles"]),
    ("noodles", &["spaghetti", "rice"]),
];

/// Directed many-to-many substitution table.
///
/// Rules are declared as `substitute -> targets`. Lookups go the other way
/// (`target -> substitutes`), so the inverted index is built once at
/// construction and never rebuilt. A rule `milk -> cream` does not imply
/// `cream -> milk`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionTable {
    rules: BTreeMap<String, BTreeSet<String>>,
    inverted: BTreeMap<String, BTreeSet<String>>,
}

impl SubstitutionTable {
    pub fn from_rules<I, S, T, U>(rules: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: IntoIterator<Item = U>,
        U: AsRef<str>,
    {
        let mut table = Self::default();
        for (substitute, targets) in rules {
            let substitute = normalize_ingredient(substitute.as_ref());
            if substitute.is_empty() {
                continue;
            }
            let entry = table.rules.entry(substitute.clone()).or_default();
            for target in targets {
                let target = normalize_ingredient(target.as_ref());
                // An ingredient trivially replaces itself; it's never reported.
                if target.is_empty() || target == substitute {
                    continue;
                }
                entry.insert(target.clone());
                table
                    .inverted
                    .entry(target)
                    .or_default()
                    .insert(substitute.clone());
            }
        }
        table
    }

    #[must_use]
    pub fn builtin() -> Self {
        Self::from_rules(BUILTIN_RULES.iter().map(|(sub, targets)| (*sub, *targets)))
    }

    /// Parse a JSON object of the form `{"substitute": ["target", ...]}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let rules: BTreeMap<String, Vec<String>> =
            serde_json::from_str(json).context("Invalid substitution table JSON")?;
        Ok(Self::from_rules(rules))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).with_context(|| {
            format!("Failed to read substitution table: {}", path.display())
        })?;
        let table = Self::from_json_str(&json)
            .with_context(|| format!("Failed to load substitution table: {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            rules = table.len(),
            "loaded substitution table"
        );
        Ok(table)
    }

    /// Every ingredient that may stand in for `ingredient`, in sorted order.
    ///
    /// Unknown ingredients have no substitutes.
    #[must_use]
    pub fn substitutes_for(&self, ingredient: &str) -> &BTreeSet<String> {
        self.inverted
            .get(normalize_ingredient(ingredient).as_str())
            .unwrap_or(&NO_SUBSTITUTES)
    }

    /// Forward view of the table: `(substitute, targets it can replace)`.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.rules.iter().map(|(sub, targets)| (sub.as_str(), targets))
    }

    /// Number of substitutes with at least one declared rule.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
