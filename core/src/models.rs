use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalize an ingredient name: trimmed and lowercased.
///
/// Every name that enters the matcher (user input, recipe items, substitution
/// table entries) goes through this so comparisons are case-insensitive.
#[must_use]
pub fn normalize_ingredient(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A recipe record from the catalog.
///
/// Only `required_ingredients` is examined. Every other field (title,
/// instructions, servings, ...) is kept verbatim in `fields` and serialized
/// back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub required_ingredients: Vec<RequiredIngredient>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredIngredient {
    pub item: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequiredIngredient {
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            extra: Map::new(),
        }
    }
}

impl Recipe {
    /// Build a recipe with a title and a list of required item names.
    pub fn new<I, S>(title: &str, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = Map::new();
        fields.insert("title".to_string(), Value::String(title.to_string()));
        Self {
            required_ingredients: items.into_iter().map(RequiredIngredient::new).collect(),
            fields,
        }
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }

    /// Required ingredient names, normalized, duplicates collapsed,
    /// in order of first appearance.
    #[must_use]
    pub fn unique_ingredients(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.required_ingredients
            .iter()
            .map(|ri| normalize_ingredient(&ri.item))
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }
}

/// The set of ingredients the user has on hand for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AvailableIngredients(BTreeSet<String>);

impl AvailableIngredients {
    /// Parse a comma-separated list, e.g. `" Rice, RICE ,noodles"`.
    ///
    /// Tokens are trimmed and lowercased; empty tokens are dropped.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.split(',').collect()
    }

    #[must_use]
    pub fn contains(&self, ingredient: &str) -> bool {
        self.0.contains(ingredient)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for AvailableIngredients {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|s| normalize_ingredient(s.as_ref()))
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Perfect,
    WithSubstitutions,
    Gapped,
}

impl MatchStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Perfect => "ready",
            Self::WithSubstitutions => "with substitutions",
            Self::Gapped => "missing",
        }
    }
}

/// A missing ingredient that can be covered by something the user has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitution {
    pub item: String,
    pub substitutes: Vec<String>,
}

/// Outcome of checking one recipe against the available ingredients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult<'r> {
    pub recipe: &'r Recipe,
    pub is_perfect: bool,
    pub is_makeable_with_subs: bool,
    /// Hard-missing ingredients only; substitutable ones don't count.
    pub missing_count: usize,
    pub missing_items: Vec<String>,
    pub substitutions_required: Vec<Substitution>,
}

impl AnalysisResult<'_> {
    #[must_use]
    pub fn status(&self) -> MatchStatus {
        if self.is_perfect {
            MatchStatus::Perfect
        } else if self.is_makeable_with_subs {
            MatchStatus::WithSubstitutions
        } else {
            MatchStatus::Gapped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ingredient() {
        assert_eq!(normalize_ingredient("  Olive Oil "), "olive oil");
        assert_eq!(normalize_ingredient("RICE"), "rice");
        assert_eq!(normalize_ingredient("   "), "");
    }

    #[test]
    fn test_parse_available_trims_folds_and_dedups() {
        let available = AvailableIngredients::parse(" Rice, RICE ,noodles");
        let items: Vec<&str> = available.iter().collect();
        assert_eq!(items, vec!["noodles", "rice"]);
    }

    #[test]
    fn test_parse_available_drops_empty_tokens() {
        let available = AvailableIngredients::parse(", ,eggs,,  ");
        assert_eq!(available.len(), 1);
        assert!(available.contains("eggs"));

        assert!(AvailableIngredients::parse("").is_empty());
    }

    #[test]
    fn test_recipe_passthrough_fields_roundtrip() {
        let json = r#"{
            "title": "Pancakes",
            "instructions": ["Mix", "Fry"],
            "required_ingredients": [{"item": "flour", "amount": "2 cups"}]
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.title(), Some("Pancakes"));
        assert_eq!(recipe.required_ingredients[0].item, "flour");
        assert_eq!(recipe.required_ingredients[0].extra["amount"], "2 cups");

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value["instructions"][1], "Fry");
        assert_eq!(value["required_ingredients"][0]["amount"], "2 cups");
    }

    #[test]
    fn test_recipe_missing_required_ingredients_fails() {
        let json = r#"{"title": "Toast"}"#;
        assert!(serde_json::from_str::<Recipe>(json).is_err());
    }

    #[test]
    fn test_unique_ingredients_collapses_duplicates() {
        let recipe = Recipe::new("Fried Rice", ["Rice", "egg", "rice ", "EGG", "soy sauce"]);
        assert_eq!(
            recipe.unique_ingredients(),
            vec!["rice", "egg", "soy sauce"]
        );
    }

    #[test]
    fn test_recipe_without_title() {
        let recipe: Recipe =
            serde_json::from_str(r#"{"required_ingredients": [{"item": "salt"}]}"#).unwrap();
        assert!(recipe.title().is_none());
    }
}
