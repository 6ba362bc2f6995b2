use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use thiserror::Error;

use crate::models::Recipe;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The source could not be read at all (e.g. file not found).
    #[error("recipe catalog {source_name} is unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },
    /// The source was read but is not a list of recipe records.
    #[error("recipe catalog {source_name} is corrupt: {reason}")]
    Corrupt { source_name: String, reason: String },
    /// A record is missing `required_ingredients` or has an unusable
    /// ingredient entry. Never skipped: the whole catalog is rejected.
    #[error("recipe #{index}{} is malformed: {reason}", title_suffix(.title.as_deref()))]
    MalformedRecipe {
        index: usize,
        title: Option<String>,
        reason: String,
    },
}

fn title_suffix(title: Option<&str>) -> String {
    title.map(|t| format!(" ('{t}')")).unwrap_or_default()
}

impl CatalogError {
    /// True when the source itself is missing or unreadable, as opposed to
    /// containing a bad record. Callers may fall back to an empty catalog.
    #[must_use]
    pub fn is_source_failure(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Corrupt { .. })
    }
}

impl Recipe {
    /// Convert a raw catalog record, naming the record on failure.
    pub fn from_record(index: usize, record: Value) -> Result<Self, CatalogError> {
        let title = record
            .get("title")
            .and_then(Value::as_str)
            .map(String::from);
        if !record.is_object() {
            return Err(CatalogError::MalformedRecipe {
                index,
                title,
                reason: "record is not an object".to_string(),
            });
        }
        if record.get("required_ingredients").is_none() {
            return Err(CatalogError::MalformedRecipe {
                index,
                title,
                reason: "missing required_ingredients".to_string(),
            });
        }
        let recipe: Recipe =
            serde_json::from_value(record).map_err(|e| CatalogError::MalformedRecipe {
                index,
                title: title.clone(),
                reason: e.to_string(),
            })?;
        if recipe
            .required_ingredients
            .iter()
            .any(|ri| ri.item.trim().is_empty())
        {
            return Err(CatalogError::MalformedRecipe {
                index,
                title,
                reason: "blank ingredient name".to_string(),
            });
        }
        Ok(recipe)
    }
}

/// Parse a JSON array of recipe records.
pub fn parse_catalog_json(source_name: &str, json: &str) -> Result<Vec<Recipe>, CatalogError> {
    let value: Value = serde_json::from_str(json).map_err(|e| CatalogError::Corrupt {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })?;
    let Value::Array(records) = value else {
        return Err(CatalogError::Corrupt {
            source_name: source_name.to_string(),
            reason: "expected a JSON array of recipes".to_string(),
        });
    };
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| Recipe::from_record(index, record))
        .collect()
}

/// A source of recipe records.
///
/// Implemented by the JSON file loader here and by the Cooklang directory
/// loader in the CLI.
pub trait CatalogProvider: Send + Sync {
    fn load(&self) -> Result<Vec<Recipe>, CatalogError>;

    /// Human-readable name of the source, for logs and messages.
    fn describe(&self) -> String;
}

/// Catalog stored as a single `recipes.json` array.
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogProvider for JsonFileCatalog {
    fn load(&self) -> Result<Vec<Recipe>, CatalogError> {
        let json = std::fs::read_to_string(&self.path).map_err(|e| CatalogError::Unavailable {
            source_name: self.describe(),
            reason: e.to_string(),
        })?;
        parse_catalog_json(&self.describe(), &json)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Recipes loaded once from a provider and cached.
///
/// Readers take a cheap `Arc` snapshot; `reload` swaps the snapshot in one
/// step, and a failed reload keeps the previous one.
pub struct RecipeCatalog {
    provider: Box<dyn CatalogProvider>,
    recipes: RwLock<Arc<Vec<Recipe>>>,
}

impl RecipeCatalog {
    pub fn load(provider: Box<dyn CatalogProvider>) -> Result<Self, CatalogError> {
        let recipes = provider.load()?;
        tracing::info!(
            source = %provider.describe(),
            recipes = recipes.len(),
            "loaded recipe catalog"
        );
        Ok(Self {
            provider,
            recipes: RwLock::new(Arc::new(recipes)),
        })
    }

    /// Like [`RecipeCatalog::load`], but a missing or unreadable source
    /// yields an empty catalog instead of an error. Malformed records are
    /// still an error.
    pub fn load_or_empty(provider: Box<dyn CatalogProvider>) -> Result<Self, CatalogError> {
        match provider.load() {
            Ok(recipes) => {
                tracing::info!(
                    source = %provider.describe(),
                    recipes = recipes.len(),
                    "loaded recipe catalog"
                );
                Ok(Self {
                    provider,
                    recipes: RwLock::new(Arc::new(recipes)),
                })
            }
            Err(e) if e.is_source_failure() => {
                tracing::warn!("{e}; starting with an empty catalog");
                Ok(Self {
                    provider,
                    recipes: RwLock::new(Arc::new(Vec::new())),
                })
            }
            Err(e) => Err(e),
        }
    }

    #[must_use]
    pub fn recipes(&self) -> Arc<Vec<Recipe>> {
        Arc::clone(&self.recipes.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Re-read the provider. Returns the new recipe count.
    pub fn reload(&self) -> Result<usize, CatalogError> {
        let fresh = match self.provider.load() {
            Ok(recipes) => recipes,
            Err(e) => {
                tracing::error!("catalog reload failed, keeping previous catalog: {e}");
                return Err(e);
            }
        };
        let count = fresh.len();
        *self.recipes.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(fresh);
        tracing::info!(
            source = %self.provider.describe(),
            recipes = count,
            "reloaded recipe catalog"
        );
        Ok(count)
    }

    #[must_use]
    pub fn describe(&self) -> String {
        self.provider.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const SAMPLE: &str = r#"[
        {"title": "Pad Thai", "required_ingredients": [{"item": "noodles"}, {"item": "egg"}]},
        {"title": "Rice Bowl", "required_ingredients": [{"item": "rice"}], "servings": 2}
    ]"#;

    /// Provider whose contents can be swapped between loads.
    struct StubProvider {
        result: Mutex<Result<Vec<Recipe>, CatalogError>>,
    }

    impl StubProvider {
        fn ok(recipes: Vec<Recipe>) -> Self {
            Self {
                result: Mutex::new(Ok(recipes)),
            }
        }

        fn err(e: CatalogError) -> Self {
            Self {
                result: Mutex::new(Err(e)),
            }
        }
    }

    impl CatalogProvider for StubProvider {
        // Succeeds at most once; every later load fails.
        fn load(&self) -> Result<Vec<Recipe>, CatalogError> {
            let gone = || CatalogError::Unavailable {
                source_name: "stub".to_string(),
                reason: "gone".to_string(),
            };
            let mut guard = self.result.lock().unwrap();
            std::mem::replace(&mut *guard, Err(gone()))
        }

        fn describe(&self) -> String {
            "stub".to_string()
        }
    }

    #[test]
    fn test_parse_catalog_json() {
        let recipes = parse_catalog_json("sample", SAMPLE).unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].title(), Some("Pad Thai"));
        assert_eq!(recipes[1].fields["servings"], 2);
    }

    #[test]
    fn test_parse_empty_catalog() {
        assert!(parse_catalog_json("empty", "[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_catalog_corrupt() {
        let err = parse_catalog_json("bad", "{not json").unwrap_err();
        assert!(matches!(err, CatalogError::Corrupt { .. }));
        assert!(err.is_source_failure());

        let err = parse_catalog_json("object", r#"{"title": "x"}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Corrupt { .. }));
    }

    #[test]
    fn test_missing_required_ingredients_is_malformed() {
        let json = r#"[
            {"title": "Soup", "required_ingredients": [{"item": "broth"}]},
            {"title": "Mystery Dish", "instructions": ["?"]}
        ]"#;
        let err = parse_catalog_json("catalog", json).unwrap_err();
        assert!(!err.is_source_failure());
        match &err {
            CatalogError::MalformedRecipe { index, title, .. } => {
                assert_eq!(*index, 1);
                assert_eq!(title.as_deref(), Some("Mystery Dish"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            err.to_string(),
            "recipe #1 ('Mystery Dish') is malformed: missing required_ingredients"
        );
    }

    #[test]
    fn test_ingredient_without_item_is_malformed() {
        let json = r#"[{"required_ingredients": [{"name": "salt"}]}]"#;
        let err = parse_catalog_json("catalog", json).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MalformedRecipe {
                index: 0,
                title: None,
                ..
            }
        ));
    }

    #[test]
    fn test_blank_ingredient_name_is_malformed() {
        let json = r#"[
            {"title": "Toast", "required_ingredients": [{"item": "bread"}]},
            {"title": "Blank", "required_ingredients": [{"item": "   "}]}
        ]"#;
        let err = parse_catalog_json("catalog", json).unwrap_err();
        assert!(!err.is_source_failure());
        assert_eq!(
            err.to_string(),
            "recipe #1 ('Blank') is malformed: blank ingredient name"
        );

        let empty = r#"[{"required_ingredients": [{"item": "egg"}, {"item": ""}]}]"#;
        assert!(matches!(
            parse_catalog_json("catalog", empty),
            Err(CatalogError::MalformedRecipe { index: 0, .. })
        ));
    }

    #[test]
    fn test_non_object_record_is_malformed() {
        let err = parse_catalog_json("catalog", r#"["pancakes"]"#).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedRecipe { .. }));
    }

    #[test]
    fn test_json_file_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let provider = JsonFileCatalog::new(&path);
        assert_eq!(provider.load().unwrap().len(), 2);
        assert_eq!(provider.path(), path.as_path());
    }

    #[test]
    fn test_json_file_catalog_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = JsonFileCatalog::new(dir.path().join("nope.json"));
        let err = provider.load().unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable { .. }));
    }

    #[test]
    fn test_load_or_empty_degrades_on_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let catalog =
            RecipeCatalog::load_or_empty(Box::new(JsonFileCatalog::new(dir.path().join("x.json"))))
                .unwrap();
        assert!(catalog.recipes().is_empty());
    }

    #[test]
    fn test_load_or_empty_rejects_malformed_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        std::fs::write(&path, r#"[{"title": "Broken"}]"#).unwrap();

        let result = RecipeCatalog::load_or_empty(Box::new(JsonFileCatalog::new(&path)));
        assert!(matches!(
            result,
            Err(CatalogError::MalformedRecipe { .. })
        ));
    }

    #[test]
    fn test_load_propagates_source_failure() {
        let provider = StubProvider::err(CatalogError::Unavailable {
            source_name: "stub".to_string(),
            reason: "down".to_string(),
        });
        assert!(RecipeCatalog::load(Box::new(provider)).is_err());
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        std::fs::write(&path, "[]").unwrap();

        let catalog = RecipeCatalog::load(Box::new(JsonFileCatalog::new(&path))).unwrap();
        assert!(catalog.recipes().is_empty());

        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(catalog.reload().unwrap(), 2);
        assert_eq!(catalog.recipes().len(), 2);
    }

    #[test]
    fn test_failed_reload_keeps_previous_snapshot() {
        let provider = StubProvider::ok(vec![Recipe::new("Toast", ["bread"])]);
        let catalog = RecipeCatalog::load(Box::new(provider)).unwrap();
        let before = catalog.recipes();

        assert!(catalog.reload().is_err());
        let after = catalog.recipes();
        assert_eq!(after.len(), 1);
        assert!(Arc::ptr_eq(&before, &after));
    }
}
