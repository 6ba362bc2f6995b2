use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use pantry_core::catalog::{CatalogError, CatalogProvider};
use pantry_core::models::{Recipe, RequiredIngredient};

/// Catalog built from a directory of Cooklang (`.cook`) files, one recipe
/// per file, read in filename order.
pub struct CooklangCatalog {
    dir: PathBuf,
}

impl CooklangCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn cook_files(&self) -> Result<Vec<PathBuf>, CatalogError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| CatalogError::Unavailable {
            source_name: self.describe(),
            reason: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| CatalogError::Unavailable {
                    source_name: self.describe(),
                    reason: e.to_string(),
                })?
                .path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "cook") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl CatalogProvider for CooklangCatalog {
    fn load(&self) -> Result<Vec<Recipe>, CatalogError> {
        let files = self.cook_files()?;
        let mut recipes = Vec::with_capacity(files.len());

        for (index, file) in files.iter().enumerate() {
            let input = std::fs::read_to_string(file).map_err(|e| CatalogError::Unavailable {
                source_name: file.display().to_string(),
                reason: e.to_string(),
            })?;
            recipes.push(parse_cook_recipe(index, file, &input)?);
        }

        Ok(recipes)
    }

    fn describe(&self) -> String {
        format!("cooklang:{}", self.dir.display())
    }
}

fn parse_cook_recipe(index: usize, file: &Path, input: &str) -> Result<Recipe, CatalogError> {
    let file_stem = file.file_stem().and_then(|s| s.to_str()).map(String::from);

    let (recipe_data, _report) = cooklang::parse(input).into_result().map_err(|e| {
        CatalogError::MalformedRecipe {
            index,
            title: file_stem.clone(),
            reason: format!("Failed to parse Cooklang file: {e}"),
        }
    })?;

    let title = recipe_data
        .metadata
        .title()
        .map(String::from)
        .or(file_stem)
        .unwrap_or_else(|| format!("recipe {index}"));

    let converter = cooklang::Converter::default();
    let grouped = recipe_data.group_ingredients(&converter);
    let required_ingredients = grouped
        .iter()
        .map(|gi| RequiredIngredient::new(gi.ingredient.display_name().to_string()))
        .collect();

    let mut fields = Map::new();
    fields.insert("title".to_string(), Value::String(title));
    if let Some(servings) = recipe_data
        .metadata
        .servings()
        .and_then(|s| s.as_number().map(f64::from))
        .and_then(serde_json::Number::from_f64)
    {
        fields.insert("servings".to_string(), Value::Number(servings));
    }
    if let Some(name) = file.file_name().and_then(|s| s.to_str()) {
        fields.insert("source_file".to_string(), Value::String(name.to_string()));
    }

    Ok(Recipe {
        required_ingredients,
        fields,
    })
}
