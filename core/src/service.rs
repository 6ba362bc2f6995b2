use std::sync::Arc;

use crate::analyzer::RecipeAnalyzer;
use crate::catalog::{CatalogError, CatalogProvider, RecipeCatalog};
use crate::models::{AnalysisResult, AvailableIngredients, Recipe};
use crate::substitutions::SubstitutionTable;

/// Entry point for front ends (CLI, web server).
///
/// Owns the substitution table and the cached catalog. Both are set up once;
/// only the catalog can change afterwards, through [`PantryService::reload_catalog`].
pub struct PantryService {
    table: SubstitutionTable,
    catalog: RecipeCatalog,
}

impl PantryService {
    #[must_use]
    pub fn new(table: SubstitutionTable, catalog: RecipeCatalog) -> Self {
        Self { table, catalog }
    }

    /// Load the catalog from `provider`, failing on any catalog error.
    pub fn open(
        table: SubstitutionTable,
        provider: Box<dyn CatalogProvider>,
    ) -> Result<Self, CatalogError> {
        Ok(Self::new(table, RecipeCatalog::load(provider)?))
    }

    // --- Catalog ---

    /// Current catalog snapshot. Stays valid across reloads.
    #[must_use]
    pub fn recipes(&self) -> Arc<Vec<Recipe>> {
        self.catalog.recipes()
    }

    pub fn reload_catalog(&self) -> Result<usize, CatalogError> {
        self.catalog.reload()
    }

    #[must_use]
    pub fn catalog_source(&self) -> String {
        self.catalog.describe()
    }

    // --- Substitutions ---

    #[must_use]
    pub fn substitution_table(&self) -> &SubstitutionTable {
        &self.table
    }

    #[must_use]
    pub fn substitutes_for(&self, ingredient: &str) -> Vec<String> {
        self.table.substitutes_for(ingredient).iter().cloned().collect()
    }

    // --- Matching ---

    #[must_use]
    pub fn analyzer(&self) -> RecipeAnalyzer<'_> {
        RecipeAnalyzer::new(&self.table)
    }

    /// Rank `recipes` (usually a snapshot from [`PantryService::recipes`])
    /// against a raw comma-separated ingredient list.
    #[must_use]
    pub fn rank<'r>(
        &self,
        recipes: &'r [Recipe],
        raw_ingredients: &str,
    ) -> Vec<AnalysisResult<'r>> {
        let available = AvailableIngredients::parse(raw_ingredients);
        tracing::debug!(
            available = available.len(),
            recipes = recipes.len(),
            "ranking recipes"
        );
        self.analyzer().rank(recipes, &available)
    }
}
