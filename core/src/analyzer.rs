use crate::models::{AnalysisResult, AvailableIngredients, Recipe, Substitution};
use crate::substitutions::SubstitutionTable;

/// Checks recipes against a set of available ingredients.
///
/// Holds no state besides the (immutable) substitution table, so one analyzer
/// can serve any number of requests.
#[derive(Debug, Clone, Copy)]
pub struct RecipeAnalyzer<'t> {
    table: &'t SubstitutionTable,
}

impl<'t> RecipeAnalyzer<'t> {
    #[must_use]
    pub fn new(table: &'t SubstitutionTable) -> Self {
        Self { table }
    }

    /// Classify one recipe.
    ///
    /// Each required ingredient the user lacks is either substitutable (some
    /// substitute for it is available) or hard-missing. Only hard-missing
    /// ingredients count towards `missing_count`.
    #[must_use]
    pub fn analyze<'r>(
        &self,
        recipe: &'r Recipe,
        available: &AvailableIngredients,
    ) -> AnalysisResult<'r> {
        let mut missing_items = Vec::new();
        let mut substitutions_required = Vec::new();

        for item in recipe.unique_ingredients() {
            if available.contains(&item) {
                continue;
            }
            let substitutes: Vec<String> = self
                .table
                .substitutes_for(&item)
                .iter()
                .filter(|sub| available.contains(sub.as_str()))
                .cloned()
                .collect();
            if substitutes.is_empty() {
                missing_items.push(item);
            } else {
                substitutions_required.push(Substitution { item, substitutes });
            }
        }

        let missing_count = missing_items.len();
        AnalysisResult {
            recipe,
            is_perfect: missing_count == 0 && substitutions_required.is_empty(),
            is_makeable_with_subs: missing_count == 0 && !substitutions_required.is_empty(),
            missing_count,
            missing_items,
            substitutions_required,
        }
    }

    /// Analyze every recipe and order best matches first: perfect, then
    /// makeable with substitutions, then by ascending missing count.
    ///
    /// Recipes that tie keep their catalog order.
    #[must_use]
    pub fn rank<'r>(
        &self,
        recipes: &'r [Recipe],
        available: &AvailableIngredients,
    ) -> Vec<AnalysisResult<'r>> {
        let mut ranked: Vec<(usize, AnalysisResult<'r>)> = recipes
            .iter()
            .map(|recipe| self.analyze(recipe, available))
            .enumerate()
            .collect();
        ranked.sort_by_key(|(index, result)| {
            (
                !result.is_perfect,
                !result.is_makeable_with_subs,
                result.missing_count,
                *index,
            )
        });
        ranked.into_iter().map(|(_, result)| result).collect()
    }
}
