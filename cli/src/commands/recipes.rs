use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use pantry_core::service::PantryService;

use super::helpers::{join_or_dash, recipe_title, truncate};

pub(crate) fn cmd_recipes(svc: &PantryService, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "Recipe")]
        title: String,
        #[tabled(rename = "Items")]
        count: usize,
        #[tabled(rename = "Ingredients")]
        ingredients: String,
    }

    let recipes = svc.recipes();

    if recipes.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No recipes in catalog ({})", svc.catalog_source());
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&*recipes)?);
        return Ok(());
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .enumerate()
        .map(|(i, recipe)| {
            let items = recipe.unique_ingredients();
            RecipeRow {
                idx: i + 1,
                title: truncate(&recipe_title(recipe), 35),
                count: items.len(),
                ingredients: truncate(&join_or_dash(&items), 60),
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    println!("{} recipes from {}", recipes.len(), svc.catalog_source());

    Ok(())
}
