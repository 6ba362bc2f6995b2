use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use pantry_core::models::{AnalysisResult, MatchStatus};
use pantry_core::service::PantryService;

use super::helpers::{format_substitutions, join_or_dash, recipe_title, truncate};

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Recipe")]
    title: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Missing")]
    missing_count: usize,
    #[tabled(rename = "Missing items")]
    missing_items: String,
    #[tabled(rename = "Substitutions")]
    substitutions: String,
}

fn match_rows(results: &[AnalysisResult<'_>]) -> Vec<MatchRow> {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| MatchRow {
            rank: i + 1,
            title: truncate(&recipe_title(r.recipe), 35),
            status: r.status().label(),
            missing_count: r.missing_count,
            missing_items: truncate(&join_or_dash(&r.missing_items), 40),
            substitutions: truncate(&format_substitutions(&r.substitutions_required), 50),
        })
        .collect()
}

/// Drop gapped recipes if asked, then keep the first `limit`.
fn select_results(
    mut ranked: Vec<AnalysisResult<'_>>,
    makeable_only: bool,
    limit: Option<usize>,
) -> Vec<AnalysisResult<'_>> {
    if makeable_only {
        ranked.retain(|r| r.status() != MatchStatus::Gapped);
    }
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

pub(crate) fn cmd_match(
    svc: &PantryService,
    ingredients: &str,
    limit: Option<usize>,
    makeable_only: bool,
    json: bool,
) -> Result<()> {
    let recipes = svc.recipes();
    let ranked = select_results(svc.rank(&recipes, ingredients), makeable_only, limit);

    if ranked.is_empty() {
        if json {
            println!("[]");
        } else if recipes.is_empty() {
            eprintln!("No recipes in catalog ({})", svc.catalog_source());
        } else {
            eprintln!("No recipes you can make with '{ingredients}'");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    let table = Table::new(match_rows(&ranked))
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    let ready = ranked.iter().filter(|r| r.is_perfect).count();
    let with_subs = ranked.iter().filter(|r| r.is_makeable_with_subs).count();
    println!("{ready} ready, {with_subs} with substitutions");

    Ok(())
}
