use anyhow::Result;
use std::collections::BTreeMap;
use std::process;
use tabled::{Table, Tabled, settings::Style};

use pantry_core::models::normalize_ingredient;
use pantry_core::service::PantryService;

use super::helpers::join_set;

pub(crate) fn cmd_substitutes(svc: &PantryService, ingredient: &str, json: bool) -> Result<()> {
    let ingredient = normalize_ingredient(ingredient);
    let substitutes = svc.substitutes_for(&ingredient);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "ingredient": ingredient,
                "substitutes": substitutes,
            }))?
        );
    } else if substitutes.is_empty() {
        eprintln!("No substitutes known for '{ingredient}'");
    } else {
        println!("{ingredient} can be replaced by:");
        for sub in &substitutes {
            println!("  - {sub}");
        }
    }

    if substitutes.is_empty() {
        process::exit(2);
    }

    Ok(())
}

pub(crate) fn cmd_substitutes_all(svc: &PantryService, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct RuleRow {
        #[tabled(rename = "Substitute")]
        substitute: String,
        #[tabled(rename = "Can replace")]
        targets: String,
    }

    let table = svc.substitution_table();

    if json {
        let rules: BTreeMap<&str, Vec<&str>> = table
            .rules()
            .map(|(sub, targets)| (sub, targets.iter().map(String::as_str).collect()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    if table.is_empty() {
        eprintln!("Substitution table is empty");
        process::exit(2);
    }

    let rows: Vec<RuleRow> = table
        .rules()
        .map(|(sub, targets)| RuleRow {
            substitute: sub.to_string(),
            targets: join_set(targets),
        })
        .collect();

    let rendered = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{rendered}");
    Ok(())
}
