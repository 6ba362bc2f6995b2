mod commands;
mod config;
mod cooklang_catalog;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{cmd_match, cmd_recipes, cmd_substitutes, cmd_substitutes_all};
use crate::config::Config;
use pantry_core::catalog::RecipeCatalog;
use pantry_core::service::PantryService;

#[derive(Parser)]
#[command(
    name = "pantry",
    version,
    about = "Find recipes you can cook with what's in your kitchen",
    long_about = "Find recipes you can cook with what's in your kitchen.\n\n\
                  Recipes are ranked by how close you are to making them: ready to cook,\n\
                  makeable with substitutions, then by how few ingredients are missing."
)]
struct Cli {
    /// Recipe catalog: a JSON file or a directory of .cook files
    #[arg(long, global = true, value_name = "PATH")]
    catalog: Option<PathBuf>,
    /// Substitution table JSON file (substitute -> ingredients it replaces)
    #[arg(long, global = true, value_name = "PATH")]
    substitutions: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank recipes against the ingredients you have
    Match {
        /// Comma-separated ingredients (e.g. "rice, eggs, olive oil")
        ingredients: String,
        /// Show at most N recipes
        #[arg(short, long)]
        limit: Option<usize>,
        /// Only show recipes you can make now, with or without substitutions
        #[arg(long)]
        makeable: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show what can stand in for an ingredient
    Substitutes {
        /// Ingredient to look up
        #[arg(required_unless_present = "all")]
        ingredient: Option<String>,
        /// List the whole substitution table
        #[arg(long, conflicts_with = "ingredient")]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recipes in the catalog
    Recipes {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the web interface and JSON API
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

/// A catalog named with `--catalog` must load. The default one in the data
/// directory may be missing, in which case we start empty.
fn open_catalog(config: &Config, override_path: Option<&Path>) -> Result<RecipeCatalog> {
    let provider = config.catalog_provider(override_path);
    let catalog = if override_path.is_some() {
        RecipeCatalog::load(provider)?
    } else {
        RecipeCatalog::load_or_empty(provider)?
    };
    Ok(catalog)
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    tracing::debug!(data_dir = %config.data_dir.display(), "using data directory");
    let table = config.substitution_table(cli.substitutions.as_deref())?;
    let catalog = open_catalog(&config, cli.catalog.as_deref())?;
    let svc = PantryService::new(table, catalog);

    match cli.command {
        Commands::Match {
            ingredients,
            limit,
            makeable,
            json,
        } => cmd_match(&svc, &ingredients, limit, makeable, json),
        Commands::Substitutes {
            ingredient,
            all,
            json,
        } => match ingredient {
            Some(ingredient) if !all => cmd_substitutes(&svc, &ingredient, json),
            _ => cmd_substitutes_all(&svc, json),
        },
        Commands::Recipes { json } => cmd_recipes(&svc, json),
        Commands::Serve { port, bind } => server::start_server(svc, port, &bind).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_catalog_after_subcommand() {
        let cli = Cli::try_parse_from(["pantry", "match", "rice, egg", "--catalog", "r.json"])
            .unwrap();
        assert_eq!(cli.catalog, Some(PathBuf::from("r.json")));
        match cli.command {
            Commands::Match { ingredients, .. } => assert_eq!(ingredients, "rice, egg"),
            _ => panic!("expected match"),
        }
    }

    #[test]
    fn test_explicit_missing_catalog_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_data_dir(dir.path().to_path_buf());
        let missing = dir.path().join("typo.json");

        let err = open_catalog(&config, Some(&missing)).err().expect("expected open_catalog to fail");
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn test_default_missing_catalog_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_data_dir(dir.path().to_path_buf());

        let catalog = open_catalog(&config, None).unwrap();
        assert!(catalog.recipes().is_empty());
    }

    #[test]
    fn test_substitutes_requires_ingredient_or_all() {
        assert!(Cli::try_parse_from(["pantry", "substitutes"]).is_err());
        assert!(Cli::try_parse_from(["pantry", "substitutes", "--all"]).is_ok());
        assert!(Cli::try_parse_from(["pantry", "substitutes", "cream", "--all"]).is_err());
    }
}
