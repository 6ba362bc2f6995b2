use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use crate::cooklang_catalog::CooklangCatalog;
use pantry_core::catalog::{CatalogProvider, JsonFileCatalog};
use pantry_core::substitutions::SubstitutionTable;

pub struct Config {
    pub data_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub substitutions_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "pantry").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Self::with_data_dir(data_dir))
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Config {
            catalog_path: data_dir.join("recipes.json"),
            substitutions_path: data_dir.join("substitutions.json"),
            data_dir,
        }
    }

    /// Pick the catalog source: an explicit path wins over `recipes.json` in
    /// the data directory. Directories are read as Cooklang collections.
    pub fn catalog_provider(&self, override_path: Option<&Path>) -> Box<dyn CatalogProvider> {
        let path = override_path.map_or_else(|| self.catalog_path.clone(), Path::to_path_buf);
        if path.is_dir() {
            Box::new(CooklangCatalog::new(path))
        } else {
            Box::new(JsonFileCatalog::new(path))
        }
    }

    /// Load the substitution table: an explicit file, else
    /// `substitutions.json` in the data directory if present, else the
    /// built-in table.
    pub fn substitution_table(&self, override_path: Option<&Path>) -> Result<SubstitutionTable> {
        match override_path {
            Some(path) => SubstitutionTable::from_json_file(path),
            None if self.substitutions_path.exists() => {
                SubstitutionTable::from_json_file(&self.substitutions_path)
            }
            None => Ok(SubstitutionTable::builtin()),
        }
    }
}
