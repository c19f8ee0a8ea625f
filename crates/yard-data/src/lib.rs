#![deny(warnings)]

//! YAML game data: production recipes, builder tabs and starting stock.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use yard_core::{
    validate_category, ProductionRecipe, RecipeCatalog, ShowcaseCategory, Stockpile,
    ValidationError,
};

/// Data shipped with the game, used when no file is given.
pub const BUNDLED: &str = include_str!("../../../assets/data/boatyard.yaml");

#[derive(Debug, Error)]
pub enum DataError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid yaml: {0}")]
    Parse(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl From<std::io::Error> for DataError {
    fn from(e: std::io::Error) -> Self {
        DataError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for DataError {
    fn from(e: serde_yaml::Error) -> Self {
        DataError::Parse(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct DataFile {
    recipes: Vec<ProductionRecipe>,
    #[serde(default)]
    categories: Vec<ShowcaseCategory>,
    #[serde(default)]
    starting_stock: Stockpile,
}

/// Validated game data.
#[derive(Debug, Clone)]
pub struct GameData {
    pub catalog: Arc<RecipeCatalog>,
    pub categories: Vec<ShowcaseCategory>,
    pub starting_stock: Stockpile,
}

impl GameData {
    pub fn category(&self, id: &str) -> Option<&ShowcaseCategory> {
        self.categories.iter().find(|c| c.id == id)
    }
}

/// Parse and validate a YAML document.
pub fn parse(text: &str) -> Result<GameData, DataError> {
    let file: DataFile = serde_yaml::from_str(text)?;
    let catalog = RecipeCatalog::new(file.recipes)?;
    for c in &file.categories {
        validate_category(c, &catalog)?;
    }
    let mut seen = BTreeSet::new();
    for c in &file.categories {
        if !seen.insert(c.id.as_str()) {
            return Err(DataError::Parse(format!("duplicate category: {}", c.id)));
        }
    }
    Ok(GameData {
        catalog: Arc::new(catalog),
        categories: file.categories,
        starting_stock: file.starting_stock,
    })
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<GameData, DataError> {
    let text = fs::read_to_string(path.as_ref())?;
    let data = parse(&text)?;
    info!(
        path = %path.as_ref().display(),
        recipes = data.catalog.len(),
        categories = data.categories.len(),
        "game data loaded"
    );
    Ok(data)
}

pub fn bundled() -> Result<GameData, DataError> {
    parse(BUNDLED)
}
