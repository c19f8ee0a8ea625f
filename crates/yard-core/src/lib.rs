#![deny(warnings)]

//! Core domain models and invariants for the boatyard.
//!
//! This crate defines the serializable types shared by the production
//! controller, the data loader and the builder panels, together with
//! validation helpers and the inventory collaborator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

mod stockpile;

pub use stockpile::{SharedStockpile, Stockpile};

/// Resource identifier, e.g. "wood", "gold", "textile".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKind(pub String);

/// Identifier of a production recipe (a production line of the building).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub String);

/// Identifier of the unit type a recipe produces, e.g. "huker".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitTypeId(pub String);

macro_rules! display_inner {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        })*
    };
}

display_inner!(ResourceKind, RecipeId, UnitTypeId);

impl ResourceKind {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Gold is shown as a plain amount, everything else in tons.
    pub fn is_gold(&self) -> bool {
        self.0.eq_ignore_ascii_case("gold")
    }
}

impl RecipeId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl UnitTypeId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

/// Unsigned resource quantities keyed by kind.
pub type ResourceAmounts = BTreeMap<ResourceKind, u64>;

/// One line of a recipe: negative amounts are consumed, positive produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDelta {
    pub resource: ResourceKind,
    pub amount: i64,
}

/// Immutable production recipe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecipe {
    /// Recipe key in the catalog.
    pub id: RecipeId,
    /// Human-readable name, used as tooltip text.
    pub name: String,
    /// Signed resource entries.
    pub resources: Vec<ResourceDelta>,
    /// Total work-time required (>= 0).
    pub work_time: Decimal,
    /// Unit handed out when the order completes.
    pub produces: UnitTypeId,
}

impl ProductionRecipe {
    /// Amounts consumed by one order, as positive quantities.
    pub fn consumed(&self) -> ResourceAmounts {
        self.resources
            .iter()
            .filter(|d| d.amount < 0)
            .map(|d| (d.resource.clone(), d.amount.unsigned_abs()))
            .collect()
    }

    /// Amounts credited when the order is collected.
    pub fn produced(&self) -> ResourceAmounts {
        self.resources
            .iter()
            .filter(|d| d.amount > 0)
            .map(|d| (d.resource.clone(), d.amount.unsigned_abs()))
            .collect()
    }

    /// Consumed entries sorted ascending by signed amount, so the most
    /// expensive resource comes first.
    pub fn costs_by_amount(&self) -> Vec<(ResourceKind, i64)> {
        let mut costs: Vec<(ResourceKind, i64)> = self
            .resources
            .iter()
            .filter(|d| d.amount < 0)
            .map(|d| (d.resource.clone(), d.amount))
            .collect();
        costs.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        costs
    }
}

/// One buildable ship shown in a builder tab.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowcaseEntry {
    pub unit: UnitTypeId,
    pub recipe: RecipeId,
}

/// A builder tab described as data: fisher boats, trade boats, war ships.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowcaseCategory {
    pub id: String,
    /// Headline shown at the top of the tab.
    pub headline: String,
    pub icon_path: String,
    #[serde(default)]
    pub entries: Vec<ShowcaseEntry>,
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Identifiers and names must not be blank.
    #[error("empty {0}")]
    Empty(&'static str),
    /// Work-time must be non-negative.
    #[error("recipe {0}: work time must be >= 0")]
    NegativeWorkTime(String),
    /// Zero amounts carry no meaning in a recipe.
    #[error("recipe {recipe}: zero amount for {resource}")]
    ZeroAmount { recipe: String, resource: String },
    /// Each resource may appear once per recipe.
    #[error("recipe {recipe}: resource {resource} listed twice")]
    DuplicateResource { recipe: String, resource: String },
    /// Two recipes share an id.
    #[error("duplicate recipe id: {0}")]
    DuplicateRecipe(String),
    /// A showcase entry points at a recipe the catalog does not know.
    #[error("category {category}: recipe not found: {recipe}")]
    RecipeNotFound { category: String, recipe: String },
}

/// Validate a single recipe.
pub fn validate_recipe(r: &ProductionRecipe) -> Result<(), ValidationError> {
    if r.id.0.trim().is_empty() {
        return Err(ValidationError::Empty("recipe id"));
    }
    if r.name.trim().is_empty() {
        return Err(ValidationError::Empty("recipe name"));
    }
    if r.produces.0.trim().is_empty() {
        return Err(ValidationError::Empty("product"));
    }
    if r.work_time < Decimal::ZERO {
        return Err(ValidationError::NegativeWorkTime(r.id.0.clone()));
    }
    let mut seen: BTreeSet<&ResourceKind> = BTreeSet::new();
    for d in &r.resources {
        if d.resource.0.trim().is_empty() {
            return Err(ValidationError::Empty("resource kind"));
        }
        if d.amount == 0 {
            return Err(ValidationError::ZeroAmount {
                recipe: r.id.0.clone(),
                resource: d.resource.0.clone(),
            });
        }
        if !seen.insert(&d.resource) {
            return Err(ValidationError::DuplicateResource {
                recipe: r.id.0.clone(),
                resource: d.resource.0.clone(),
            });
        }
    }
    Ok(())
}

/// Validate that every entry of a category references a known recipe.
pub fn validate_category(
    c: &ShowcaseCategory,
    catalog: &RecipeCatalog,
) -> Result<(), ValidationError> {
    if c.id.trim().is_empty() {
        return Err(ValidationError::Empty("category id"));
    }
    for e in &c.entries {
        if catalog.lookup(&e.recipe).is_none() {
            return Err(ValidationError::RecipeNotFound {
                category: c.id.clone(),
                recipe: e.recipe.0.clone(),
            });
        }
    }
    Ok(())
}

/// Validated, read-only set of recipes built once at load time.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RecipeCatalog {
    recipes: BTreeMap<RecipeId, ProductionRecipe>,
}

impl RecipeCatalog {
    pub fn new(recipes: Vec<ProductionRecipe>) -> Result<Self, ValidationError> {
        let mut map = BTreeMap::new();
        for r in recipes {
            validate_recipe(&r)?;
            if map.contains_key(&r.id) {
                return Err(ValidationError::DuplicateRecipe(r.id.0.clone()));
            }
            map.insert(r.id.clone(), r);
        }
        Ok(Self { recipes: map })
    }

    pub fn lookup(&self, id: &RecipeId) -> Option<&ProductionRecipe> {
        self.recipes.get(id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductionRecipe> {
        self.recipes.values()
    }
}

/// Resource pool a building draws from.
///
/// `reserve` must be all-or-nothing: either every amount is deducted or
/// nothing is.
pub trait Inventory {
    /// Quantity currently on hand.
    fn available(&self, kind: &ResourceKind) -> u64;

    /// Deduct every amount, or none of them. Returns whether it happened.
    fn reserve(&mut self, amounts: &ResourceAmounts) -> bool;

    /// Put previously reserved amounts back.
    fn refund(&mut self, amounts: &ResourceAmounts);

    /// Credit newly produced amounts.
    fn deposit(&mut self, amounts: &ResourceAmounts) {
        self.refund(amounts);
    }

    /// Amounts from `wanted` that are not on hand, with the shortfall.
    fn missing(&self, wanted: &ResourceAmounts) -> ResourceAmounts {
        wanted
            .iter()
            .filter_map(|(k, &need)| {
                let have = self.available(k);
                (have < need).then(|| (k.clone(), need - have))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn delta(r: &str, amount: i64) -> ResourceDelta {
        ResourceDelta {
            resource: ResourceKind::new(r),
            amount,
        }
    }

    fn boat() -> ProductionRecipe {
        ProductionRecipe {
            id: RecipeId::new("huker"),
            name: "Huker".to_string(),
            resources: vec![delta("wood", -10), delta("gold", -500), delta("textile", -4)],
            work_time: Decimal::new(20, 0),
            produces: UnitTypeId::new("huker_ship"),
        }
    }

    #[test]
    fn recipe_serde_roundtrip() {
        let r = boat();
        let s = serde_json::to_string(&r).unwrap();
        let back: ProductionRecipe = serde_json::from_str(&s).unwrap();
        assert_eq!(back, r);
        assert!(s.contains("\"huker_ship\""));
    }

    #[test]
    fn consumed_and_produced_split_on_sign() {
        let mut r = boat();
        r.resources.push(delta("experience", 3));
        let consumed = r.consumed();
        assert_eq!(consumed.len(), 3);
        assert_eq!(consumed[&ResourceKind::new("gold")], 500);
        let produced = r.produced();
        assert_eq!(produced.len(), 1);
        assert_eq!(produced[&ResourceKind::new("experience")], 3);
    }

    #[test]
    fn costs_sorted_most_expensive_first() {
        let costs = boat().costs_by_amount();
        let kinds: Vec<&str> = costs.iter().map(|(k, _)| k.0.as_str()).collect();
        assert_eq!(kinds, ["gold", "wood", "textile"]);
    }

    #[test]
    fn validation_rejects_bad_recipes() {
        let mut r = boat();
        r.work_time = Decimal::new(-1, 0);
        assert_eq!(
            validate_recipe(&r),
            Err(ValidationError::NegativeWorkTime("huker".into()))
        );

        let mut r = boat();
        r.resources.push(delta("wood", -1));
        assert!(matches!(
            validate_recipe(&r),
            Err(ValidationError::DuplicateResource { .. })
        ));

        let mut r = boat();
        r.resources[0].amount = 0;
        assert!(matches!(
            validate_recipe(&r),
            Err(ValidationError::ZeroAmount { .. })
        ));

        let mut r = boat();
        r.name = "  ".into();
        assert_eq!(validate_recipe(&r), Err(ValidationError::Empty("recipe name")));
    }

    #[test]
    fn catalog_rejects_duplicates_and_looks_up() {
        let err = RecipeCatalog::new(vec![boat(), boat()]).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateRecipe("huker".into()));

        let catalog = RecipeCatalog::new(vec![boat()]).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.lookup(&RecipeId::new("huker")).is_some());
        assert!(catalog.lookup(&RecipeId::new("frigate")).is_none());
    }

    #[test]
    fn category_must_reference_known_recipes() {
        let catalog = RecipeCatalog::new(vec![boat()]).unwrap();
        let mut cat = ShowcaseCategory {
            id: "trade".into(),
            headline: "Trade boats".into(),
            icon_path: "icons/tabwidget/boatbuilder/trade".into(),
            entries: vec![ShowcaseEntry {
                unit: UnitTypeId::new("huker_ship"),
                recipe: RecipeId::new("huker"),
            }],
        };
        assert!(validate_category(&cat, &catalog).is_ok());
        cat.entries.push(ShowcaseEntry {
            unit: UnitTypeId::new("frigate"),
            recipe: RecipeId::new("frigate"),
        });
        assert!(matches!(
            validate_category(&cat, &catalog),
            Err(ValidationError::RecipeNotFound { .. })
        ));
    }

    proptest! {
        #[test]
        fn consumed_amounts_are_absolute(a in 1i64..10_000, b in 1i64..10_000) {
            let r = ProductionRecipe {
                id: RecipeId::new("r"),
                name: "R".into(),
                resources: vec![delta("wood", -a), delta("tools", -b)],
                work_time: Decimal::ONE,
                produces: UnitTypeId::new("u"),
            };
            prop_assert!(validate_recipe(&r).is_ok());
            let c = r.consumed();
            prop_assert_eq!(c[&ResourceKind::new("wood")], a as u64);
            prop_assert_eq!(c[&ResourceKind::new("tools")], b as u64);
        }
    }
}
