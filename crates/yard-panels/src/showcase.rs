use tracing::{debug, info};
use yard_core::{
    Inventory, ProductionRecipe, RecipeCatalog, RecipeId, ResourceKind, ShowcaseCategory,
    ShowcaseEntry, UnitTypeId,
};
use yard_production::{OrderState, ProductionController};

use crate::{unit_image, PanelAction, PanelError, OVERVIEW_TAB, SHOWCASE_ICON};

/// One cost next to a ship card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostLabel {
    pub resource: ResourceKind,
    pub amount: u64,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShowcaseCard {
    pub index: usize,
    pub unit: UnitTypeId,
    pub recipe: RecipeId,
    pub tooltip: String,
    pub icon_image: String,
    /// Most expensive first.
    pub costs: Vec<CostLabel>,
    /// Why the ship cannot be ordered right now, if it cannot.
    pub unbuildable: Option<String>,
}

impl ShowcaseCard {
    pub fn is_buildable(&self) -> bool {
        self.unbuildable.is_none()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Showcase {
    pub category: String,
    pub headline: String,
    pub icon_path: String,
    pub cards: Vec<ShowcaseCard>,
}

/// Label text for a consumed amount: gold as a plain number, goods in tons.
pub fn cost_label(resource: &ResourceKind, signed_amount: i64) -> String {
    let amount = signed_amount.unsigned_abs();
    if resource.is_gold() {
        amount.to_string()
    } else {
        format!("{amount:02}t")
    }
}

fn describe_missing(missing: &yard_core::ResourceAmounts) -> String {
    let parts: Vec<String> = missing.iter().map(|(k, q)| format!("{q} {k}")).collect();
    format!("missing {}", parts.join(", "))
}

/// Card for a single recipe, checked against the current stock.
pub fn build_card<I: Inventory>(
    index: usize,
    unit: &UnitTypeId,
    recipe: &ProductionRecipe,
    inventory: &I,
) -> ShowcaseCard {
    let costs = recipe
        .costs_by_amount()
        .into_iter()
        .map(|(resource, amount)| CostLabel {
            text: cost_label(&resource, amount),
            amount: amount.unsigned_abs(),
            resource,
        })
        .collect();
    let missing = inventory.missing(&recipe.consumed());
    ShowcaseCard {
        index,
        unit: unit.clone(),
        recipe: recipe.id.clone(),
        tooltip: recipe.name.clone(),
        icon_image: unit_image(SHOWCASE_ICON, unit),
        costs,
        unbuildable: (!missing.is_empty()).then(|| describe_missing(&missing)),
    }
}

/// Render one builder tab from its category data.
pub fn build_showcase<I: Inventory>(
    category: &ShowcaseCategory,
    catalog: &RecipeCatalog,
    inventory: &I,
) -> Result<Showcase, PanelError> {
    let mut cards = Vec::with_capacity(category.entries.len());
    for (index, entry) in category.entries.iter().enumerate() {
        let recipe = catalog
            .lookup(&entry.recipe)
            .ok_or_else(|| PanelError::UnknownRecipe {
                category: category.id.clone(),
                recipe: entry.recipe.0.clone(),
            })?;
        cards.push(build_card(index, &entry.unit, recipe, inventory));
    }
    debug!(category = %category.id, cards = cards.len(), "showcase built");
    Ok(Showcase {
        category: category.id.clone(),
        headline: category.headline.clone(),
        icon_path: category.icon_path.clone(),
        cards,
    })
}

/// "Build this ship!": place the order and switch to the overview tab.
pub fn start_production<I: Inventory>(
    controller: &mut ProductionController<I>,
    entry: &ShowcaseEntry,
) -> Result<PanelAction, PanelError> {
    controller.submit(&entry.recipe)?;
    info!(unit = %entry.unit, recipe = %entry.recipe, "production started");
    Ok(PanelAction::ShowTab(OVERVIEW_TAB))
}

/// Confirmation step for the selected ship.
#[derive(Clone, Debug, Default)]
pub struct ConfirmTab {
    selected: Option<ShowcaseEntry>,
}

impl ConfirmTab {
    pub fn select(&mut self, entry: ShowcaseEntry) {
        self.selected = Some(entry);
    }

    pub fn selected(&self) -> Option<&ShowcaseEntry> {
        self.selected.as_ref()
    }

    /// The order button stays locked while the slot is taken.
    pub fn order_button_enabled<I: Inventory>(&self, controller: &ProductionController<I>) -> bool {
        self.selected.is_some() && controller.state() == OrderState::Idle
    }

    /// Name, costs and buildability of the selected ship.
    pub fn details<I: Inventory>(&self, controller: &ProductionController<I>) -> Option<ShowcaseCard> {
        let entry = self.selected.as_ref()?;
        let recipe = controller.catalog().lookup(&entry.recipe)?;
        Some(build_card(0, &entry.unit, recipe, controller.inventory()))
    }

    pub fn confirm<I: Inventory>(
        &mut self,
        controller: &mut ProductionController<I>,
    ) -> Result<PanelAction, PanelError> {
        let entry = self.selected.clone().ok_or(PanelError::NothingSelected)?;
        if controller.state() != OrderState::Idle {
            return Err(PanelError::Locked);
        }
        start_production(controller, &entry)
    }
}
