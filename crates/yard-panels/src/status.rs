use yard_core::{Inventory, ResourceKind, UnitTypeId};
use yard_production::{OrderState, ProductionController};

use crate::{unit_image, UNIT_PREVIEW_IMAGE, UNIT_THUMBNAIL};

/// At most this many still-locked resources are listed.
const NEEDED_SHOWN: usize = 3;

/// Buttons the overview may offer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Actions {
    pub pause: bool,
    pub resume: bool,
    pub abort: bool,
    pub collect: bool,
    pub reset: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeededResource {
    pub resource: ResourceKind,
    pub amount: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BuildingStatus {
    pub unit: UnitTypeId,
    pub name: String,
    pub thumbnail: String,
    pub preview_image: String,
    pub state: OrderState,
    pub paused: bool,
    pub progress_percent: u8,
    pub needed: Vec<NeededResource>,
    pub actions: Actions,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OverviewView {
    /// Nothing ordered: only the info text.
    Start { helptext: &'static str, actions: Actions },
    Building(BuildingStatus),
}

fn actions(state: OrderState, paused: bool) -> Actions {
    Actions {
        pause: state == OrderState::InProgress && !paused,
        resume: state == OrderState::InProgress && paused,
        abort: state.is_active(),
        collect: state == OrderState::Completed,
        reset: matches!(state, OrderState::Completed | OrderState::Cancelled),
    }
}

/// Overview tab for the builder's current order.
pub fn overview<I: Inventory>(controller: &ProductionController<I>) -> OverviewView {
    let state = controller.state();
    let paused = controller.is_paused();
    let Some(recipe) = controller.current_recipe() else {
        return OverviewView::Start {
            helptext: "Boat builder overview",
            actions: actions(state, paused),
        };
    };
    let mut needed: Vec<NeededResource> = controller
        .costs_remaining()
        .into_iter()
        .map(|(resource, amount)| NeededResource { resource, amount })
        .collect();
    needed.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.resource.cmp(&b.resource)));
    needed.truncate(NEEDED_SHOWN);
    let percent = (controller.progress_fraction() * 100.0).round().clamp(0.0, 100.0);
    OverviewView::Building(BuildingStatus {
        unit: recipe.produces.clone(),
        name: recipe.name.clone(),
        thumbnail: unit_image(UNIT_THUMBNAIL, &recipe.produces),
        preview_image: unit_image(UNIT_PREVIEW_IMAGE, &recipe.produces),
        state,
        paused,
        progress_percent: percent as u8,
        needed,
        actions: actions(state, paused),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use yard_core::{
        ProductionRecipe, RecipeCatalog, RecipeId, ResourceAmounts, ResourceDelta,
        SharedStockpile, Stockpile,
    };

    fn yard() -> ProductionController<SharedStockpile> {
        let res = |r: &str, amount: i64| ResourceDelta {
            resource: ResourceKind::new(r),
            amount,
        };
        let frigate = ProductionRecipe {
            id: RecipeId::new("frigate"),
            name: "Frigate".into(),
            resources: vec![
                res("boards", -20),
                res("cannons", -6),
                res("gold", -2500),
                res("textile", -15),
            ],
            work_time: Decimal::new(120, 0),
            produces: UnitTypeId::new("frigate"),
        };
        let stock: ResourceAmounts = [("boards", 20), ("cannons", 6), ("gold", 2500), ("textile", 15)]
            .into_iter()
            .map(|(k, v)| (ResourceKind::new(k), v))
            .collect();
        ProductionController::new(
            Arc::new(RecipeCatalog::new(vec![frigate]).unwrap()),
            SharedStockpile::new(Stockpile::new(stock)),
        )
    }

    #[test]
    fn idle_shows_start_view() {
        let y = yard();
        assert_eq!(
            overview(&y),
            OverviewView::Start {
                helptext: "Boat builder overview",
                actions: Actions::default()
            }
        );
    }

    #[test]
    fn building_view_lists_top_three_costs() {
        let mut y = yard();
        y.submit(&RecipeId::new("frigate")).unwrap();
        y.advance(Decimal::new(30, 0)).unwrap();
        let OverviewView::Building(status) = overview(&y) else {
            panic!("expected building view");
        };
        assert_eq!(status.progress_percent, 25);
        assert_eq!(status.preview_image, "content/gui/images/objects/ships/116/frigate.png");
        let needed: Vec<(&str, u64)> = status
            .needed
            .iter()
            .map(|n| (n.resource.0.as_str(), n.amount))
            .collect();
        assert_eq!(needed, [("gold", 2500), ("boards", 20), ("textile", 15)]);
        assert!(status.actions.pause && status.actions.abort);
        assert!(!status.actions.resume && !status.actions.collect);
    }

    #[test]
    fn paused_and_completed_actions() {
        let mut y = yard();
        y.submit(&RecipeId::new("frigate")).unwrap();
        y.pause().unwrap();
        let OverviewView::Building(status) = overview(&y) else {
            panic!("expected building view");
        };
        assert!(status.paused && status.actions.resume && !status.actions.pause);

        y.resume().unwrap();
        y.advance(Decimal::new(120, 0)).unwrap();
        let OverviewView::Building(status) = overview(&y) else {
            panic!("expected building view");
        };
        assert_eq!(status.progress_percent, 100);
        assert!(status.needed.is_empty());
        assert!(status.actions.collect && status.actions.reset && !status.actions.abort);
    }

    #[test]
    fn abort_returns_to_start_view_with_reset() {
        let mut y = yard();
        y.submit(&RecipeId::new("frigate")).unwrap();
        y.cancel().unwrap();
        match overview(&y) {
            OverviewView::Start { actions, .. } => assert!(actions.reset && !actions.abort),
            other => panic!("unexpected view: {other:?}"),
        }
    }
}
