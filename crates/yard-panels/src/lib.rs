#![deny(warnings)]

//! Boat builder tabs as plain view models.
//!
//! Every ship category is rendered by the same showcase builder from a
//! [`yard_core::ShowcaseCategory`]; the confirm and overview tabs read the
//! building's [`yard_production::ProductionController`]. Widget layout is
//! left to the frontend.

use thiserror::Error;
use yard_production::ProductionError;

mod showcase;
mod status;

pub use showcase::{
    build_card, build_showcase, cost_label, start_production, ConfirmTab, CostLabel, Showcase,
    ShowcaseCard,
};
pub use status::{overview, Actions, BuildingStatus, NeededResource, OverviewView};

/// Index of the overview tab in the builder's tab bar.
pub const OVERVIEW_TAB: usize = 0;

pub const UNIT_THUMBNAIL: &str = "content/gui/icons/thumbnails/{type_id}.png";
pub const UNIT_PREVIEW_IMAGE: &str = "content/gui/images/objects/ships/116/{type_id}.png";
pub const SHOWCASE_ICON: &str = "content/gui/images/objects/ships/76/{type_id}.png";

/// Fill a `{type_id}` image template.
pub fn unit_image(template: &str, unit: &yard_core::UnitTypeId) -> String {
    template.replace("{type_id}", &unit.0)
}

/// What the tab bar should do after a button press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelAction {
    ShowTab(usize),
}

#[derive(Debug, Error, PartialEq)]
pub enum PanelError {
    #[error("category {category} lists unknown recipe {recipe}")]
    UnknownRecipe { category: String, recipe: String },
    #[error("no ship selected")]
    NothingSelected,
    #[error("order button is locked until the current unit is produced")]
    Locked,
    #[error(transparent)]
    Production(#[from] ProductionError),
}
