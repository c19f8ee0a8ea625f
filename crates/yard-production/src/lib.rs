#![deny(warnings)]

//! Single-slot production orders for builder buildings.
//!
//! A [`ProductionController`] owns at most one order at a time. Submitting an
//! order reserves every consumed resource up front; ticks then accumulate work
//! until the product is ready to collect. Cancelling refunds the whole
//! reservation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use yard_core::{RecipeId, ResourceAmounts};

mod controller;

pub use controller::{ProductionController, ProductionOrder};

/// Lifecycle of the controller's slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderState {
    /// No order; ready to accept one.
    Idle,
    /// Resources committed, work not started.
    Reserved,
    /// Accumulating work-time.
    InProgress,
    /// Product ready for collection.
    Completed,
    /// Order aborted and refunded; needs a reset.
    Cancelled,
}

impl OrderState {
    /// States in which an order holds a reservation.
    pub fn is_active(self) -> bool {
        matches!(self, OrderState::Reserved | OrderState::InProgress)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderState::Idle => "idle",
            OrderState::Reserved => "reserved",
            OrderState::InProgress => "in progress",
            OrderState::Completed => "completed",
            OrderState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Errors returned by controller operations. None of them change state.
#[derive(Debug, Error, PartialEq)]
pub enum ProductionError {
    #[error("unknown recipe: {0}")]
    UnknownRecipe(RecipeId),
    /// The inventory could not cover the recipe; `missing` is the shortfall
    /// observed right after the failed reservation.
    #[error("insufficient resources for {recipe}")]
    InsufficientResources {
        recipe: RecipeId,
        missing: ResourceAmounts,
    },
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: OrderState,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("nothing to collect")]
    NothingToCollect,
}
