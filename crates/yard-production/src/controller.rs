use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use yard_core::{Inventory, ProductionRecipe, RecipeCatalog, RecipeId, ResourceAmounts, UnitTypeId};

use crate::{OrderState, ProductionError};

/// The order occupying a controller's slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub recipe: ProductionRecipe,
    /// Work done so far, never above `recipe.work_time`.
    pub elapsed: Decimal,
    /// Resources committed at submit; emptied once spent.
    pub reservation: ResourceAmounts,
}

/// Drives one building's production slot against a shared inventory.
pub struct ProductionController<I> {
    name: String,
    catalog: Arc<RecipeCatalog>,
    inventory: I,
    state: OrderState,
    order: Option<ProductionOrder>,
    paused: bool,
}

impl<I: Inventory> ProductionController<I> {
    pub fn new(catalog: Arc<RecipeCatalog>, inventory: I) -> Self {
        Self {
            name: "builder".to_string(),
            catalog,
            inventory,
            state: OrderState::Idle,
            order: None,
            paused: false,
        }
    }

    /// Label used in log lines.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }

    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn order(&self) -> Option<&ProductionOrder> {
        self.order.as_ref()
    }

    pub fn current_recipe(&self) -> Option<&ProductionRecipe> {
        self.order.as_ref().map(|o| &o.recipe)
    }

    pub fn elapsed(&self) -> Decimal {
        self.order.as_ref().map_or(Decimal::ZERO, |o| o.elapsed)
    }

    /// Accept a new order, reserving all of its consumed resources.
    pub fn submit(&mut self, recipe_id: &RecipeId) -> Result<(), ProductionError> {
        self.expect_state("submit", &[OrderState::Idle])?;
        let recipe = self
            .catalog
            .lookup(recipe_id)
            .ok_or_else(|| ProductionError::UnknownRecipe(recipe_id.clone()))?
            .clone();
        let consumed = recipe.consumed();
        if !self.inventory.reserve(&consumed) {
            let missing = self.inventory.missing(&consumed);
            warn!(building = %self.name, recipe = %recipe_id, ?missing, "order rejected");
            return Err(ProductionError::InsufficientResources {
                recipe: recipe_id.clone(),
                missing,
            });
        }
        self.order = Some(ProductionOrder {
            recipe,
            elapsed: Decimal::ZERO,
            reservation: consumed,
        });
        self.transition(OrderState::Reserved);
        self.transition(OrderState::InProgress);
        Ok(())
    }

    /// Add `delta` work-time to the running order.
    ///
    /// Outside `InProgress`, or while paused, this only reports the state.
    pub fn advance(&mut self, delta: Decimal) -> Result<OrderState, ProductionError> {
        if delta < Decimal::ZERO {
            return Err(ProductionError::InvalidInput(format!(
                "work delta must be >= 0, got {delta}"
            )));
        }
        if self.state != OrderState::InProgress || self.paused {
            return Ok(self.state);
        }
        let Some(order) = self.order.as_mut() else {
            return Ok(self.state);
        };
        let required = order.recipe.work_time;
        order.elapsed = order
            .elapsed
            .checked_add(delta)
            .unwrap_or(required)
            .min(required);
        debug!(building = %self.name, elapsed = %order.elapsed, %required, "advance");
        if order.elapsed == required {
            // The reservation is spent; nothing goes back to the inventory.
            order.reservation.clear();
            self.transition(OrderState::Completed);
        }
        Ok(self.state)
    }

    /// Abort the running order and refund everything it reserved.
    pub fn cancel(&mut self) -> Result<(), ProductionError> {
        self.expect_state("cancel", &[OrderState::Reserved, OrderState::InProgress])?;
        if let Some(order) = self.order.take() {
            self.inventory.refund(&order.reservation);
        }
        self.paused = false;
        self.transition(OrderState::Cancelled);
        Ok(())
    }

    /// Hand out the finished unit and free the slot.
    pub fn collect(&mut self) -> Result<UnitTypeId, ProductionError> {
        if self.state != OrderState::Completed {
            return Err(ProductionError::NothingToCollect);
        }
        let Some(order) = self.order.take() else {
            return Err(ProductionError::NothingToCollect);
        };
        let produced = order.recipe.produced();
        if !produced.is_empty() {
            self.inventory.deposit(&produced);
        }
        info!(building = %self.name, unit = %order.recipe.produces, "unit collected");
        self.transition(OrderState::Idle);
        Ok(order.recipe.produces)
    }

    /// Return a finished or cancelled slot to `Idle`.
    pub fn reset(&mut self) -> Result<(), ProductionError> {
        self.expect_state("reset", &[OrderState::Completed, OrderState::Cancelled])?;
        if let Some(order) = self.order.take() {
            warn!(building = %self.name, unit = %order.recipe.produces, "discarding uncollected unit");
        }
        self.paused = false;
        self.transition(OrderState::Idle);
        Ok(())
    }

    /// Freeze progress without giving up the order.
    pub fn pause(&mut self) -> Result<(), ProductionError> {
        self.expect_state("pause", &[OrderState::InProgress])?;
        if !self.paused {
            info!(building = %self.name, "production paused");
        }
        self.paused = true;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), ProductionError> {
        self.expect_state("resume", &[OrderState::InProgress])?;
        if self.paused {
            info!(building = %self.name, "production resumed");
        }
        self.paused = false;
        Ok(())
    }

    /// Share of the work done, in [0, 1].
    pub fn progress_fraction(&self) -> f64 {
        match self.state {
            OrderState::Completed => 1.0,
            OrderState::Reserved | OrderState::InProgress => {
                let Some(order) = &self.order else {
                    return 0.0;
                };
                if order.recipe.work_time.is_zero() {
                    return 1.0;
                }
                (order.elapsed / order.recipe.work_time)
                    .to_f64()
                    .unwrap_or(0.0)
                    .clamp(0.0, 1.0)
            }
            OrderState::Idle | OrderState::Cancelled => 0.0,
        }
    }

    /// Resources still locked by the active order: what a cancel would give
    /// back. Empty when nothing is running.
    pub fn costs_remaining(&self) -> ResourceAmounts {
        match (&self.order, self.state.is_active()) {
            (Some(order), true) => order.reservation.clone(),
            _ => ResourceAmounts::new(),
        }
    }

    fn expect_state(
        &self,
        operation: &'static str,
        allowed: &[OrderState],
    ) -> Result<(), ProductionError> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        warn!(building = %self.name, operation, state = %self.state, "operation rejected");
        Err(ProductionError::InvalidState {
            operation,
            state: self.state,
        })
    }

    fn transition(&mut self, to: OrderState) {
        info!(building = %self.name, from = %self.state, %to, "order state");
        self.state = to;
    }
}
