use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::{Inventory, ResourceAmounts, ResourceKind};

/// Settlement storage: quantities on hand per resource.
///
/// Kinds with nothing on hand have no entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ResourceAmounts", into = "ResourceAmounts")]
pub struct Stockpile {
    amounts: ResourceAmounts,
}

impl Stockpile {
    pub fn new(amounts: ResourceAmounts) -> Self {
        let mut s = Self::default();
        for (k, v) in amounts {
            s.add(k, v);
        }
        s
    }

    pub fn get(&self, kind: &ResourceKind) -> u64 {
        self.amounts.get(kind).copied().unwrap_or(0)
    }

    /// Add to the stock. Quantities are capped at `u64::MAX`; hitting the
    /// cap is logged since the excess is lost.
    pub fn add(&mut self, kind: ResourceKind, qty: u64) {
        if qty == 0 {
            return;
        }
        let slot = self.amounts.entry(kind).or_default();
        match slot.checked_add(qty) {
            Some(sum) => *slot = sum,
            None => {
                warn!(have = *slot, added = qty, "stockpile overflow, quantity capped");
                *slot = u64::MAX;
            }
        }
    }

    /// Returns true if every amount is on hand.
    pub fn has_all(&self, wanted: &ResourceAmounts) -> bool {
        wanted.iter().all(|(k, &q)| self.get(k) >= q)
    }

    pub fn amounts(&self) -> &ResourceAmounts {
        &self.amounts
    }
}

impl From<ResourceAmounts> for Stockpile {
    fn from(amounts: ResourceAmounts) -> Self {
        Self::new(amounts)
    }
}

impl From<Stockpile> for ResourceAmounts {
    fn from(s: Stockpile) -> Self {
        s.amounts
    }
}

impl Inventory for Stockpile {
    fn available(&self, kind: &ResourceKind) -> u64 {
        self.get(kind)
    }

    fn reserve(&mut self, amounts: &ResourceAmounts) -> bool {
        // Check first, deduct second: nothing is touched on failure.
        if !self.has_all(amounts) {
            return false;
        }
        for (k, &q) in amounts {
            if let Some(slot) = self.amounts.get_mut(k) {
                *slot -= q;
                if *slot == 0 {
                    self.amounts.remove(k);
                }
            }
        }
        true
    }

    fn refund(&mut self, amounts: &ResourceAmounts) {
        for (k, &q) in amounts {
            self.add(k.clone(), q);
        }
    }
}

/// Cloneable handle to one stockpile shared by several buildings.
///
/// Each inventory call holds the lock for its whole check-and-update.
#[derive(Clone, Debug, Default)]
pub struct SharedStockpile {
    inner: Arc<Mutex<Stockpile>>,
}

impl SharedStockpile {
    pub fn new(stockpile: Stockpile) -> Self {
        Self {
            inner: Arc::new(Mutex::new(stockpile)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Stockpile> {
        // Updates are applied only after validation, so a poisoned guard
        // still holds consistent quantities.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current quantities.
    pub fn snapshot(&self) -> Stockpile {
        self.lock().clone()
    }

    pub fn add(&self, kind: ResourceKind, qty: u64) {
        self.lock().add(kind, qty);
    }
}

impl Inventory for SharedStockpile {
    fn available(&self, kind: &ResourceKind) -> u64 {
        self.lock().get(kind)
    }

    fn reserve(&mut self, amounts: &ResourceAmounts) -> bool {
        let ok = self.lock().reserve(amounts);
        debug!(ok, kinds = amounts.len(), "stockpile reserve");
        ok
    }

    fn refund(&mut self, amounts: &ResourceAmounts) {
        self.lock().refund(amounts);
        debug!(kinds = amounts.len(), "stockpile refund");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn amounts(pairs: &[(&str, u64)]) -> ResourceAmounts {
        pairs
            .iter()
            .map(|(k, v)| (ResourceKind::new(*k), *v))
            .collect()
    }

    #[test]
    fn reserve_is_all_or_nothing() {
        let mut s = Stockpile::new(amounts(&[("wood", 5), ("gold", 5)]));
        let before = s.clone();
        assert!(!s.reserve(&amounts(&[("wood", 10), ("gold", 5)])));
        assert_eq!(s, before);

        assert!(s.reserve(&amounts(&[("wood", 5), ("gold", 2)])));
        assert_eq!(s.get(&ResourceKind::new("wood")), 0);
        assert_eq!(s.get(&ResourceKind::new("gold")), 3);
    }

    #[test]
    fn unknown_kind_cannot_be_reserved() {
        let mut s = Stockpile::default();
        assert!(!s.reserve(&amounts(&[("tools", 1)])));
        assert!(s.reserve(&ResourceAmounts::new()));
    }

    #[test]
    fn refund_restores_quantities() {
        let start = amounts(&[("wood", 10), ("gold", 5)]);
        let mut s = Stockpile::new(start.clone());
        let cost = amounts(&[("wood", 7), ("gold", 5)]);
        assert!(s.reserve(&cost));
        s.refund(&cost);
        assert_eq!(s.amounts(), &start);
    }

    #[test]
    fn zero_entries_are_dropped_on_load() {
        let loaded: Stockpile = serde_json::from_str(r#"{"boards":0,"wood":3}"#).unwrap();
        assert_eq!(loaded, Stockpile::new(amounts(&[("wood", 3)])));
        assert_eq!(serde_json::to_string(&loaded).unwrap(), r#"{"wood":3}"#);
    }

    #[test]
    fn add_caps_at_max() {
        let mut s = Stockpile::new(amounts(&[("gold", u64::MAX - 1)]));
        s.add(ResourceKind::new("gold"), 5);
        assert_eq!(s.get(&ResourceKind::new("gold")), u64::MAX);
    }

    #[test]
    fn missing_reports_shortfall() {
        let s = Stockpile::new(amounts(&[("wood", 3)]));
        let missing = s.missing(&amounts(&[("wood", 5), ("gold", 2)]));
        assert_eq!(missing, amounts(&[("gold", 2), ("wood", 2)]));
    }

    #[test]
    fn shared_reservations_never_overdraw() {
        let shared = SharedStockpile::new(Stockpile::new(amounts(&[("wood", 100)])));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let mut s = shared.clone();
                thread::spawn(move || {
                    let cost = amounts(&[("wood", 10)]);
                    (0..5).filter(|_| s.reserve(&cost)).count()
                })
            })
            .collect();
        let granted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(granted, 10);
        assert_eq!(shared.available(&ResourceKind::new("wood")), 0);
    }
}
