//! Stack-based containers and the inventory/storage transfer rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{INVENTORY_SLOTS, STORAGE_SLOTS};

/// A stack of one resource occupying a single slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub item_id: String,
    pub quantity: u32,
}

/// Container errors surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("not enough of item {item_id}: need {needed}, have {have}")]
    NotEnough {
        item_id: String,
        needed: u32,
        have: u32,
    },
    #[error("container cannot hold {overflow} more of item {item_id}")]
    Full { item_id: String, overflow: u32 },
}

/// Slot-limited stack container used for both inventory and storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub slots: Vec<Stack>,
    pub capacity: usize,
}

impl Inventory {
    #[must_use]
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    /// Standard player-carried inventory.
    #[must_use]
    pub const fn player_default() -> Self {
        Self::with_capacity(INVENTORY_SLOTS)
    }

    /// Larger per-player storage container.
    #[must_use]
    pub const fn storage_default() -> Self {
        Self::with_capacity(STORAGE_SLOTS)
    }

    #[must_use]
    pub fn quantity_of(&self, item_id: &str) -> u32 {
        self.slots
            .iter()
            .filter(|stack| stack.item_id == item_id)
            .map(|stack| stack.quantity)
            .sum()
    }

    #[must_use]
    pub fn used_slots(&self) -> usize {
        self.slots.len()
    }

    /// Add a quantity, filling existing stacks before opening new slots.
    ///
    /// Returns the overflow remainder that did not fit; zero means the whole
    /// quantity was stored.
    pub fn add(&mut self, item_id: &str, quantity: u32, max_stack: u32) -> u32 {
        let max_stack = max_stack.max(1);
        let mut remaining = quantity;

        for stack in self
            .slots
            .iter_mut()
            .filter(|stack| stack.item_id == item_id)
        {
            if remaining == 0 {
                return 0;
            }
            let room = max_stack.saturating_sub(stack.quantity);
            let moved = room.min(remaining);
            stack.quantity += moved;
            remaining -= moved;
        }

        while remaining > 0 && self.slots.len() < self.capacity {
            let moved = remaining.min(max_stack);
            self.slots.push(Stack {
                item_id: item_id.to_string(),
                quantity: moved,
            });
            remaining -= moved;
        }

        remaining
    }

    /// Check whether the full quantity would fit without mutating.
    #[must_use]
    pub fn can_accept(&self, item_id: &str, quantity: u32, max_stack: u32) -> bool {
        let max_stack = u64::from(max_stack.max(1));
        let stack_room: u64 = self
            .slots
            .iter()
            .filter(|stack| stack.item_id == item_id)
            .map(|stack| max_stack.saturating_sub(u64::from(stack.quantity)))
            .sum();
        let free_slots = self.capacity.saturating_sub(self.slots.len()) as u64;
        stack_room + free_slots * max_stack >= u64::from(quantity)
    }

    /// Remove an exact quantity, draining partial stacks from the back.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::NotEnough` without mutating if the container
    /// holds less than `quantity`.
    pub fn remove(&mut self, item_id: &str, quantity: u32) -> Result<(), InventoryError> {
        let have = self.quantity_of(item_id);
        if have < quantity {
            return Err(InventoryError::NotEnough {
                item_id: item_id.to_string(),
                needed: quantity,
                have,
            });
        }

        let mut remaining = quantity;
        for stack in self
            .slots
            .iter_mut()
            .rev()
            .filter(|stack| stack.item_id == item_id)
        {
            let taken = stack.quantity.min(remaining);
            stack.quantity -= taken;
            remaining -= taken;
            if remaining == 0 {
                break;
            }
        }
        self.slots.retain(|stack| stack.quantity > 0);
        Ok(())
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::player_default()
    }
}

/// Move a quantity between two containers atomically.
///
/// # Errors
///
/// Fails without mutating either side when the source lacks the quantity or
/// the destination cannot absorb all of it.
pub fn transfer(
    from: &mut Inventory,
    to: &mut Inventory,
    item_id: &str,
    quantity: u32,
    max_stack: u32,
) -> Result<(), InventoryError> {
    let have = from.quantity_of(item_id);
    if have < quantity {
        return Err(InventoryError::NotEnough {
            item_id: item_id.to_string(),
            needed: quantity,
            have,
        });
    }
    // Removal can only free room in `to` when the containers differ, so the
    // pre-check against the untouched destination is conservative but safe.
    if !to.can_accept(item_id, quantity, max_stack) {
        return Err(InventoryError::Full {
            item_id: item_id.to_string(),
            overflow: quantity,
        });
    }
    from.remove(item_id, quantity)?;
    let overflow = to.add(item_id, quantity, max_stack);
    debug_assert_eq!(overflow, 0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_MAX_STACK;

    #[test]
    fn add_fills_existing_stacks_first() {
        let mut inv = Inventory::with_capacity(2);
        assert_eq!(inv.add("wood", 30, DEFAULT_MAX_STACK), 0);
        assert_eq!(inv.add("wood", 30, DEFAULT_MAX_STACK), 0);
        assert_eq!(inv.used_slots(), 2);
        assert_eq!(inv.quantity_of("wood"), 60);
        // 50 + 50 is the ceiling for two slots.
        assert_eq!(inv.add("wood", 60, DEFAULT_MAX_STACK), 20);
        assert_eq!(inv.quantity_of("wood"), 100);
    }

    #[test]
    fn add_respects_slot_capacity_across_items() {
        let mut inv = Inventory::with_capacity(1);
        assert_eq!(inv.add("wood", 10, DEFAULT_MAX_STACK), 0);
        assert_eq!(inv.add("stone", 5, DEFAULT_MAX_STACK), 5);
        assert_eq!(inv.quantity_of("stone"), 0);
    }

    #[test]
    fn remove_is_atomic_on_shortage() {
        let mut inv = Inventory::player_default();
        inv.add("fiber", 10, DEFAULT_MAX_STACK);
        let err = inv.remove("fiber", 12).unwrap_err();
        assert_eq!(
            err,
            InventoryError::NotEnough {
                item_id: String::from("fiber"),
                needed: 12,
                have: 10
            }
        );
        assert_eq!(inv.quantity_of("fiber"), 10);
        inv.remove("fiber", 10).unwrap();
        assert_eq!(inv.used_slots(), 0);
    }

    #[test]
    fn remove_spans_multiple_stacks() {
        let mut inv = Inventory::with_capacity(4);
        inv.add("berry", 120, DEFAULT_MAX_STACK);
        assert_eq!(inv.used_slots(), 3);
        inv.remove("berry", 70).unwrap();
        assert_eq!(inv.quantity_of("berry"), 50);
    }

    #[test]
    fn can_accept_matches_add_behaviour() {
        let mut inv = Inventory::with_capacity(2);
        inv.add("wood", 80, DEFAULT_MAX_STACK);
        assert!(inv.can_accept("wood", 20, DEFAULT_MAX_STACK));
        assert!(!inv.can_accept("wood", 21, DEFAULT_MAX_STACK));
        assert!(!inv.can_accept("stone", 1, DEFAULT_MAX_STACK));
    }

    #[test]
    fn transfer_moves_all_or_nothing() {
        let mut inv = Inventory::player_default();
        let mut storage = Inventory::with_capacity(1);
        inv.add("wood", 40, DEFAULT_MAX_STACK);

        transfer(&mut inv, &mut storage, "wood", 30, DEFAULT_MAX_STACK).unwrap();
        assert_eq!(inv.quantity_of("wood"), 10);
        assert_eq!(storage.quantity_of("wood"), 30);

        // Storage has room for 20 more; moving 30 must not partially apply.
        inv.add("wood", 30, DEFAULT_MAX_STACK);
        let err = transfer(&mut inv, &mut storage, "wood", 30, DEFAULT_MAX_STACK).unwrap_err();
        assert!(matches!(err, InventoryError::Full { .. }));
        assert_eq!(inv.quantity_of("wood"), 40);
        assert_eq!(storage.quantity_of("wood"), 30);
    }

    #[test]
    fn transfer_rejects_missing_quantity() {
        let mut inv = Inventory::player_default();
        let mut storage = Inventory::storage_default();
        let err = transfer(&mut inv, &mut storage, "wood", 5, DEFAULT_MAX_STACK).unwrap_err();
        assert!(matches!(err, InventoryError::NotEnough { .. }));
    }
}
