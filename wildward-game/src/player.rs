//! Player state, progression, and the equipment tag set.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::constants::{LEVEL_CAP, LOG_LEVEL_UP, XP_CURVE_BASE, XP_CURVE_EXPONENT};
use crate::inventory::Inventory;
use crate::numbers::round_f64_to_u64;
use crate::status::Vitals;

/// Tag granting immunity to freezing health drain.
pub const TAG_COLD_PROTECTION: &str = "cold_protection";

/// World-assigned player identifier.
pub type PlayerId = String;

/// XP required to advance from `level` to `level + 1`.
#[must_use]
pub fn xp_for_level(level: u32) -> u64 {
    round_f64_to_u64(XP_CURVE_BASE * f64::from(level).powf(XP_CURVE_EXPONENT))
}

/// A player with vitals, progression, containers and a journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub xp: u64,
    /// Tags contributed by held tools and worn equipment.
    #[serde(default)]
    pub equipment_tags: HashSet<String>,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default = "Inventory::storage_default")]
    pub storage: Inventory,
    /// Append-only journal of log keys for the client to localize.
    #[serde(default)]
    pub journal: Vec<String>,
    #[serde(default)]
    pub sleeping: bool,
    /// Game timestamp of the last degradation step applied to this player.
    #[serde(default)]
    pub last_tick_game_ms: u64,
    #[serde(default)]
    pub created_at_game_ms: u64,
}

const fn default_level() -> u32 {
    1
}

impl Player {
    #[must_use]
    pub fn new(id: String, name: String, now_game_ms: u64) -> Self {
        Self {
            id,
            name,
            vitals: Vitals::default(),
            level: 1,
            xp: 0,
            equipment_tags: HashSet::new(),
            inventory: Inventory::player_default(),
            storage: Inventory::storage_default(),
            journal: Vec::new(),
            sleeping: false,
            last_tick_game_ms: now_game_ms,
            created_at_game_ms: now_game_ms,
        }
    }

    #[must_use]
    pub fn is_incapacitated(&self) -> bool {
        self.vitals.is_incapacitated()
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.equipment_tags.contains(tag)
    }

    #[must_use]
    pub fn has_cold_protection(&self) -> bool {
        self.has_tag(TAG_COLD_PROTECTION)
    }

    /// Grant XP, rolling surplus into further levels up to the cap.
    ///
    /// Returns the number of levels gained.
    pub fn grant_xp(&mut self, amount: u64) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut gained = 0;
        while self.level < LEVEL_CAP {
            let needed = xp_for_level(self.level);
            if self.xp < needed {
                break;
            }
            self.xp -= needed;
            self.level += 1;
            gained += 1;
            self.journal.push(String::from(LOG_LEVEL_UP));
        }
        gained
    }

    /// Recompute equipment tags from the items currently carried.
    pub fn refresh_equipment_tags(&mut self, catalog: &crate::crafting::ItemCatalog) {
        self.equipment_tags.clear();
        for stack in &self.inventory.slots {
            if let Some(item) = catalog.get(&stack.item_id) {
                for tag in &item.grants_tags {
                    self.equipment_tags.insert(tag.clone());
                }
            }
        }
    }
}
