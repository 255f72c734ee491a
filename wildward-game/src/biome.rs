//! Biome catalog and weighted resource gathering.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A gatherable resource node within a biome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub item_id: String,
    pub weight: u32,
    #[serde(default = "default_min_amount")]
    pub min_amount: u32,
    #[serde(default = "default_max_amount")]
    pub max_amount: u32,
    /// Tool tag required to harvest this node.
    #[serde(default)]
    pub required_tool: Option<String>,
    /// Some resources only appear after dark.
    #[serde(default)]
    pub night_only: bool,
}

const fn default_min_amount() -> u32 {
    1
}

const fn default_max_amount() -> u32 {
    3
}

/// A themed gathering zone with a level gate and resource set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Biome {
    pub id: String,
    pub name: String,
    #[serde(default = "default_min_level")]
    pub min_level: u32,
    /// Base temperature fed into the temperature model.
    #[serde(default = "default_base_temperature")]
    pub base_temperature: f32,
    #[serde(default = "default_energy_cost")]
    pub gather_energy_cost: f32,
    #[serde(default = "default_xp_per_gather")]
    pub xp_per_gather: u64,
    pub nodes: Vec<ResourceNode>,
}

const fn default_min_level() -> u32 {
    1
}

const fn default_base_temperature() -> f32 {
    14.0
}

const fn default_energy_cost() -> f32 {
    5.0
}

const fn default_xp_per_gather() -> u64 {
    6
}

/// Complete biome catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BiomeCatalog {
    pub biomes: Vec<Biome>,
}

impl BiomeCatalog {
    /// Load a biome catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or validation fails.
    pub fn from_json(json_str: &str) -> Result<Self, String> {
        let catalog: Self =
            serde_json::from_str(json_str).map_err(|e| format!("JSON parse error: {e}"))?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), String> {
        for (idx, biome) in self.biomes.iter().enumerate() {
            if biome.id.is_empty() {
                return Err(format!("biome at index {idx} has an empty id"));
            }
            if self.biomes[..idx].iter().any(|other| other.id == biome.id) {
                return Err(format!("duplicate biome id: {}", biome.id));
            }
            if biome.nodes.is_empty() {
                return Err(format!("biome {} has no resource nodes", biome.id));
            }
            if biome.nodes.iter().all(|node| node.weight == 0) {
                return Err(format!("biome {} has no weighted nodes", biome.id));
            }
            for node in &biome.nodes {
                if node.min_amount == 0 || node.max_amount < node.min_amount {
                    return Err(format!(
                        "biome {} node {} has an invalid amount range",
                        biome.id, node.item_id
                    ));
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, biome_id: &str) -> Option<&Biome> {
        self.biomes.iter().find(|biome| biome.id == biome_id)
    }

    /// Embedded default catalog.
    #[must_use]
    pub fn default_catalog() -> Self {
        Self {
            biomes: vec![
                Biome {
                    id: String::from("verdant_forest"),
                    name: String::from("Verdant Forest"),
                    min_level: 1,
                    base_temperature: 14.0,
                    gather_energy_cost: 5.0,
                    xp_per_gather: 6,
                    nodes: vec![
                        node("wood", 40, 1, 4, None, false),
                        node("fiber", 25, 1, 3, None, false),
                        node("berries", 20, 1, 3, None, false),
                        node("flint", 10, 1, 2, None, false),
                        node("moonpetal", 5, 1, 1, None, true),
                    ],
                },
                Biome {
                    id: String::from("granite_hills"),
                    name: String::from("Granite Hills"),
                    min_level: 3,
                    base_temperature: 8.0,
                    gather_energy_cost: 7.0,
                    xp_per_gather: 9,
                    nodes: vec![
                        node("stone", 45, 2, 5, None, false),
                        node("flint", 20, 1, 3, None, false),
                        node("clay", 20, 1, 3, None, false),
                        node("iron_ore", 15, 1, 2, Some("pickaxe"), false),
                    ],
                },
                Biome {
                    id: String::from("mirefen"),
                    name: String::from("Mirefen"),
                    min_level: 5,
                    base_temperature: 18.0,
                    gather_energy_cost: 8.0,
                    xp_per_gather: 12,
                    nodes: vec![
                        node("clay", 30, 2, 4, None, false),
                        node("mushroom", 30, 1, 4, None, false),
                        node("resin", 25, 1, 2, Some("axe"), false),
                        node("moonpetal", 15, 1, 2, None, true),
                    ],
                },
                Biome {
                    id: String::from("frostreach"),
                    name: String::from("Frostreach"),
                    min_level: 8,
                    base_temperature: -6.0,
                    gather_energy_cost: 10.0,
                    xp_per_gather: 16,
                    nodes: vec![
                        node("fur", 40, 1, 3, None, false),
                        node("iron_ore", 30, 1, 3, Some("pickaxe"), false),
                        node("raw_meat", 30, 1, 2, None, false),
                    ],
                },
            ],
        }
    }
}

fn node(
    item_id: &str,
    weight: u32,
    min_amount: u32,
    max_amount: u32,
    required_tool: Option<&str>,
    night_only: bool,
) -> ResourceNode {
    ResourceNode {
        item_id: item_id.to_string(),
        weight,
        min_amount,
        max_amount,
        required_tool: required_tool.map(str::to_string),
        night_only,
    }
}

/// Result of a successful gather roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatherRoll {
    pub item_id: String,
    pub amount: u32,
}

/// Roll a weighted node from the biome, honoring tool and night gates.
///
/// Returns `None` when no node is currently eligible.
#[must_use]
pub fn roll_node<R: Rng>(
    biome: &Biome,
    is_day: bool,
    tool_tags: &HashSet<String>,
    rng: &mut R,
) -> Option<GatherRoll> {
    let eligible = |node: &&ResourceNode| {
        if node.weight == 0 {
            return false;
        }
        if node.night_only && is_day {
            return false;
        }
        node.required_tool
            .as_ref()
            .is_none_or(|tool| tool_tags.contains(tool))
    };

    let total: u32 = biome
        .nodes
        .iter()
        .filter(eligible)
        .map(|node| node.weight)
        .sum();
    if total == 0 {
        return None;
    }

    let mut roll = rng.gen_range(0..total);
    for candidate in biome.nodes.iter().filter(eligible) {
        if roll < candidate.weight {
            let amount = rng.gen_range(candidate.min_amount..=candidate.max_amount);
            return Some(GatherRoll {
                item_id: candidate.item_id.clone(),
                amount,
            });
        }
        roll -= candidate.weight;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn default_catalog_validates() {
        assert!(BiomeCatalog::default_catalog().validate().is_ok());
    }

    #[test]
    fn night_only_nodes_hide_during_the_day() {
        let catalog = BiomeCatalog::default_catalog();
        let forest = catalog.get("verdant_forest").unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for _ in 0..500 {
            let roll = roll_node(forest, true, &HashSet::new(), &mut rng).unwrap();
            assert_ne!(roll.item_id, "moonpetal");
        }
        let mut saw_moonpetal = false;
        for _ in 0..500 {
            let roll = roll_node(forest, false, &HashSet::new(), &mut rng).unwrap();
            saw_moonpetal |= roll.item_id == "moonpetal";
        }
        assert!(saw_moonpetal);
    }

    #[test]
    fn tool_gated_nodes_require_the_tag() {
        let catalog = BiomeCatalog::default_catalog();
        let hills = catalog.get("granite_hills").unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        for _ in 0..500 {
            let roll = roll_node(hills, true, &HashSet::new(), &mut rng).unwrap();
            assert_ne!(roll.item_id, "iron_ore");
        }
        let tags: HashSet<String> = [String::from("pickaxe")].into_iter().collect();
        let mut saw_ore = false;
        for _ in 0..500 {
            let roll = roll_node(hills, true, &tags, &mut rng).unwrap();
            saw_ore |= roll.item_id == "iron_ore";
        }
        assert!(saw_ore);
    }

    #[test]
    fn amounts_stay_within_node_range() {
        let catalog = BiomeCatalog::default_catalog();
        let hills = catalog.get("granite_hills").unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(99);
        for _ in 0..300 {
            let roll = roll_node(hills, true, &HashSet::new(), &mut rng).unwrap();
            let node = hills
                .nodes
                .iter()
                .find(|node| node.item_id == roll.item_id)
                .unwrap();
            assert!(roll.amount >= node.min_amount && roll.amount <= node.max_amount);
        }
    }

    #[test]
    fn roll_returns_none_with_no_eligible_nodes() {
        let biome = Biome {
            id: String::from("cavern"),
            name: String::from("Cavern"),
            min_level: 1,
            base_temperature: 5.0,
            gather_energy_cost: 5.0,
            xp_per_gather: 5,
            nodes: vec![node("crystal", 10, 1, 1, Some("pickaxe"), false)],
        };
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        assert!(roll_node(&biome, true, &HashSet::new(), &mut rng).is_none());
    }

    #[test]
    fn validation_rejects_bad_ranges() {
        let mut catalog = BiomeCatalog::default_catalog();
        catalog.biomes[0].nodes[0].min_amount = 5;
        catalog.biomes[0].nodes[0].max_amount = 2;
        assert!(catalog.validate().is_err());
    }
}
