//! Item catalog and recipe crafting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_MAX_STACK;
use crate::inventory::Inventory;

/// Broad item classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    #[default]
    Resource,
    Food,
    Drink,
    Tool,
    Equipment,
}

impl ItemCategory {
    /// Whether items of this category can be eaten or drunk.
    #[must_use]
    pub const fn is_consumable(self) -> bool {
        matches!(self, Self::Food | Self::Drink)
    }
}

/// A single item definition shared by resources, consumables and gear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: ItemCategory,
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
    #[serde(default)]
    pub restore_hunger: f32,
    #[serde(default)]
    pub restore_thirst: f32,
    #[serde(default)]
    pub restore_energy: f32,
    /// Equipment tags granted while the item is held (tools, cold protection).
    #[serde(default)]
    pub grants_tags: Vec<String>,
}

const fn default_max_stack() -> u32 {
    DEFAULT_MAX_STACK
}

/// Complete item catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ItemCatalog {
    pub items: Vec<ItemDef>,
}

impl ItemCatalog {
    /// Load an item catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or ids collide.
    pub fn from_json(json_str: &str) -> Result<Self, String> {
        let catalog: Self =
            serde_json::from_str(json_str).map_err(|e| format!("JSON parse error: {e}"))?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), String> {
        for (idx, item) in self.items.iter().enumerate() {
            if item.id.is_empty() {
                return Err(format!("item at index {idx} has an empty id"));
            }
            if self.items[..idx].iter().any(|other| other.id == item.id) {
                return Err(format!("duplicate item id: {}", item.id));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, item_id: &str) -> Option<&ItemDef> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Maximum stack size for an item, falling back to the global default.
    #[must_use]
    pub fn max_stack(&self, item_id: &str) -> u32 {
        self.get(item_id)
            .map_or(DEFAULT_MAX_STACK, |item| item.max_stack)
    }

    /// Embedded default catalog.
    #[must_use]
    pub fn default_catalog() -> Self {
        Self {
            items: vec![
                resource("wood", "Wood"),
                resource("stone", "Stone"),
                resource("fiber", "Fiber"),
                resource("flint", "Flint"),
                resource("clay", "Clay"),
                resource("iron_ore", "Iron Ore"),
                resource("resin", "Resin"),
                resource("moonpetal", "Moonpetal"),
                food("berries", "Berries", 12.0, 4.0),
                food("mushroom", "Mushroom", 8.0, 0.0),
                food("cooked_meat", "Cooked Meat", 35.0, 0.0),
                food("raw_meat", "Raw Meat", 10.0, 0.0),
                drink("waterskin_full", "Full Waterskin", 40.0),
                drink("herbal_tea", "Herbal Tea", 25.0),
                tool("stone_axe", "Stone Axe", "axe"),
                tool("stone_pickaxe", "Stone Pickaxe", "pickaxe"),
                tool("iron_axe", "Iron Axe", "axe"),
                ItemDef {
                    id: String::from("fur_cloak"),
                    name: String::from("Fur Cloak"),
                    category: ItemCategory::Equipment,
                    max_stack: 1,
                    restore_hunger: 0.0,
                    restore_thirst: 0.0,
                    restore_energy: 0.0,
                    grants_tags: vec![String::from("cold_protection")],
                },
                resource("fur", "Fur"),
                resource("charcoal", "Charcoal"),
            ],
        }
    }
}

fn resource(id: &str, name: &str) -> ItemDef {
    ItemDef {
        id: id.to_string(),
        name: name.to_string(),
        category: ItemCategory::Resource,
        max_stack: DEFAULT_MAX_STACK,
        restore_hunger: 0.0,
        restore_thirst: 0.0,
        restore_energy: 0.0,
        grants_tags: Vec::new(),
    }
}

fn food(id: &str, name: &str, hunger: f32, thirst: f32) -> ItemDef {
    ItemDef {
        category: ItemCategory::Food,
        max_stack: 20,
        restore_hunger: hunger,
        restore_thirst: thirst,
        ..resource(id, name)
    }
}

fn drink(id: &str, name: &str, thirst: f32) -> ItemDef {
    ItemDef {
        category: ItemCategory::Drink,
        max_stack: 10,
        restore_thirst: thirst,
        ..resource(id, name)
    }
}

fn tool(id: &str, name: &str, tag: &str) -> ItemDef {
    ItemDef {
        category: ItemCategory::Tool,
        max_stack: 1,
        grants_tags: vec![tag.to_string()],
        ..resource(id, name)
    }
}

/// One required input line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeInput {
    pub item_id: String,
    pub quantity: u32,
}

/// A crafting recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub inputs: Vec<RecipeInput>,
    pub output_id: String,
    #[serde(default = "default_output_quantity")]
    pub output_quantity: u32,
    #[serde(default = "default_min_level")]
    pub min_level: u32,
    #[serde(default)]
    pub required_tool: Option<String>,
    #[serde(default)]
    pub xp_award: u64,
}

const fn default_output_quantity() -> u32 {
    1
}

const fn default_min_level() -> u32 {
    1
}

/// Complete recipe book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RecipeBook {
    pub recipes: Vec<Recipe>,
}

impl RecipeBook {
    /// Load a recipe book from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or validation fails.
    pub fn from_json(json_str: &str) -> Result<Self, String> {
        let book: Self =
            serde_json::from_str(json_str).map_err(|e| format!("JSON parse error: {e}"))?;
        book.validate()?;
        Ok(book)
    }

    fn validate(&self) -> Result<(), String> {
        for (idx, recipe) in self.recipes.iter().enumerate() {
            if recipe.id.is_empty() {
                return Err(format!("recipe at index {idx} has an empty id"));
            }
            if self.recipes[..idx].iter().any(|other| other.id == recipe.id) {
                return Err(format!("duplicate recipe id: {}", recipe.id));
            }
            if recipe.inputs.is_empty() || recipe.output_quantity == 0 {
                return Err(format!("recipe {} must consume and produce", recipe.id));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, recipe_id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == recipe_id)
    }

    /// Embedded default recipe book.
    #[must_use]
    pub fn default_book() -> Self {
        Self {
            recipes: vec![
                recipe(
                    "stone_axe",
                    "Stone Axe",
                    &[("wood", 3), ("flint", 2), ("fiber", 2)],
                    "stone_axe",
                    1,
                    1,
                    None,
                    20,
                ),
                recipe(
                    "stone_pickaxe",
                    "Stone Pickaxe",
                    &[("wood", 3), ("flint", 3), ("fiber", 2)],
                    "stone_pickaxe",
                    1,
                    2,
                    None,
                    25,
                ),
                recipe(
                    "cooked_meat",
                    "Cooked Meat",
                    &[("raw_meat", 1), ("wood", 1)],
                    "cooked_meat",
                    1,
                    1,
                    None,
                    10,
                ),
                recipe(
                    "herbal_tea",
                    "Herbal Tea",
                    &[("moonpetal", 2), ("waterskin_full", 1)],
                    "herbal_tea",
                    1,
                    3,
                    None,
                    15,
                ),
                recipe(
                    "fur_cloak",
                    "Fur Cloak",
                    &[("fur", 6), ("fiber", 4)],
                    "fur_cloak",
                    1,
                    4,
                    None,
                    40,
                ),
                recipe(
                    "charcoal",
                    "Charcoal",
                    &[("wood", 4)],
                    "charcoal",
                    2,
                    2,
                    Some("axe"),
                    8,
                ),
                recipe(
                    "iron_axe",
                    "Iron Axe",
                    &[("iron_ore", 4), ("wood", 2), ("charcoal", 2)],
                    "iron_axe",
                    1,
                    6,
                    Some("pickaxe"),
                    60,
                ),
            ],
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn recipe(
    id: &str,
    name: &str,
    inputs: &[(&str, u32)],
    output_id: &str,
    output_quantity: u32,
    min_level: u32,
    required_tool: Option<&str>,
    xp_award: u64,
) -> Recipe {
    Recipe {
        id: id.to_string(),
        name: name.to_string(),
        inputs: inputs
            .iter()
            .map(|(item_id, quantity)| RecipeInput {
                item_id: (*item_id).to_string(),
                quantity: *quantity,
            })
            .collect(),
        output_id: output_id.to_string(),
        output_quantity,
        min_level,
        required_tool: required_tool.map(str::to_string),
        xp_award,
    }
}

/// Crafting failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CraftError {
    #[error("player level {have} is below required level {required}")]
    LevelTooLow { required: u32, have: u32 },
    #[error("missing required tool: {0}")]
    MissingTool(String),
    #[error("missing input {item_id}: need {needed}, have {have}")]
    MissingInput {
        item_id: String,
        needed: u32,
        have: u32,
    },
    #[error("no room for {0} in inventory")]
    NoRoomForOutput(String),
}

/// Result of a successful craft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftOutcome {
    pub recipe_id: String,
    pub output_id: String,
    pub crafted_quantity: u32,
    pub xp_awarded: u64,
}

/// Execute a recipe against an inventory, atomically.
///
/// Inputs are consumed and the output granted only if every check passes;
/// on any failure the inventory is untouched.
///
/// # Errors
///
/// Returns a `CraftError` describing the first failed check.
pub fn craft(
    inventory: &mut Inventory,
    recipe: &Recipe,
    catalog: &ItemCatalog,
    player_level: u32,
    tool_tags: &std::collections::HashSet<String>,
) -> Result<CraftOutcome, CraftError> {
    if player_level < recipe.min_level {
        return Err(CraftError::LevelTooLow {
            required: recipe.min_level,
            have: player_level,
        });
    }
    if let Some(tool) = &recipe.required_tool
        && !tool_tags.contains(tool)
    {
        return Err(CraftError::MissingTool(tool.clone()));
    }

    // Stage the whole mutation on a copy so failures leave no side effects.
    let mut staged = inventory.clone();
    for input in &recipe.inputs {
        staged
            .remove(&input.item_id, input.quantity)
            .map_err(|_| CraftError::MissingInput {
                item_id: input.item_id.clone(),
                needed: input.quantity,
                have: inventory.quantity_of(&input.item_id),
            })?;
    }
    let overflow = staged.add(
        &recipe.output_id,
        recipe.output_quantity,
        catalog.max_stack(&recipe.output_id),
    );
    if overflow > 0 {
        return Err(CraftError::NoRoomForOutput(recipe.output_id.clone()));
    }

    *inventory = staged;
    Ok(CraftOutcome {
        recipe_id: recipe.id.clone(),
        output_id: recipe.output_id.clone(),
        crafted_quantity: recipe.output_quantity,
        xp_awarded: recipe.xp_award,
    })
}
