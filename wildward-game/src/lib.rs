//! Wildward Game Engine
//!
//! Platform-agnostic core logic for the Wildward gathering and crafting
//! survival game. This crate provides all simulation mechanics without any
//! HTTP or platform-specific dependencies.

pub mod biome;
pub mod clock;
pub mod constants;
pub mod crafting;
pub mod expedition;
pub mod inventory;
pub mod numbers;
pub mod player;
pub mod status;
pub mod temperature;
pub mod weather;
pub mod world;

// Re-export commonly used types
pub use biome::{Biome, BiomeCatalog, GatherRoll, ResourceNode, roll_node};
pub use clock::{GAME_DAY_MS, GameClock, GameTime, Season, TimeConfig, TimeOfDay};
pub use crafting::{
    CraftError, CraftOutcome, ItemCatalog, ItemCategory, ItemDef, Recipe, RecipeBook, RecipeInput,
    craft,
};
pub use expedition::{
    ActiveExpedition, ExpeditionCatalog, ExpeditionEvent, ExpeditionEventKind, ExpeditionPhase,
    ExpeditionPlan, ExpeditionStateError, ExpeditionStatus, LootEntry,
};
pub use inventory::{Inventory, InventoryError, Stack, transfer};
pub use player::{Player, PlayerId, TAG_COLD_PROTECTION, xp_for_level};
pub use status::{
    ConsumptionConfig, StatusContext, StatusTickOutcome, Vitals, apply_restores,
    apply_status_decay,
};
pub use temperature::{TemperatureBand, TemperatureConfig, TemperatureReading, read_temperature};
pub use weather::{WeatherConfig, WeatherKind, WeatherLimits, WeatherState};
pub use world::{GatherOutcome, World, WorldConfig, WorldError};
