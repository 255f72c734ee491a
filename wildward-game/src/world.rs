//! World orchestration: the tick pipeline and every player-facing operation.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::biome::{BiomeCatalog, GatherRoll, roll_node};
use crate::clock::{GameClock, GameTime, TimeConfig};
use crate::constants::{
    FAILED_LOOT_FORFEIT_RATIO, LOG_CONSUMED, LOG_CRAFTED, LOG_DEHYDRATED,
    LOG_EXHAUSTED, LOG_EXPEDITION_COMPLETED, LOG_EXPEDITION_FAILED, LOG_EXPEDITION_OVERFLOW,
    LOG_EXPEDITION_STARTED, LOG_FREEZING, LOG_GATHERED, LOG_INCAPACITATED, LOG_STARVING,
};
use crate::crafting::{CraftError, CraftOutcome, ItemCatalog, RecipeBook, craft};
use crate::expedition::{
    ActiveExpedition, ExpeditionCatalog, ExpeditionStateError, ExpeditionStatus,
};
use crate::inventory::{InventoryError, transfer};
use crate::numbers::{round_f64_to_u32, u64_to_f64};
use crate::player::{Player, PlayerId};
use crate::status::{ConsumptionConfig, StatusContext, apply_restores, apply_status_decay};
use crate::temperature::{TemperatureConfig, TemperatureReading, read_temperature};
use crate::weather::{WeatherConfig, WeatherState, select_weather_for_today};

/// Full configuration set for a world, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorldConfig {
    #[serde(default)]
    pub time: TimeConfig,
    #[serde(default)]
    pub consumption: ConsumptionConfig,
    #[serde(default)]
    pub temperature: TemperatureConfig,
    #[serde(default = "WeatherConfig::default_config")]
    pub weather: WeatherConfig,
}

impl WorldConfig {
    /// Load a world configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or any section fails
    /// validation.
    pub fn from_json(json_str: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json_str).map_err(|e| format!("JSON parse error: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.time.validate()?;
        self.consumption.validate()?;
        self.temperature.validate()?;
        self.weather.validate()?;
        Ok(())
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self {
            time: TimeConfig::default_config(),
            consumption: ConsumptionConfig::default_config(),
            temperature: TemperatureConfig::default_config(),
            weather: WeatherConfig::default_config(),
        }
    }
}

/// Errors surfaced by world operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error("unknown player: {0}")]
    UnknownPlayer(String),
    #[error("unknown biome: {0}")]
    UnknownBiome(String),
    #[error("unknown recipe: {0}")]
    UnknownRecipe(String),
    #[error("unknown item: {0}")]
    UnknownItem(String),
    #[error("unknown expedition plan: {0}")]
    UnknownPlan(String),
    #[error("player {0} is incapacitated")]
    Incapacitated(String),
    #[error("player level {have} is below required level {required}")]
    LevelTooLow { required: u32, have: u32 },
    #[error("not enough energy: need {needed}, have {have}")]
    NotEnoughEnergy { needed: f32, have: f32 },
    #[error("item {0} is not consumable")]
    NotConsumable(String),
    #[error("nothing can be gathered here right now")]
    NothingToGather,
    #[error("player {0} already has an active expedition")]
    ExpeditionAlreadyActive(String),
    #[error("player {0} has no expedition")]
    NoExpedition(String),
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Craft(#[from] CraftError),
    #[error(transparent)]
    Expedition(#[from] ExpeditionStateError),
}

/// Outcome of a gather operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatherOutcome {
    pub biome_id: String,
    pub item_id: String,
    pub amount: u32,
    /// Portion that did not fit in the inventory.
    pub overflow: u32,
    pub xp_awarded: u64,
    pub levels_gained: u32,
}

/// The authoritative in-memory game world.
#[derive(Debug, Clone)]
pub struct World {
    pub seed: u64,
    pub config: WorldConfig,
    pub biomes: BiomeCatalog,
    pub items: ItemCatalog,
    pub recipes: RecipeBook,
    pub expedition_plans: ExpeditionCatalog,
    pub weather: WeatherState,
    clock: GameClock,
    players: BTreeMap<PlayerId, Player>,
    expeditions: BTreeMap<PlayerId, ActiveExpedition>,
    rng: ChaCha20Rng,
    /// Total-day counter of the last weather roll.
    last_weather_day: Option<u64>,
    next_player_seq: u64,
    next_expedition_seq: u64,
}

impl World {
    /// Create a world with default config and catalogs.
    #[must_use]
    pub fn new(seed: u64, now_ms: u64) -> Self {
        Self::with_config(seed, now_ms, WorldConfig::default_config())
    }

    /// Create a world with an explicit configuration.
    #[must_use]
    pub fn with_config(seed: u64, now_ms: u64, config: WorldConfig) -> Self {
        Self {
            seed,
            config,
            biomes: BiomeCatalog::default_catalog(),
            items: ItemCatalog::default_catalog(),
            recipes: RecipeBook::default_book(),
            expedition_plans: ExpeditionCatalog::default_catalog(),
            weather: WeatherState::default(),
            clock: GameClock::new(now_ms),
            players: BTreeMap::new(),
            expeditions: BTreeMap::new(),
            rng: ChaCha20Rng::seed_from_u64(seed),
            last_weather_day: None,
            next_player_seq: 0,
            next_expedition_seq: 0,
        }
    }

    /// Current derived game time.
    #[must_use]
    pub fn current_time(&self, now_ms: u64) -> GameTime {
        self.clock.game_time(now_ms, &self.config.time)
    }

    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.clock.speed()
    }

    /// Set the clock speed, returning the clamped value actually applied.
    pub fn set_speed(&mut self, now_ms: u64, speed: f64) -> f64 {
        self.clock.set_speed(now_ms, speed, &self.config.time)
    }

    /// Create a player and return its id.
    pub fn create_player(&mut self, name: &str, now_ms: u64) -> String {
        self.next_player_seq += 1;
        let id = format!("player-{}", self.next_player_seq);
        let now_game = self.clock.elapsed_game_ms(now_ms, &self.config.time);
        let player = Player::new(id.clone(), name.trim().to_string(), now_game);
        self.players.insert(id.clone(), player);
        id
    }

    #[must_use]
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.get(player_id)
    }

    #[must_use]
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// The player's expedition record, terminal ones included.
    #[must_use]
    pub fn expedition_for(&self, player_id: &str) -> Option<&ActiveExpedition> {
        self.expeditions.get(player_id)
    }

    /// Temperature at the player's current location.
    ///
    /// Players on expedition feel the plan's biome; everyone else the
    /// ambient base.
    pub fn player_temperature(
        &self,
        player_id: &str,
        now_ms: u64,
    ) -> Result<TemperatureReading, WorldError> {
        let player = self
            .players
            .get(player_id)
            .ok_or_else(|| WorldError::UnknownPlayer(player_id.to_string()))?;
        let time = self.current_time(now_ms);
        let base = self.player_base_temperature(player_id);
        let player_mod = if player.has_cold_protection() {
            self.config.temperature.equipment_warmth
        } else {
            0.0
        };
        Ok(read_temperature(
            &self.config.temperature,
            base,
            &time,
            self.weather.today,
            player_mod,
        ))
    }

    fn player_base_temperature(&self, player_id: &str) -> f32 {
        self.expeditions
            .get(player_id)
            .filter(|exp| !exp.status.is_terminal())
            .and_then(|exp| self.expedition_plans.get(&exp.plan_id))
            .and_then(|plan| self.biomes.get(&plan.biome_id))
            .map_or(self.config.temperature.base_ambient, |biome| {
                biome.base_temperature
            })
    }

    /// Advance the whole simulation to `now_ms`.
    ///
    /// Pipeline order is fixed: clock snapshot, daily weather roll, then per
    /// player status degradation followed by expedition advancement. Calling
    /// with no elapsed game time is a no-op.
    pub fn tick(&mut self, now_ms: u64) {
        let time = self.current_time(now_ms);
        self.roll_daily_weather(&time);

        let now_game = time.timestamp_ms;
        let player_ids: Vec<String> = self.players.keys().cloned().collect();
        for player_id in player_ids {
            self.tick_player_status(&player_id, now_game);
            self.tick_player_expedition(&player_id, now_game);
        }
    }

    fn roll_daily_weather(&mut self, time: &GameTime) {
        if self.last_weather_day == Some(time.total_days) {
            return;
        }
        match select_weather_for_today(
            &self.weather,
            time.season,
            &self.config.weather,
            &mut self.rng,
        ) {
            Ok(today) => {
                self.weather.record(today);
                log::debug!(
                    "weather day={} season={} -> {:?}",
                    time.total_days,
                    time.season,
                    today
                );
            }
            Err(err) => log::warn!("weather roll skipped: {err}"),
        }
        self.last_weather_day = Some(time.total_days);
    }

    fn tick_player_status(&mut self, player_id: &str, now_game_ms: u64) {
        let base = self.player_base_temperature(player_id);
        let time = GameTime::derive(now_game_ms, &self.config.time);
        let weather_today = self.weather.today;
        let Some(player) = self.players.get_mut(player_id) else {
            return;
        };

        let elapsed_ms = now_game_ms.saturating_sub(player.last_tick_game_ms);
        player.last_tick_game_ms = now_game_ms;
        if elapsed_ms == 0 {
            return;
        }
        let elapsed_mins = u64_to_f64(elapsed_ms) / 60_000.0;

        let player_mod = if player.has_cold_protection() {
            self.config.temperature.equipment_warmth
        } else {
            0.0
        };
        let reading = read_temperature(
            &self.config.temperature,
            base,
            &time,
            weather_today,
            player_mod,
        );
        let ctx = StatusContext {
            band: reading.band,
            sleeping: player.sleeping,
            has_cold_protection: player.has_cold_protection(),
        };
        let before = player.vitals;
        let outcome = apply_status_decay(
            &mut player.vitals,
            elapsed_mins,
            ctx,
            &self.config.consumption,
        );

        if outcome.starving && before.hunger > 0.0 {
            player.journal.push(String::from(LOG_STARVING));
        }
        if outcome.dehydrated && before.thirst > 0.0 {
            player.journal.push(String::from(LOG_DEHYDRATED));
        }
        if outcome.freezing && before.health > player.vitals.health {
            player.journal.push(String::from(LOG_FREEZING));
        }
        if player.vitals.energy <= 0.0 && before.energy > 0.0 {
            player.journal.push(String::from(LOG_EXHAUSTED));
        }
        if outcome.became_incapacitated {
            player.journal.push(String::from(LOG_INCAPACITATED));
            self.fail_expedition_for(player_id, now_game_ms, "incapacitated");
        }
    }

    fn tick_player_expedition(&mut self, player_id: &str, now_game_ms: u64) {
        let Some(expedition) = self.expeditions.get_mut(player_id) else {
            return;
        };
        if expedition.status != ExpeditionStatus::Active {
            return;
        }
        let Some(plan) = self.expedition_plans.get(&expedition.plan_id).cloned() else {
            return;
        };
        let yield_mult = self.weather.today.yield_multiplier();
        expedition.advance(now_game_ms, &plan, yield_mult, &mut self.rng);
        if expedition.status == ExpeditionStatus::Completed {
            self.resolve_expedition(player_id, now_game_ms, false, plan.xp_award);
        }
    }

    /// Fail the player's non-terminal expedition, if any, and settle loot.
    fn fail_expedition_for(&mut self, player_id: &str, now_game_ms: u64, reason: &str) {
        let Some(expedition) = self.expeditions.get_mut(player_id) else {
            return;
        };
        if expedition.status.is_terminal() {
            return;
        }
        if expedition.abort(now_game_ms, reason).is_ok() {
            self.resolve_expedition(player_id, now_game_ms, true, 0);
        }
    }

    /// Transfer settled expedition loot into inventory, then storage.
    fn resolve_expedition(&mut self, player_id: &str, _now_game_ms: u64, failed: bool, xp: u64) {
        let Some(expedition) = self.expeditions.get(player_id) else {
            return;
        };
        let collected: Vec<(String, u32)> = expedition
            .collected
            .iter()
            .map(|(item_id, quantity)| (item_id.clone(), *quantity))
            .collect();
        let items = self.items.clone();
        let Some(player) = self.players.get_mut(player_id) else {
            return;
        };

        let mut discarded = 0;
        for (item_id, quantity) in collected {
            let kept = if failed {
                let forfeit = round_f64_to_u32(f64::from(quantity) * FAILED_LOOT_FORFEIT_RATIO);
                quantity.saturating_sub(forfeit)
            } else {
                quantity
            };
            if kept == 0 {
                continue;
            }
            let max_stack = items.max_stack(&item_id);
            let spill = player.inventory.add(&item_id, kept, max_stack);
            if spill > 0 {
                discarded += player.storage.add(&item_id, spill, max_stack);
            }
        }

        if discarded > 0 {
            player.journal.push(String::from(LOG_EXPEDITION_OVERFLOW));
        }
        if failed {
            player.journal.push(String::from(LOG_EXPEDITION_FAILED));
        } else {
            player.journal.push(String::from(LOG_EXPEDITION_COMPLETED));
            player.grant_xp(xp);
        }
        player.refresh_equipment_tags(&items);
    }

    /// Gather once in a biome.
    ///
    /// # Errors
    ///
    /// Rejects unknown ids, incapacitation, level gates, energy shortage,
    /// and biomes with nothing currently harvestable.
    pub fn gather(
        &mut self,
        player_id: &str,
        biome_id: &str,
        now_ms: u64,
    ) -> Result<GatherOutcome, WorldError> {
        let time = self.current_time(now_ms);
        let yield_mult = self.weather.today.yield_multiplier();
        let biome = self
            .biomes
            .get(biome_id)
            .ok_or_else(|| WorldError::UnknownBiome(biome_id.to_string()))?
            .clone();
        let items = self.items.clone();
        let player = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| WorldError::UnknownPlayer(player_id.to_string()))?;

        if player.is_incapacitated() {
            return Err(WorldError::Incapacitated(player_id.to_string()));
        }
        if player.level < biome.min_level {
            return Err(WorldError::LevelTooLow {
                required: biome.min_level,
                have: player.level,
            });
        }
        if player.vitals.energy < biome.gather_energy_cost {
            return Err(WorldError::NotEnoughEnergy {
                needed: biome.gather_energy_cost,
                have: player.vitals.energy,
            });
        }

        let roll = roll_node(&biome, time.is_day, &player.equipment_tags, &mut self.rng)
            .ok_or(WorldError::NothingToGather)?;
        let GatherRoll { item_id, amount } = roll;
        let amount = round_f64_to_u32(f64::from(amount) * yield_mult).max(1);

        player.vitals.energy -= biome.gather_energy_cost;
        player.vitals.clamp();
        let overflow = player
            .inventory
            .add(&item_id, amount, items.max_stack(&item_id));
        let levels_gained = player.grant_xp(biome.xp_per_gather);
        player.journal.push(String::from(LOG_GATHERED));
        player.refresh_equipment_tags(&items);

        Ok(GatherOutcome {
            biome_id: biome.id,
            item_id,
            amount,
            overflow,
            xp_awarded: biome.xp_per_gather,
            levels_gained,
        })
    }

    /// Craft a recipe from the player's inventory.
    ///
    /// # Errors
    ///
    /// Rejects unknown ids, incapacitation, and every `CraftError`.
    pub fn craft_item(
        &mut self,
        player_id: &str,
        recipe_id: &str,
    ) -> Result<CraftOutcome, WorldError> {
        let recipe = self
            .recipes
            .get(recipe_id)
            .ok_or_else(|| WorldError::UnknownRecipe(recipe_id.to_string()))?
            .clone();
        let items = self.items.clone();
        let player = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| WorldError::UnknownPlayer(player_id.to_string()))?;
        if player.is_incapacitated() {
            return Err(WorldError::Incapacitated(player_id.to_string()));
        }

        let outcome = craft(
            &mut player.inventory,
            &recipe,
            &items,
            player.level,
            &player.equipment_tags,
        )?;
        player.grant_xp(outcome.xp_awarded);
        player.journal.push(String::from(LOG_CRAFTED));
        player.refresh_equipment_tags(&items);
        Ok(outcome)
    }

    /// Eat or drink one unit of a consumable item.
    ///
    /// # Errors
    ///
    /// Rejects unknown ids, non-consumables, and missing stock.
    pub fn consume(&mut self, player_id: &str, item_id: &str) -> Result<(), WorldError> {
        let item = self
            .items
            .get(item_id)
            .ok_or_else(|| WorldError::UnknownItem(item_id.to_string()))?
            .clone();
        if !item.category.is_consumable() {
            return Err(WorldError::NotConsumable(item_id.to_string()));
        }
        let player = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| WorldError::UnknownPlayer(player_id.to_string()))?;

        player.inventory.remove(item_id, 1)?;
        apply_restores(
            &mut player.vitals,
            item.restore_hunger,
            item.restore_thirst,
            item.restore_energy,
        );
        player.journal.push(String::from(LOG_CONSUMED));
        Ok(())
    }

    /// Move a quantity from inventory to storage.
    ///
    /// # Errors
    ///
    /// Fails atomically on shortage or a full destination.
    pub fn deposit(
        &mut self,
        player_id: &str,
        item_id: &str,
        quantity: u32,
    ) -> Result<(), WorldError> {
        let max_stack = self.items.max_stack(item_id);
        let items = self.items.clone();
        let player = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| WorldError::UnknownPlayer(player_id.to_string()))?;
        transfer(
            &mut player.inventory,
            &mut player.storage,
            item_id,
            quantity,
            max_stack,
        )?;
        player.refresh_equipment_tags(&items);
        Ok(())
    }

    /// Move a quantity from storage to inventory.
    ///
    /// # Errors
    ///
    /// Fails atomically on shortage or a full destination.
    pub fn withdraw(
        &mut self,
        player_id: &str,
        item_id: &str,
        quantity: u32,
    ) -> Result<(), WorldError> {
        let max_stack = self.items.max_stack(item_id);
        let items = self.items.clone();
        let player = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| WorldError::UnknownPlayer(player_id.to_string()))?;
        transfer(
            &mut player.storage,
            &mut player.inventory,
            item_id,
            quantity,
            max_stack,
        )?;
        player.refresh_equipment_tags(&items);
        Ok(())
    }

    /// Toggle the sleeping flag.
    ///
    /// # Errors
    ///
    /// Rejects unknown players.
    pub fn set_sleeping(&mut self, player_id: &str, sleeping: bool) -> Result<(), WorldError> {
        let player = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| WorldError::UnknownPlayer(player_id.to_string()))?;
        player.sleeping = sleeping;
        Ok(())
    }

    /// Start an expedition from a plan.
    ///
    /// # Errors
    ///
    /// Rejects unknown ids, a still-running expedition, incapacitation,
    /// level gates and energy shortage.
    pub fn start_expedition(
        &mut self,
        player_id: &str,
        plan_id: &str,
        now_ms: u64,
    ) -> Result<String, WorldError> {
        let now_game = self.clock.elapsed_game_ms(now_ms, &self.config.time);
        let plan = self
            .expedition_plans
            .get(plan_id)
            .ok_or_else(|| WorldError::UnknownPlan(plan_id.to_string()))?
            .clone();
        if self
            .expeditions
            .get(player_id)
            .is_some_and(|exp| !exp.status.is_terminal())
        {
            return Err(WorldError::ExpeditionAlreadyActive(player_id.to_string()));
        }
        let player = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| WorldError::UnknownPlayer(player_id.to_string()))?;
        if player.is_incapacitated() {
            return Err(WorldError::Incapacitated(player_id.to_string()));
        }
        if player.level < plan.min_level {
            return Err(WorldError::LevelTooLow {
                required: plan.min_level,
                have: player.level,
            });
        }
        if player.vitals.energy < plan.energy_cost {
            return Err(WorldError::NotEnoughEnergy {
                needed: plan.energy_cost,
                have: player.vitals.energy,
            });
        }

        player.vitals.energy -= plan.energy_cost;
        player.vitals.clamp();
        player.journal.push(String::from(LOG_EXPEDITION_STARTED));

        self.next_expedition_seq += 1;
        let id = format!("exp-{}", self.next_expedition_seq);
        let expedition =
            ActiveExpedition::start(id.clone(), player_id.to_string(), &plan, now_game);
        self.expeditions.insert(player_id.to_string(), expedition);
        Ok(id)
    }

    /// Pause the player's active expedition.
    ///
    /// # Errors
    ///
    /// Rejects missing expeditions and invalid state transitions.
    pub fn pause_expedition(&mut self, player_id: &str, now_ms: u64) -> Result<(), WorldError> {
        let now_game = self.clock.elapsed_game_ms(now_ms, &self.config.time);
        let expedition = self
            .expeditions
            .get_mut(player_id)
            .ok_or_else(|| WorldError::NoExpedition(player_id.to_string()))?;
        expedition.pause(now_game)?;
        Ok(())
    }

    /// Resume the player's paused expedition.
    ///
    /// # Errors
    ///
    /// Rejects missing expeditions and invalid state transitions.
    pub fn resume_expedition(&mut self, player_id: &str, now_ms: u64) -> Result<(), WorldError> {
        let now_game = self.clock.elapsed_game_ms(now_ms, &self.config.time);
        let expedition = self
            .expeditions
            .get_mut(player_id)
            .ok_or_else(|| WorldError::NoExpedition(player_id.to_string()))?;
        expedition.resume(now_game)?;
        Ok(())
    }

    /// Abort the player's expedition, forfeiting part of its loot.
    ///
    /// # Errors
    ///
    /// Rejects missing expeditions and already-finished ones.
    pub fn abort_expedition(&mut self, player_id: &str, now_ms: u64) -> Result<(), WorldError> {
        let now_game = self.clock.elapsed_game_ms(now_ms, &self.config.time);
        let expedition = self
            .expeditions
            .get_mut(player_id)
            .ok_or_else(|| WorldError::NoExpedition(player_id.to_string()))?;
        expedition.abort(now_game, "aborted")?;
        self.resolve_expedition(player_id, now_game, true, 0);
        Ok(())
    }
}
