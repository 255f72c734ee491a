//! Hunger/thirst/energy degradation and health consequences.

use serde::{Deserialize, Serialize};

use crate::constants::{VITAL_MAX, VITAL_MIN};
use crate::numbers::clamp_f64_to_f32;
use crate::temperature::TemperatureBand;

/// Player survival meters, each in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub hunger: f32,
    pub thirst: f32,
    pub energy: f32,
    pub health: f32,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            hunger: VITAL_MAX,
            thirst: VITAL_MAX,
            energy: VITAL_MAX,
            health: VITAL_MAX,
        }
    }
}

impl Vitals {
    pub fn clamp(&mut self) {
        self.hunger = self.hunger.clamp(VITAL_MIN, VITAL_MAX);
        self.thirst = self.thirst.clamp(VITAL_MIN, VITAL_MAX);
        self.energy = self.energy.clamp(VITAL_MIN, VITAL_MAX);
        self.health = self.health.clamp(VITAL_MIN, VITAL_MAX);
    }

    #[must_use]
    pub fn is_incapacitated(&self) -> bool {
        self.health <= VITAL_MIN
    }
}

/// Tunable decay rates and thresholds, all per in-game hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionConfig {
    #[serde(default = "default_hunger_per_hour")]
    pub hunger_per_hour: f32,
    #[serde(default = "default_thirst_per_hour")]
    pub thirst_per_hour: f32,
    #[serde(default = "default_energy_per_hour")]
    pub energy_per_hour_active: f32,
    #[serde(default = "default_energy_recovery")]
    pub energy_recovery_per_hour_sleeping: f32,
    /// Hunger/thirst decay multiplier while sleeping.
    #[serde(default = "default_sleeping_mult")]
    pub sleeping_decay_mult: f32,
    /// Thirst decay multiplier in the hot band.
    #[serde(default = "default_hot_thirst_mult")]
    pub hot_thirst_mult: f32,
    /// Hunger decay multiplier in the freezing band.
    #[serde(default = "default_freezing_hunger_mult")]
    pub freezing_hunger_mult: f32,
    /// Direct health drain in the freezing band without cold protection.
    #[serde(default = "default_freezing_health")]
    pub freezing_health_per_hour: f32,
    #[serde(default = "default_starvation_damage")]
    pub starvation_damage_per_hour: f32,
    #[serde(default = "default_dehydration_damage")]
    pub dehydration_damage_per_hour: f32,
    #[serde(default = "default_regen")]
    pub regen_per_hour: f32,
    #[serde(default = "default_regen_threshold")]
    pub regen_hunger_threshold: f32,
    #[serde(default = "default_regen_threshold")]
    pub regen_thirst_threshold: f32,
    #[serde(default = "default_regen_energy_threshold")]
    pub regen_energy_threshold: f32,
}

impl Default for ConsumptionConfig {
    fn default() -> Self {
        Self {
            hunger_per_hour: default_hunger_per_hour(),
            thirst_per_hour: default_thirst_per_hour(),
            energy_per_hour_active: default_energy_per_hour(),
            energy_recovery_per_hour_sleeping: default_energy_recovery(),
            sleeping_decay_mult: default_sleeping_mult(),
            hot_thirst_mult: default_hot_thirst_mult(),
            freezing_hunger_mult: default_freezing_hunger_mult(),
            freezing_health_per_hour: default_freezing_health(),
            starvation_damage_per_hour: default_starvation_damage(),
            dehydration_damage_per_hour: default_dehydration_damage(),
            regen_per_hour: default_regen(),
            regen_hunger_threshold: default_regen_threshold(),
            regen_thirst_threshold: default_regen_threshold(),
            regen_energy_threshold: default_regen_energy_threshold(),
        }
    }
}

impl ConsumptionConfig {
    /// Load a consumption configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or validation fails.
    pub fn from_json(json_str: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json_str).map_err(|e| format!("JSON parse error: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate that rates are finite and non-negative.
    pub fn validate(&self) -> Result<(), String> {
        let rates = [
            self.hunger_per_hour,
            self.thirst_per_hour,
            self.energy_per_hour_active,
            self.energy_recovery_per_hour_sleeping,
            self.sleeping_decay_mult,
            self.hot_thirst_mult,
            self.freezing_hunger_mult,
            self.freezing_health_per_hour,
            self.starvation_damage_per_hour,
            self.dehydration_damage_per_hour,
            self.regen_per_hour,
        ];
        if rates.iter().any(|rate| !rate.is_finite() || *rate < 0.0) {
            return Err(String::from("rates must be finite and non-negative"));
        }
        Ok(())
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }
}

const fn default_hunger_per_hour() -> f32 {
    4.0
}

const fn default_thirst_per_hour() -> f32 {
    6.0
}

const fn default_energy_per_hour() -> f32 {
    3.0
}

const fn default_energy_recovery() -> f32 {
    12.0
}

const fn default_sleeping_mult() -> f32 {
    0.4
}

const fn default_hot_thirst_mult() -> f32 {
    1.75
}

const fn default_freezing_hunger_mult() -> f32 {
    1.5
}

const fn default_freezing_health() -> f32 {
    2.0
}

const fn default_starvation_damage() -> f32 {
    3.0
}

const fn default_dehydration_damage() -> f32 {
    5.0
}

const fn default_regen() -> f32 {
    1.5
}

const fn default_regen_threshold() -> f32 {
    60.0
}

const fn default_regen_energy_threshold() -> f32 {
    30.0
}

/// Context for a single degradation step.
#[derive(Debug, Clone, Copy)]
pub struct StatusContext {
    pub band: TemperatureBand,
    pub sleeping: bool,
    pub has_cold_protection: bool,
}

/// What happened to a player during one degradation step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct StatusTickOutcome {
    pub hunger_delta: f32,
    pub thirst_delta: f32,
    pub energy_delta: f32,
    pub health_delta: f32,
    pub starving: bool,
    pub dehydrated: bool,
    pub freezing: bool,
    pub became_incapacitated: bool,
}

/// Apply degradation for `elapsed_game_mins` of game time.
///
/// Decay scales linearly with elapsed game-minutes; temperature-band and
/// sleeping multipliers apply on top of the base hourly rates. Hunger or
/// thirst at zero converts into health damage; health regenerates only while
/// every recovery threshold is met.
pub fn apply_status_decay(
    vitals: &mut Vitals,
    elapsed_game_mins: f64,
    ctx: StatusContext,
    cfg: &ConsumptionConfig,
) -> StatusTickOutcome {
    if !(elapsed_game_mins.is_finite() && elapsed_game_mins > 0.0) {
        return StatusTickOutcome::default();
    }
    let hours = clamp_f64_to_f32(elapsed_game_mins / 60.0);
    let was_incapacitated = vitals.is_incapacitated();
    let before = *vitals;

    let sleep_mult = if ctx.sleeping {
        cfg.sleeping_decay_mult
    } else {
        1.0
    };
    let hunger_mult = if ctx.band == TemperatureBand::Freezing {
        cfg.freezing_hunger_mult
    } else {
        1.0
    };
    let thirst_mult = if ctx.band == TemperatureBand::Hot {
        cfg.hot_thirst_mult
    } else {
        1.0
    };

    vitals.hunger -= cfg.hunger_per_hour * hunger_mult * sleep_mult * hours;
    vitals.thirst -= cfg.thirst_per_hour * thirst_mult * sleep_mult * hours;
    if ctx.sleeping {
        vitals.energy += cfg.energy_recovery_per_hour_sleeping * hours;
    } else {
        vitals.energy -= cfg.energy_per_hour_active * hours;
    }

    let starving = vitals.hunger <= VITAL_MIN;
    let dehydrated = vitals.thirst <= VITAL_MIN;
    let freezing =
        ctx.band == TemperatureBand::Freezing && !ctx.has_cold_protection && !ctx.sleeping;

    if starving {
        vitals.health -= cfg.starvation_damage_per_hour * hours;
    }
    if dehydrated {
        vitals.health -= cfg.dehydration_damage_per_hour * hours;
    }
    if freezing {
        vitals.health -= cfg.freezing_health_per_hour * hours;
    }

    let can_regen = !starving
        && !dehydrated
        && !freezing
        && vitals.hunger >= cfg.regen_hunger_threshold
        && vitals.thirst >= cfg.regen_thirst_threshold
        && vitals.energy >= cfg.regen_energy_threshold;
    if can_regen {
        vitals.health += cfg.regen_per_hour * hours;
    }

    vitals.clamp();

    StatusTickOutcome {
        hunger_delta: vitals.hunger - before.hunger,
        thirst_delta: vitals.thirst - before.thirst,
        energy_delta: vitals.energy - before.energy,
        health_delta: vitals.health - before.health,
        starving,
        dehydrated,
        freezing,
        became_incapacitated: !was_incapacitated && vitals.is_incapacitated(),
    }
}

/// Restore effects from consuming a food or drink item, clamped to 100.
pub fn apply_restores(vitals: &mut Vitals, hunger: f32, thirst: f32, energy: f32) {
    vitals.hunger += hunger.max(0.0);
    vitals.thirst += thirst.max(0.0);
    vitals.energy += energy.max(0.0);
    vitals.clamp();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mild_ctx() -> StatusContext {
        StatusContext {
            band: TemperatureBand::Mild,
            sleeping: false,
            has_cold_protection: false,
        }
    }

    #[test]
    fn decay_scales_with_elapsed_hours() {
        let cfg = ConsumptionConfig::default_config();
        let mut vitals = Vitals::default();
        let outcome = apply_status_decay(&mut vitals, 120.0, mild_ctx(), &cfg);
        assert!((vitals.hunger - (100.0 - 2.0 * cfg.hunger_per_hour)).abs() < 1e-4);
        assert!((vitals.thirst - (100.0 - 2.0 * cfg.thirst_per_hour)).abs() < 1e-4);
        assert!((outcome.energy_delta + 2.0 * cfg.energy_per_hour_active).abs() < 1e-4);
        assert!(!outcome.starving);
    }

    #[test]
    fn zero_elapsed_is_a_no_op() {
        let cfg = ConsumptionConfig::default_config();
        let mut vitals = Vitals::default();
        let outcome = apply_status_decay(&mut vitals, 0.0, mild_ctx(), &cfg);
        assert_eq!(outcome, StatusTickOutcome::default());
        assert_eq!(vitals, Vitals::default());
    }

    #[test]
    fn hot_band_accelerates_thirst_only() {
        let cfg = ConsumptionConfig::default_config();
        let mut hot = Vitals::default();
        let mut mild = Vitals::default();
        let ctx = StatusContext {
            band: TemperatureBand::Hot,
            ..mild_ctx()
        };
        apply_status_decay(&mut hot, 60.0, ctx, &cfg);
        apply_status_decay(&mut mild, 60.0, mild_ctx(), &cfg);
        assert!(hot.thirst < mild.thirst);
        assert!((hot.hunger - mild.hunger).abs() < 1e-4);
    }

    #[test]
    fn starvation_converts_to_health_damage() {
        let cfg = ConsumptionConfig::default_config();
        let mut vitals = Vitals {
            hunger: 1.0,
            ..Vitals::default()
        };
        let outcome = apply_status_decay(&mut vitals, 60.0, mild_ctx(), &cfg);
        assert!(outcome.starving);
        assert!((vitals.health - (100.0 - cfg.starvation_damage_per_hour)).abs() < 1e-4);
    }

    #[test]
    fn freezing_without_protection_drains_health() {
        let cfg = ConsumptionConfig::default_config();
        let ctx = StatusContext {
            band: TemperatureBand::Freezing,
            sleeping: false,
            has_cold_protection: false,
        };
        let mut vitals = Vitals::default();
        let outcome = apply_status_decay(&mut vitals, 60.0, ctx, &cfg);
        assert!(outcome.freezing);
        assert!(vitals.health < 100.0);

        let protected = StatusContext {
            has_cold_protection: true,
            ..ctx
        };
        let mut safe = Vitals::default();
        let outcome = apply_status_decay(&mut safe, 60.0, protected, &cfg);
        assert!(!outcome.freezing);
        assert!((safe.health - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn sleeping_slows_decay_and_recovers_energy() {
        let cfg = ConsumptionConfig::default_config();
        let ctx = StatusContext {
            sleeping: true,
            ..mild_ctx()
        };
        let mut vitals = Vitals {
            energy: 20.0,
            ..Vitals::default()
        };
        let outcome = apply_status_decay(&mut vitals, 60.0, ctx, &cfg);
        assert!(outcome.energy_delta > 0.0);
        assert!(
            (vitals.hunger - (100.0 - cfg.hunger_per_hour * cfg.sleeping_decay_mult)).abs() < 1e-4
        );
    }

    #[test]
    fn regen_requires_every_threshold() {
        let cfg = ConsumptionConfig::default_config();
        let mut vitals = Vitals {
            health: 50.0,
            ..Vitals::default()
        };
        let outcome = apply_status_decay(&mut vitals, 60.0, mild_ctx(), &cfg);
        assert!(outcome.health_delta > 0.0);

        let mut tired = Vitals {
            health: 50.0,
            energy: 10.0,
            ..Vitals::default()
        };
        let outcome = apply_status_decay(&mut tired, 60.0, mild_ctx(), &cfg);
        assert!(outcome.health_delta <= 0.0);
    }

    #[test]
    fn incapacitation_fires_once() {
        let cfg = ConsumptionConfig::default_config();
        let mut vitals = Vitals {
            hunger: 0.0,
            thirst: 0.0,
            health: 1.0,
            ..Vitals::default()
        };
        let outcome = apply_status_decay(&mut vitals, 60.0, mild_ctx(), &cfg);
        assert!(outcome.became_incapacitated);
        let outcome = apply_status_decay(&mut vitals, 60.0, mild_ctx(), &cfg);
        assert!(!outcome.became_incapacitated);
    }

    #[test]
    fn restores_clamp_to_max() {
        let mut vitals = Vitals {
            hunger: 90.0,
            thirst: 40.0,
            ..Vitals::default()
        };
        apply_restores(&mut vitals, 30.0, 25.0, 0.0);
        assert!((vitals.hunger - 100.0).abs() < f32::EPSILON);
        assert!((vitals.thirst - 65.0).abs() < f32::EPSILON);
    }

    #[test]
    fn config_validation_rejects_negative_rates() {
        let mut cfg = ConsumptionConfig::default_config();
        cfg.thirst_per_hour = -1.0;
        assert!(cfg.validate().is_err());
        assert!(ConsumptionConfig::from_json("{}").is_ok());
    }
}
