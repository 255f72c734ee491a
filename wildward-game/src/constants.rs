//! Centralized balance and tuning constants for Wildward game logic.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Journal keys -------------------------------------------------------------
pub(crate) const LOG_STARVING: &str = "log.status.starving";
pub(crate) const LOG_DEHYDRATED: &str = "log.status.dehydrated";
pub(crate) const LOG_FREEZING: &str = "log.status.freezing";
pub(crate) const LOG_EXHAUSTED: &str = "log.status.exhausted";
pub(crate) const LOG_INCAPACITATED: &str = "log.status.incapacitated";
pub(crate) const LOG_LEVEL_UP: &str = "log.player.level-up";
pub(crate) const LOG_GATHERED: &str = "log.gather.success";
pub(crate) const LOG_CRAFTED: &str = "log.craft.success";
pub(crate) const LOG_CONSUMED: &str = "log.consume.success";
pub(crate) const LOG_EXPEDITION_STARTED: &str = "log.expedition.started";
pub(crate) const LOG_EXPEDITION_COMPLETED: &str = "log.expedition.completed";
pub(crate) const LOG_EXPEDITION_FAILED: &str = "log.expedition.failed";
pub(crate) const LOG_EXPEDITION_OVERFLOW: &str = "log.expedition.loot-discarded";

// Expedition tuning --------------------------------------------------------
pub(crate) const PHASE_TRAVELING_AT: f64 = 20.0;
pub(crate) const PHASE_EXPLORING_AT: f64 = 40.0;
pub(crate) const PHASE_RETURNING_AT: f64 = 80.0;
pub(crate) const PHASE_COMPLETED_AT: f64 = 100.0;
pub(crate) const LOOT_ROLL_PROGRESS_STEP: f64 = 8.0;
pub(crate) const FAILED_LOOT_FORFEIT_RATIO: f64 = 0.5;
pub(crate) const HAZARD_LOSS_RATIO: f64 = 0.25;

// Progression tuning -------------------------------------------------------
pub(crate) const XP_CURVE_BASE: f64 = 100.0;
pub(crate) const XP_CURVE_EXPONENT: f64 = 1.5;
pub(crate) const LEVEL_CAP: u32 = 60;

// Vitals tuning ------------------------------------------------------------
pub(crate) const VITAL_MAX: f32 = 100.0;
pub(crate) const VITAL_MIN: f32 = 0.0;

// Container tuning ---------------------------------------------------------
pub(crate) const INVENTORY_SLOTS: usize = 24;
pub(crate) const STORAGE_SLOTS: usize = 96;
pub(crate) const DEFAULT_MAX_STACK: u32 = 50;

#[cfg(test)]
pub(crate) const FLOAT_EPSILON: f64 = 1e-6;
