//! Timed expeditions: plans, the progress/phase state machine, and loot.

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::constants::{
    HAZARD_LOSS_RATIO, LOOT_ROLL_PROGRESS_STEP, PHASE_COMPLETED_AT, PHASE_EXPLORING_AT,
    PHASE_RETURNING_AT, PHASE_TRAVELING_AT,
};
use crate::numbers::{round_f64_to_u32, u64_to_f64};

/// Events produced by a single advance call, inline up to the common case.
pub type AdvanceEvents = SmallVec<[ExpeditionEvent; 4]>;

/// One weighted loot table entry of an expedition plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item_id: String,
    pub weight: u32,
    #[serde(default = "default_min_amount")]
    pub min_amount: u32,
    #[serde(default = "default_max_amount")]
    pub max_amount: u32,
}

const fn default_min_amount() -> u32 {
    1
}

const fn default_max_amount() -> u32 {
    2
}

/// A launchable expedition template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpeditionPlan {
    pub id: String,
    pub name: String,
    pub biome_id: String,
    /// Total duration in game-minutes.
    pub duration_mins: f64,
    #[serde(default = "default_min_level")]
    pub min_level: u32,
    #[serde(default = "default_energy_cost")]
    pub energy_cost: f32,
    /// Chance per loot roll of a hazard event, in `[0, 1]`.
    #[serde(default)]
    pub risk: f64,
    #[serde(default)]
    pub xp_award: u64,
    pub loot: Vec<LootEntry>,
}

const fn default_min_level() -> u32 {
    1
}

const fn default_energy_cost() -> f32 {
    15.0
}

/// Catalog of launchable plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExpeditionCatalog {
    pub plans: Vec<ExpeditionPlan>,
}

impl ExpeditionCatalog {
    /// Load an expedition catalog from a JSON string.
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
        for (idx, plan) in self.plans.iter().enumerate() {
            if plan.id.is_empty() {
                return Err(format!("plan at index {idx} has an empty id"));
            }
            if self.plans[..idx].iter().any(|other| other.id == plan.id) {
                return Err(format!("duplicate plan id: {}", plan.id));
            }
            if !(plan.duration_mins.is_finite() && plan.duration_mins > 0.0) {
                return Err(format!("plan {} needs a positive duration", plan.id));
            }
            if !(0.0..=1.0).contains(&plan.risk) {
                return Err(format!("plan {} risk must be within [0, 1]", plan.id));
            }
            if plan.loot.is_empty() || plan.loot.iter().all(|entry| entry.weight == 0) {
                return Err(format!("plan {} has no weighted loot", plan.id));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, plan_id: &str) -> Option<&ExpeditionPlan> {
        self.plans.iter().find(|plan| plan.id == plan_id)
    }

    /// Embedded default catalog.
    #[must_use]
    pub fn default_catalog() -> Self {
        Self {
            plans: vec![
                plan(
                    "forest_forage",
                    "Forest Forage",
                    "verdant_forest",
                    180.0,
                    1,
                    12.0,
                    0.05,
                    30,
                    &[("wood", 35, 2, 5), ("fiber", 30, 2, 4), ("berries", 25, 1, 4), ("resin", 10, 1, 2)],
                ),
                plan(
                    "deep_quarry",
                    "Deep Quarry Survey",
                    "granite_hills",
                    360.0,
                    4,
                    20.0,
                    0.12,
                    80,
                    &[("stone", 40, 3, 6), ("iron_ore", 30, 1, 3), ("clay", 20, 2, 4), ("flint", 10, 1, 3)],
                ),
                plan(
                    "frost_hunt",
                    "Frostreach Hunt",
                    "frostreach",
                    540.0,
                    8,
                    30.0,
                    0.2,
                    160,
                    &[("fur", 40, 2, 4), ("raw_meat", 35, 2, 4), ("iron_ore", 25, 1, 2)],
                ),
            ],
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn plan(
    id: &str,
    name: &str,
    biome_id: &str,
    duration_mins: f64,
    min_level: u32,
    energy_cost: f32,
    risk: f64,
    xp_award: u64,
    loot: &[(&str, u32, u32, u32)],
) -> ExpeditionPlan {
    ExpeditionPlan {
        id: id.to_string(),
        name: name.to_string(),
        biome_id: biome_id.to_string(),
        duration_mins,
        min_level,
        energy_cost,
        risk,
        xp_award,
        loot: loot
            .iter()
            .map(|(item_id, weight, min_amount, max_amount)| LootEntry {
                item_id: (*item_id).to_string(),
                weight: *weight,
                min_amount: *min_amount,
                max_amount: *max_amount,
            })
            .collect(),
    }
}

/// Phase derived purely from the progress percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpeditionPhase {
    Preparing,
    Traveling,
    Exploring,
    Returning,
    Completed,
}

impl ExpeditionPhase {
    /// Map a progress percentage onto its phase.
    ///
    /// Threshold values belong to the later phase.
    #[must_use]
    pub fn from_progress(progress: f64) -> Self {
        if progress >= PHASE_COMPLETED_AT {
            Self::Completed
        } else if progress >= PHASE_RETURNING_AT {
            Self::Returning
        } else if progress >= PHASE_EXPLORING_AT {
            Self::Exploring
        } else if progress >= PHASE_TRAVELING_AT {
            Self::Traveling
        } else {
            Self::Preparing
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::Traveling => "traveling",
            Self::Exploring => "exploring",
            Self::Returning => "returning",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ExpeditionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status; `Failed` and `Completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpeditionStatus {
    Active,
    Paused,
    Failed,
    Completed,
}

impl ExpeditionStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Completed)
    }
}

/// Kinds of entries in an expedition's event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpeditionEventKind {
    PhaseChanged,
    ResourceFound,
    Hazard,
    Paused,
    Resumed,
    Aborted,
    Completed,
}

/// A timestamped entry in the expedition event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpeditionEvent {
    /// Game timestamp at which the event occurred.
    pub at_game_ms: u64,
    pub kind: ExpeditionEventKind,
    pub detail: serde_json::Value,
}

/// Why an advance call changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExpeditionStateError {
    #[error("expedition is not active")]
    NotActive,
    #[error("expedition is not paused")]
    NotPaused,
    #[error("expedition already finished")]
    AlreadyTerminal,
}

/// A running (or finished) expedition instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveExpedition {
    pub id: String,
    pub player_id: String,
    pub plan_id: String,
    /// Game timestamp at which the expedition started.
    pub started_at_game_ms: u64,
    /// Projected end, ignoring pauses; recomputed on resume.
    pub ends_at_game_ms: u64,
    pub duration_ms: u64,
    /// Accumulated paused game time.
    pub paused_ms: u64,
    /// Game timestamp of the current pause, while paused.
    pub paused_at_game_ms: Option<u64>,
    /// Progress percentage in `[0, 100]`.
    pub progress: f64,
    pub phase: ExpeditionPhase,
    pub status: ExpeditionStatus,
    /// Loot collected so far, keyed by item id.
    pub collected: BTreeMap<String, u32>,
    pub events: Vec<ExpeditionEvent>,
    /// Highest progress value already consumed by loot rolls.
    #[serde(default)]
    loot_cursor: f64,
}

impl ActiveExpedition {
    /// Start a new expedition from a plan at the given game time.
    #[must_use]
    pub fn start(id: String, player_id: String, plan: &ExpeditionPlan, now_game_ms: u64) -> Self {
        let duration_ms = crate::numbers::round_f64_to_u64(plan.duration_mins * 60_000.0).max(1);
        Self {
            id,
            player_id,
            plan_id: plan.id.clone(),
            started_at_game_ms: now_game_ms,
            ends_at_game_ms: now_game_ms + duration_ms,
            duration_ms,
            paused_ms: 0,
            paused_at_game_ms: None,
            progress: 0.0,
            phase: ExpeditionPhase::Preparing,
            status: ExpeditionStatus::Active,
            collected: BTreeMap::new(),
            events: Vec::new(),
            loot_cursor: 0.0,
        }
    }

    /// Effective elapsed game time, excluding pauses.
    #[must_use]
    pub fn effective_elapsed_ms(&self, now_game_ms: u64) -> u64 {
        let frozen_at = self.paused_at_game_ms.unwrap_or(now_game_ms);
        frozen_at
            .min(now_game_ms)
            .saturating_sub(self.started_at_game_ms)
            .saturating_sub(self.paused_ms)
    }

    /// Progress percentage at a given game time, clamped to `[0, 100]`.
    #[must_use]
    pub fn progress_at(&self, now_game_ms: u64) -> f64 {
        let elapsed = u64_to_f64(self.effective_elapsed_ms(now_game_ms));
        let duration = u64_to_f64(self.duration_ms);
        (elapsed / duration * 100.0).clamp(0.0, 100.0)
    }

    /// Pause an active expedition.
    ///
    /// # Errors
    ///
    /// Returns `NotActive` unless the expedition is currently active.
    pub fn pause(&mut self, now_game_ms: u64) -> Result<(), ExpeditionStateError> {
        if self.status != ExpeditionStatus::Active {
            return Err(ExpeditionStateError::NotActive);
        }
        self.paused_at_game_ms = Some(now_game_ms);
        self.status = ExpeditionStatus::Paused;
        self.push_event(
            now_game_ms,
            ExpeditionEventKind::Paused,
            serde_json::json!({ "progress": self.progress }),
        );
        Ok(())
    }

    /// Resume a paused expedition.
    ///
    /// # Errors
    ///
    /// Returns `NotPaused` unless the expedition is currently paused.
    pub fn resume(&mut self, now_game_ms: u64) -> Result<(), ExpeditionStateError> {
        if self.status != ExpeditionStatus::Paused {
            return Err(ExpeditionStateError::NotPaused);
        }
        let paused_at = self.paused_at_game_ms.take().unwrap_or(now_game_ms);
        let pause_span = now_game_ms.saturating_sub(paused_at);
        self.paused_ms = self.paused_ms.saturating_add(pause_span);
        self.ends_at_game_ms = self.ends_at_game_ms.saturating_add(pause_span);
        self.status = ExpeditionStatus::Active;
        self.push_event(
            now_game_ms,
            ExpeditionEventKind::Resumed,
            serde_json::json!({ "paused_ms": pause_span }),
        );
        Ok(())
    }

    /// Abort a non-terminal expedition, marking it failed.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyTerminal` for completed or failed expeditions.
    pub fn abort(&mut self, now_game_ms: u64, reason: &str) -> Result<(), ExpeditionStateError> {
        if self.status.is_terminal() {
            return Err(ExpeditionStateError::AlreadyTerminal);
        }
        self.paused_at_game_ms = None;
        self.status = ExpeditionStatus::Failed;
        self.push_event(
            now_game_ms,
            ExpeditionEventKind::Aborted,
            serde_json::json!({ "reason": reason, "progress": self.progress }),
        );
        Ok(())
    }

    /// Advance the expedition to the given game time.
    ///
    /// Recomputes progress and phase, rolls loot for the portion of the
    /// exploring window newly covered, and flips to `Completed` exactly once
    /// when progress reaches 100. Paused and terminal expeditions are left
    /// untouched.
    pub fn advance<R: Rng>(
        &mut self,
        now_game_ms: u64,
        plan: &ExpeditionPlan,
        yield_multiplier: f64,
        rng: &mut R,
    ) -> AdvanceEvents {
        let mut produced = AdvanceEvents::new();
        if self.status != ExpeditionStatus::Active {
            return produced;
        }

        let new_progress = self.progress_at(now_game_ms);
        if new_progress <= self.progress {
            return produced;
        }

        let previous_phase = self.phase;
        self.progress = new_progress;
        self.phase = ExpeditionPhase::from_progress(new_progress);
        if self.phase != previous_phase {
            let event = self.push_event(
                now_game_ms,
                ExpeditionEventKind::PhaseChanged,
                serde_json::json!({
                    "from": previous_phase,
                    "to": self.phase,
                    "progress": self.progress,
                }),
            );
            produced.push(event);
        }

        self.roll_loot(now_game_ms, plan, yield_multiplier, rng, &mut produced);

        if self.progress >= PHASE_COMPLETED_AT {
            self.status = ExpeditionStatus::Completed;
            let event = self.push_event(
                now_game_ms,
                ExpeditionEventKind::Completed,
                serde_json::json!({ "collected": self.collected }),
            );
            produced.push(event);
        }

        produced
    }

    /// Roll loot marks covered inside the exploring window since last time.
    fn roll_loot<R: Rng>(
        &mut self,
        now_game_ms: u64,
        plan: &ExpeditionPlan,
        yield_multiplier: f64,
        rng: &mut R,
        produced: &mut AdvanceEvents,
    ) {
        let window_start = self.loot_cursor.max(PHASE_EXPLORING_AT);
        let window_end = self.progress.min(PHASE_RETURNING_AT);
        if window_end <= window_start {
            self.loot_cursor = self.loot_cursor.max(window_end);
            return;
        }

        // Marks sit every LOOT_ROLL_PROGRESS_STEP points from the window start.
        // Progress at the returning boundary already belongs to the next phase,
        // so that mark never rolls.
        let mut mark = next_mark_after(window_start);
        while mark <= window_end && mark < PHASE_RETURNING_AT {
            if let Some(event) = self.roll_once(now_game_ms, plan, yield_multiplier, rng) {
                produced.push(event);
            }
            mark += LOOT_ROLL_PROGRESS_STEP;
        }
        self.loot_cursor = window_end;
    }

    fn roll_once<R: Rng>(
        &mut self,
        now_game_ms: u64,
        plan: &ExpeditionPlan,
        yield_multiplier: f64,
        rng: &mut R,
    ) -> Option<ExpeditionEvent> {
        if plan.risk > 0.0 && rng.r#gen::<f64>() < plan.risk {
            return Some(self.apply_hazard(now_game_ms, rng));
        }

        let total: u32 = plan.loot.iter().map(|entry| entry.weight).sum();
        if total == 0 {
            return None;
        }
        let mut roll = rng.gen_range(0..total);
        for entry in &plan.loot {
            if entry.weight == 0 {
                continue;
            }
            if roll < entry.weight {
                let base = rng.gen_range(entry.min_amount..=entry.max_amount);
                let amount =
                    round_f64_to_u32(f64::from(base) * yield_multiplier.clamp(0.0, 4.0)).max(1);
                *self.collected.entry(entry.item_id.clone()).or_insert(0) += amount;
                return Some(self.push_event(
                    now_game_ms,
                    ExpeditionEventKind::ResourceFound,
                    serde_json::json!({ "item_id": entry.item_id, "amount": amount }),
                ));
            }
            roll -= entry.weight;
        }
        None
    }

    /// A hazard forfeits a share of one collected stack.
    fn apply_hazard<R: Rng>(&mut self, now_game_ms: u64, rng: &mut R) -> ExpeditionEvent {
        let victim = if self.collected.is_empty() {
            None
        } else {
            let idx = rng.gen_range(0..self.collected.len());
            self.collected.keys().nth(idx).cloned()
        };
        let mut lost = 0;
        if let Some(item_id) = &victim
            && let Some(quantity) = self.collected.get_mut(item_id)
        {
            lost = round_f64_to_u32(f64::from(*quantity) * HAZARD_LOSS_RATIO);
            *quantity = quantity.saturating_sub(lost);
            if *quantity == 0 {
                self.collected.remove(item_id);
            }
        }
        self.push_event(
            now_game_ms,
            ExpeditionEventKind::Hazard,
            serde_json::json!({ "item_id": victim, "lost": lost }),
        )
    }

    fn push_event(
        &mut self,
        at_game_ms: u64,
        kind: ExpeditionEventKind,
        detail: serde_json::Value,
    ) -> ExpeditionEvent {
        let event = ExpeditionEvent {
            at_game_ms,
            kind,
            detail,
        };
        self.events.push(event.clone());
        event
    }
}

fn next_mark_after(progress: f64) -> f64 {
    let steps = (progress - PHASE_EXPLORING_AT) / LOOT_ROLL_PROGRESS_STEP;
    PHASE_EXPLORING_AT + steps.floor() * LOOT_ROLL_PROGRESS_STEP + LOOT_ROLL_PROGRESS_STEP
}
