//! Temperature model built from summed per-source modifiers.
//!
//! Readings are recomputed per query from the current game time and weather;
//! nothing here is persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clock::{GameTime, Season, TimeOfDay};
use crate::weather::WeatherKind;

/// Coarse temperature classification feeding degradation multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureBand {
    Freezing,
    Cold,
    Mild,
    Warm,
    Hot,
}

impl TemperatureBand {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Freezing => "freezing",
            Self::Cold => "cold",
            Self::Mild => "mild",
            Self::Warm => "warm",
            Self::Hot => "hot",
        }
    }
}

impl fmt::Display for TemperatureBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunable temperature configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureConfig {
    /// Ambient base used when no biome supplies one.
    #[serde(default = "default_base_ambient")]
    pub base_ambient: f32,
    #[serde(default = "default_floor")]
    pub floor: f32,
    #[serde(default = "default_ceiling")]
    pub ceiling: f32,
    #[serde(default = "default_freezing_below")]
    pub freezing_below: f32,
    #[serde(default = "default_cold_below")]
    pub cold_below: f32,
    #[serde(default = "default_warm_above")]
    pub warm_above: f32,
    #[serde(default = "default_hot_above")]
    pub hot_above: f32,
    /// Warmth granted by cold-protection equipment.
    #[serde(default = "default_equipment_warmth")]
    pub equipment_warmth: f32,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            base_ambient: default_base_ambient(),
            floor: default_floor(),
            ceiling: default_ceiling(),
            freezing_below: default_freezing_below(),
            cold_below: default_cold_below(),
            warm_above: default_warm_above(),
            hot_above: default_hot_above(),
            equipment_warmth: default_equipment_warmth(),
        }
    }
}

impl TemperatureConfig {
    /// Load a temperature configuration from a JSON string.
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

    /// Validate threshold ordering.
    pub fn validate(&self) -> Result<(), String> {
        if self.floor >= self.ceiling {
            return Err(String::from("temperature floor must be below ceiling"));
        }
        let thresholds = [
            self.freezing_below,
            self.cold_below,
            self.warm_above,
            self.hot_above,
        ];
        if thresholds.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(String::from(
                "band thresholds must be strictly increasing",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Classify a temperature into its band.
    #[must_use]
    pub fn band(&self, celsius: f32) -> TemperatureBand {
        if celsius < self.freezing_below {
            TemperatureBand::Freezing
        } else if celsius < self.cold_below {
            TemperatureBand::Cold
        } else if celsius >= self.hot_above {
            TemperatureBand::Hot
        } else if celsius >= self.warm_above {
            TemperatureBand::Warm
        } else {
            TemperatureBand::Mild
        }
    }
}

const fn default_base_ambient() -> f32 {
    14.0
}

const fn default_floor() -> f32 {
    -40.0
}

const fn default_ceiling() -> f32 {
    50.0
}

const fn default_freezing_below() -> f32 {
    0.0
}

const fn default_cold_below() -> f32 {
    10.0
}

const fn default_warm_above() -> f32 {
    22.0
}

const fn default_hot_above() -> f32 {
    30.0
}

const fn default_equipment_warmth() -> f32 {
    6.0
}

/// A fully itemized temperature reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub current: f32,
    pub base: f32,
    pub time_modifier: f32,
    pub season_modifier: f32,
    pub weather_modifier: f32,
    pub player_modifier: f32,
    pub band: TemperatureBand,
}

const fn time_of_day_modifier(time_of_day: TimeOfDay) -> f32 {
    match time_of_day {
        TimeOfDay::Night => -6.0,
        TimeOfDay::Morning => -2.0,
        TimeOfDay::Midday => 4.0,
        TimeOfDay::Evening => 0.0,
    }
}

const fn season_modifier(season: Season) -> f32 {
    match season {
        Season::Spring => 0.0,
        Season::Summer => 8.0,
        Season::Autumn => -3.0,
        Season::Winter => -12.0,
    }
}

/// Compute the current temperature from summed modifiers.
///
/// `base` is the biome base temperature (or the ambient default) and
/// `player_modifier` the equipment/shelter contribution.
#[must_use]
pub fn read_temperature(
    cfg: &TemperatureConfig,
    base: f32,
    time: &GameTime,
    weather: WeatherKind,
    player_modifier: f32,
) -> TemperatureReading {
    let time_modifier = time_of_day_modifier(time.time_of_day);
    let season_mod = season_modifier(time.season);
    let weather_modifier = weather.temperature_modifier();
    let sum = base + time_modifier + season_mod + weather_modifier + player_modifier;
    let current = sum.clamp(cfg.floor, cfg.ceiling);
    TemperatureReading {
        current,
        base,
        time_modifier,
        season_modifier: season_mod,
        weather_modifier,
        player_modifier,
        band: cfg.band(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{GAME_DAY_MS, TimeConfig};

    fn time_at_hour(hour: u64) -> GameTime {
        let cfg = TimeConfig::default_config();
        GameTime::derive(GAME_DAY_MS * hour / 24, &cfg)
    }

    #[test]
    fn reading_sums_all_modifiers() {
        let cfg = TemperatureConfig::default_config();
        let midday = time_at_hour(12);
        let reading = read_temperature(&cfg, 14.0, &midday, WeatherKind::Clear, 0.0);
        assert!((reading.current - 18.0).abs() < f32::EPSILON);
        assert_eq!(reading.band, TemperatureBand::Mild);
    }

    #[test]
    fn winter_night_snow_is_freezing() {
        let cfg = TemperatureConfig::default_config();
        let time_cfg = TimeConfig::default_config();
        // Month 10 (winter) at midnight.
        let elapsed = GAME_DAY_MS * 30 * 9;
        let time = GameTime::derive(elapsed, &time_cfg);
        assert_eq!(time.season, Season::Winter);
        let reading = read_temperature(&cfg, 10.0, &time, WeatherKind::Snow, 0.0);
        assert_eq!(reading.band, TemperatureBand::Freezing);
    }

    #[test]
    fn equipment_warmth_can_lift_a_band() {
        let cfg = TemperatureConfig::default_config();
        let night = time_at_hour(2);
        let without = read_temperature(&cfg, 14.0, &night, WeatherKind::Rain, 0.0);
        let with = read_temperature(
            &cfg,
            14.0,
            &night,
            WeatherKind::Rain,
            cfg.equipment_warmth,
        );
        assert_eq!(without.band, TemperatureBand::Cold);
        assert_eq!(with.band, TemperatureBand::Mild);
    }

    #[test]
    fn readings_clamp_to_bounds() {
        let cfg = TemperatureConfig::default_config();
        let midday = time_at_hour(12);
        let reading = read_temperature(&cfg, 200.0, &midday, WeatherKind::Heatwave, 0.0);
        assert!((reading.current - cfg.ceiling).abs() < f32::EPSILON);
        assert_eq!(reading.band, TemperatureBand::Hot);
    }

    #[test]
    fn band_thresholds_classify_edges() {
        let cfg = TemperatureConfig::default_config();
        assert_eq!(cfg.band(-0.1), TemperatureBand::Freezing);
        assert_eq!(cfg.band(0.0), TemperatureBand::Cold);
        assert_eq!(cfg.band(10.0), TemperatureBand::Mild);
        assert_eq!(cfg.band(22.0), TemperatureBand::Warm);
        assert_eq!(cfg.band(30.0), TemperatureBand::Hot);
    }

    #[test]
    fn validation_rejects_unordered_thresholds() {
        let mut cfg = TemperatureConfig::default_config();
        cfg.warm_above = cfg.cold_below;
        assert!(cfg.validate().is_err());
        assert!(TemperatureConfig::default_config().validate().is_ok());
    }
}
