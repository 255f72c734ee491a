//! Daily weather selection and its gameplay modifiers.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::clock::Season;

/// Weather conditions rolled once per in-game day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WeatherKind {
    #[default]
    Clear,
    Overcast,
    Rain,
    Storm,
    Snow,
    Heatwave,
}

impl WeatherKind {
    /// Check if weather is considered extreme (streak-limited).
    #[must_use]
    pub const fn is_extreme(self) -> bool {
        matches!(self, Self::Storm | Self::Snow | Self::Heatwave)
    }

    /// Temperature contribution in degrees Celsius.
    #[must_use]
    pub const fn temperature_modifier(self) -> f32 {
        match self {
            Self::Clear => 0.0,
            Self::Overcast => -2.0,
            Self::Rain => -4.0,
            Self::Storm => -6.0,
            Self::Snow => -10.0,
            Self::Heatwave => 8.0,
        }
    }

    /// Multiplier applied to gather and expedition yields.
    #[must_use]
    pub const fn yield_multiplier(self) -> f64 {
        match self {
            Self::Clear | Self::Overcast => 1.0,
            Self::Rain => 0.9,
            Self::Storm => 0.75,
            Self::Snow => 0.8,
            Self::Heatwave => 0.9,
        }
    }
}

const WEATHER_ORDER: [WeatherKind; 6] = [
    WeatherKind::Clear,
    WeatherKind::Overcast,
    WeatherKind::Rain,
    WeatherKind::Storm,
    WeatherKind::Snow,
    WeatherKind::Heatwave,
];

fn weather_weight(weights: &HashMap<WeatherKind, u32>, weather: WeatherKind) -> u32 {
    *weights.get(&weather).unwrap_or(&0)
}

/// Configuration limits for the weather system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherLimits {
    pub max_extreme_streak: u32,
}

/// Complete weather system configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub limits: WeatherLimits,
    pub weights: HashMap<Season, HashMap<WeatherKind, u32>>,
}

impl WeatherConfig {
    /// Load weather configuration from a JSON string.
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

    /// Validate configuration completeness.
    ///
    /// # Errors
    ///
    /// Returns a description of the first missing weight entry.
    pub fn validate(&self) -> Result<(), String> {
        for season in [Season::Spring, Season::Summer, Season::Autumn, Season::Winter] {
            let Some(season_weights) = self.weights.get(&season) else {
                return Err(format!("Missing weights for season: {season:?}"));
            };
            for weather in WEATHER_ORDER {
                if !season_weights.contains_key(&weather) {
                    return Err(format!("Missing weight for {weather:?} in {season:?}"));
                }
            }
            let non_extreme: u32 = WEATHER_ORDER
                .iter()
                .filter(|weather| !weather.is_extreme())
                .map(|weather| weather_weight(season_weights, *weather))
                .sum();
            if non_extreme == 0 {
                return Err(format!("Season {season:?} has no non-extreme weight"));
            }
        }
        Ok(())
    }

    /// Embedded default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        let mut weights = HashMap::new();
        weights.insert(
            Season::Spring,
            season_weights([40, 25, 25, 8, 0, 2]),
        );
        weights.insert(
            Season::Summer,
            season_weights([45, 20, 12, 8, 0, 15]),
        );
        weights.insert(
            Season::Autumn,
            season_weights([30, 30, 25, 12, 3, 0]),
        );
        weights.insert(
            Season::Winter,
            season_weights([25, 30, 5, 5, 35, 0]),
        );
        Self {
            limits: WeatherLimits {
                max_extreme_streak: 3,
            },
            weights,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

fn season_weights(values: [u32; 6]) -> HashMap<WeatherKind, u32> {
    WEATHER_ORDER.iter().copied().zip(values).collect()
}

/// Weather state tracking for streak enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WeatherState {
    pub today: WeatherKind,
    pub yesterday: WeatherKind,
    pub extreme_streak: u32,
}

impl WeatherState {
    /// Advance history after today's weather is decided.
    pub const fn record(&mut self, today: WeatherKind) {
        self.yesterday = self.today;
        self.today = today;
        self.extreme_streak = if today.is_extreme() {
            self.extreme_streak + 1
        } else {
            0
        };
    }
}

/// Select today's weather based on season weights and the streak limit.
///
/// # Errors
///
/// Returns an error if weights do not exist for the current season.
pub fn select_weather_for_today<R: Rng>(
    state: &WeatherState,
    season: Season,
    cfg: &WeatherConfig,
    rng: &mut R,
) -> Result<WeatherKind, String> {
    let Some(season_weights) = cfg.weights.get(&season) else {
        return Err(format!("Weather weights must exist for season {season:?}"));
    };

    let total: u32 = WEATHER_ORDER
        .iter()
        .map(|weather| weather_weight(season_weights, *weather))
        .sum();
    if total == 0 {
        return Ok(WeatherKind::Clear);
    }

    let mut candidate = pick_weighted(season_weights, rng, |_| true, total);

    // Enforce extreme streak limit by redrawing from non-extremes.
    if candidate.is_extreme() && state.extreme_streak >= cfg.limits.max_extreme_streak {
        let non_extreme_total: u32 = WEATHER_ORDER
            .iter()
            .filter(|weather| !weather.is_extreme())
            .map(|weather| weather_weight(season_weights, *weather))
            .sum();
        if non_extreme_total > 0 {
            candidate = pick_weighted(
                season_weights,
                rng,
                |weather| !weather.is_extreme(),
                non_extreme_total,
            );
        } else {
            candidate = WeatherKind::Clear;
        }
    }

    Ok(candidate)
}

fn pick_weighted<R: Rng, F: Fn(WeatherKind) -> bool>(
    weights: &HashMap<WeatherKind, u32>,
    rng: &mut R,
    eligible: F,
    total: u32,
) -> WeatherKind {
    let mut roll = rng.gen_range(0..total);
    for weather in WEATHER_ORDER {
        if !eligible(weather) {
            continue;
        }
        let weight = weather_weight(weights, weather);
        if weight == 0 {
            continue;
        }
        if roll < weight {
            return weather;
        }
        roll -= weight;
    }
    WeatherKind::Clear
}
