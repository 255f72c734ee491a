//! Game clock and derived time-of-day/season state.
//!
//! The clock stores only a real-time anchor plus a speed multiplier; every
//! `GameTime` snapshot is re-derived from scaled elapsed milliseconds, so no
//! derived field is ever authoritative.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::numbers::{round_f64_to_u64, u64_to_f64};

const MINUTES_PER_HOUR: u64 = 60;
const HOURS_PER_DAY: u64 = 24;

/// Length of one in-game day on the game timeline, in game milliseconds.
pub const GAME_DAY_MS: u64 = 86_400_000;

/// Time-of-day periods derived from configured hour boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    #[default]
    Night,
    Morning,
    Midday,
    Evening,
}

impl TimeOfDay {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Night => "night",
            Self::Morning => "morning",
            Self::Midday => "midday",
            Self::Evening => "evening",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "night" => Ok(Self::Night),
            "morning" => Ok(Self::Morning),
            "midday" => Ok(Self::Midday),
            "evening" => Ok(Self::Evening),
            _ => Err(()),
        }
    }
}

/// Seasons derived from the month counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Derive the season from a 1-based month counter.
    #[must_use]
    pub fn from_month(month: u32, months_per_season: u32) -> Self {
        let span = months_per_season.max(1);
        let idx = month.saturating_sub(1) / span;
        match idx % 4 {
            0 => Self::Spring,
            1 => Self::Summer,
            2 => Self::Autumn,
            _ => Self::Winter,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunable calendar and day-cycle configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Real seconds per in-game day.
    #[serde(default = "default_day_duration_secs")]
    pub day_duration_secs: f64,
    #[serde(default = "default_days_per_month")]
    pub days_per_month: u32,
    #[serde(default = "default_months_per_year")]
    pub months_per_year: u32,
    #[serde(default = "default_months_per_season")]
    pub months_per_season: u32,
    /// Hour at which morning begins (inclusive).
    #[serde(default = "default_morning_start")]
    pub morning_start_hour: u8,
    #[serde(default = "default_midday_start")]
    pub midday_start_hour: u8,
    #[serde(default = "default_evening_start")]
    pub evening_start_hour: u8,
    #[serde(default = "default_night_start")]
    pub night_start_hour: u8,
    #[serde(default = "default_min_speed")]
    pub min_speed: f64,
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            day_duration_secs: default_day_duration_secs(),
            days_per_month: default_days_per_month(),
            months_per_year: default_months_per_year(),
            months_per_season: default_months_per_season(),
            morning_start_hour: default_morning_start(),
            midday_start_hour: default_midday_start(),
            evening_start_hour: default_evening_start(),
            night_start_hour: default_night_start(),
            min_speed: default_min_speed(),
            max_speed: default_max_speed(),
        }
    }
}

impl TimeConfig {
    /// Load a time configuration from a JSON string.
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

    /// Validate calendar and boundary invariants.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.day_duration_secs.is_finite() && self.day_duration_secs > 0.0) {
            return Err(String::from("day_duration_secs must be positive"));
        }
        if self.days_per_month == 0 || self.months_per_year == 0 || self.months_per_season == 0 {
            return Err(String::from("calendar spans must be non-zero"));
        }
        if !self.months_per_year.is_multiple_of(self.months_per_season) {
            return Err(String::from(
                "months_per_year must be a multiple of months_per_season",
            ));
        }
        let bounds = [
            self.morning_start_hour,
            self.midday_start_hour,
            self.evening_start_hour,
            self.night_start_hour,
        ];
        if !bounds.is_sorted() || bounds.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(String::from(
                "time-of-day hour boundaries must be strictly increasing",
            ));
        }
        if self.night_start_hour >= 24 {
            return Err(String::from("hour boundaries must stay below 24"));
        }
        if !(self.min_speed.is_finite() && self.min_speed > 0.0) || self.max_speed < self.min_speed
        {
            return Err(String::from("speed bounds must satisfy 0 < min <= max"));
        }
        Ok(())
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Real milliseconds that one in-game day takes at 1x speed.
    #[must_use]
    pub fn day_duration_ms(&self) -> u64 {
        round_f64_to_u64(self.day_duration_secs * 1_000.0)
    }

    /// Game milliseconds that pass per real millisecond at 1x speed.
    #[must_use]
    pub fn time_scale(&self) -> f64 {
        u64_to_f64(GAME_DAY_MS) / (self.day_duration_secs * 1_000.0)
    }

    /// Classify an hour into its configured time-of-day period.
    ///
    /// Boundary hours belong to the later period.
    #[must_use]
    pub const fn time_of_day(&self, hour: u8) -> TimeOfDay {
        if hour < self.morning_start_hour {
            TimeOfDay::Night
        } else if hour < self.midday_start_hour {
            TimeOfDay::Morning
        } else if hour < self.evening_start_hour {
            TimeOfDay::Midday
        } else if hour < self.night_start_hour {
            TimeOfDay::Evening
        } else {
            TimeOfDay::Night
        }
    }
}

const fn default_day_duration_secs() -> f64 {
    1_200.0
}

const fn default_days_per_month() -> u32 {
    30
}

const fn default_months_per_year() -> u32 {
    12
}

const fn default_months_per_season() -> u32 {
    3
}

const fn default_morning_start() -> u8 {
    6
}

const fn default_midday_start() -> u8 {
    11
}

const fn default_evening_start() -> u8 {
    18
}

const fn default_night_start() -> u8 {
    22
}

const fn default_min_speed() -> f64 {
    0.1
}

const fn default_max_speed() -> f64 {
    100.0
}

/// Derived game-time snapshot.
///
/// Every field is a pure function of scaled elapsed time and `TimeConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameTime {
    /// Scaled elapsed game time since world creation, in milliseconds.
    pub timestamp_ms: u64,
    /// 1-based day within the current month.
    pub day: u32,
    /// 1-based month within the current year.
    pub month: u32,
    /// 1-based year counter.
    pub year: u32,
    /// Total elapsed whole days since world creation.
    pub total_days: u64,
    pub hour: u8,
    pub minute: u8,
    pub time_of_day: TimeOfDay,
    pub is_day: bool,
    /// Fraction of the current day elapsed, in `[0, 1)`.
    pub day_progress: f64,
    pub season: Season,
}

impl GameTime {
    /// Derive a snapshot from elapsed game milliseconds.
    #[must_use]
    pub fn derive(elapsed_game_ms: u64, cfg: &TimeConfig) -> Self {
        let day_ms = GAME_DAY_MS;
        let total_days = elapsed_game_ms / day_ms;
        let within_day_ms = elapsed_game_ms % day_ms;
        let day_progress = u64_to_f64(within_day_ms) / u64_to_f64(day_ms);

        let minute_of_day = round_to_minute(day_progress);
        let hour = u8::try_from(minute_of_day / MINUTES_PER_HOUR).unwrap_or(0);
        let minute = u8::try_from(minute_of_day % MINUTES_PER_HOUR).unwrap_or(0);

        let days_per_month = u64::from(cfg.days_per_month.max(1));
        let months_per_year = u64::from(cfg.months_per_year.max(1));
        let total_months = total_days / days_per_month;
        let day = u32::try_from(total_days % days_per_month).unwrap_or(0) + 1;
        let month = u32::try_from(total_months % months_per_year).unwrap_or(0) + 1;
        let year = u32::try_from(total_months / months_per_year).unwrap_or(u32::MAX - 1) + 1;

        let time_of_day = cfg.time_of_day(hour);
        let is_day = hour >= cfg.morning_start_hour && hour < cfg.night_start_hour;

        Self {
            timestamp_ms: elapsed_game_ms,
            day,
            month,
            year,
            total_days,
            hour,
            minute,
            time_of_day,
            is_day,
            day_progress,
            season: Season::from_month(month, cfg.months_per_season),
        }
    }
}

fn round_to_minute(day_progress: f64) -> u64 {
    let total_minutes = MINUTES_PER_HOUR * HOURS_PER_DAY;
    let minute = (day_progress * u64_to_f64(total_minutes)).floor();
    round_f64_to_u64(minute).min(total_minutes - 1)
}

/// Wall-clock anchored clock with an adjustable speed multiplier.
///
/// Changing speed re-anchors the clock so derived game time stays continuous
/// and never moves backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameClock {
    anchor_real_ms: u64,
    anchored_game_ms: u64,
    speed: f64,
}

impl GameClock {
    /// Create a clock anchored at `now_ms` with 1x speed.
    #[must_use]
    pub const fn new(now_ms: u64) -> Self {
        Self {
            anchor_real_ms: now_ms,
            anchored_game_ms: 0,
            speed: 1.0,
        }
    }

    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Elapsed game milliseconds at the given wall-clock instant.
    ///
    /// Real time is scaled by the configured day compression times the
    /// current speed. Instants before the anchor clamp to the anchor rather
    /// than rewinding.
    #[must_use]
    pub fn elapsed_game_ms(&self, now_ms: u64, cfg: &TimeConfig) -> u64 {
        let real_elapsed = now_ms.saturating_sub(self.anchor_real_ms);
        let scaled =
            round_f64_to_u64(u64_to_f64(real_elapsed) * self.speed * cfg.time_scale());
        self.anchored_game_ms.saturating_add(scaled)
    }

    /// Set the speed multiplier, clamped to the configured bounds.
    ///
    /// Returns the applied speed. Re-anchors at `now_ms` so elapsed game
    /// time is continuous across the change.
    pub fn set_speed(&mut self, now_ms: u64, speed: f64, cfg: &TimeConfig) -> f64 {
        let applied = if speed.is_finite() {
            speed.clamp(cfg.min_speed, cfg.max_speed)
        } else {
            1.0
        };
        self.anchored_game_ms = self.elapsed_game_ms(now_ms, cfg);
        self.anchor_real_ms = now_ms;
        self.speed = applied;
        applied
    }

    /// Derive the current game time at the given wall-clock instant.
    #[must_use]
    pub fn game_time(&self, now_ms: u64, cfg: &TimeConfig) -> GameTime {
        GameTime::derive(self.elapsed_game_ms(now_ms, cfg), cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOAT_EPSILON;

    fn cfg() -> TimeConfig {
        TimeConfig::default_config()
    }

    #[test]
    fn zero_elapsed_is_first_morning_of_calendar() {
        let time = GameTime::derive(0, &cfg());
        assert_eq!(time.day, 1);
        assert_eq!(time.month, 1);
        assert_eq!(time.year, 1);
        assert_eq!(time.hour, 0);
        assert_eq!(time.minute, 0);
        assert_eq!(time.time_of_day, TimeOfDay::Night);
        assert!(!time.is_day);
        assert!(time.day_progress.abs() < FLOAT_EPSILON);
    }

    #[test]
    fn hour_boundaries_belong_to_later_period() {
        let config = cfg();
        assert_eq!(config.time_of_day(5), TimeOfDay::Night);
        assert_eq!(config.time_of_day(6), TimeOfDay::Morning);
        assert_eq!(config.time_of_day(11), TimeOfDay::Midday);
        assert_eq!(config.time_of_day(18), TimeOfDay::Evening);
        assert_eq!(config.time_of_day(22), TimeOfDay::Night);
    }

    #[test]
    fn quarter_day_maps_to_six_am() {
        let config = cfg();
        let time = GameTime::derive(GAME_DAY_MS / 4, &config);
        assert_eq!(time.hour, 6);
        assert_eq!(time.time_of_day, TimeOfDay::Morning);
        assert!(time.is_day);
    }

    #[test]
    fn day_progress_stays_below_one() {
        let config = cfg();
        let time = GameTime::derive(GAME_DAY_MS - 1, &config);
        assert!(time.day_progress < 1.0);
        assert_eq!(time.total_days, 0);

        let next = GameTime::derive(GAME_DAY_MS, &config);
        assert_eq!(next.total_days, 1);
        assert!(next.day_progress.abs() < FLOAT_EPSILON);
    }

    #[test]
    fn calendar_rolls_months_years_and_seasons() {
        let config = cfg();

        let spring = GameTime::derive(0, &config);
        assert_eq!(spring.season, Season::Spring);

        // Month 4 begins after 90 elapsed days.
        let summer = GameTime::derive(GAME_DAY_MS * 90, &config);
        assert_eq!(summer.month, 4);
        assert_eq!(summer.season, Season::Summer);

        let winter = GameTime::derive(GAME_DAY_MS * 30 * 9, &config);
        assert_eq!(winter.season, Season::Winter);

        let second_year = GameTime::derive(GAME_DAY_MS * 360, &config);
        assert_eq!(second_year.year, 2);
        assert_eq!(second_year.month, 1);
        assert_eq!(second_year.season, Season::Spring);
    }

    /// Config with no day compression, so game ms equal real ms at 1x.
    fn realtime_cfg() -> TimeConfig {
        TimeConfig {
            day_duration_secs: 86_400.0,
            ..cfg()
        }
    }

    #[test]
    fn time_scale_compresses_real_time() {
        assert!((cfg().time_scale() - 72.0).abs() < FLOAT_EPSILON);
        assert!((realtime_cfg().time_scale() - 1.0).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn speed_change_preserves_continuity() {
        let config = realtime_cfg();
        let mut clock = GameClock::new(1_000);
        let before = clock.elapsed_game_ms(61_000, &config);
        assert_eq!(before, 60_000);

        let applied = clock.set_speed(61_000, 2.0, &config);
        assert!((applied - 2.0).abs() < FLOAT_EPSILON);
        assert_eq!(clock.elapsed_game_ms(61_000, &config), before);

        // One additional real minute now counts double.
        assert_eq!(clock.elapsed_game_ms(121_000, &config), before + 120_000);
    }

    #[test]
    fn speed_is_clamped_to_config_bounds() {
        let config = cfg();
        let mut clock = GameClock::new(0);
        assert!((clock.set_speed(0, 10_000.0, &config) - config.max_speed).abs() < FLOAT_EPSILON);
        assert!((clock.set_speed(0, 0.0, &config) - config.min_speed).abs() < FLOAT_EPSILON);
        assert!((clock.set_speed(0, f64::NAN, &config) - 1.0).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn clock_never_rewinds_before_anchor() {
        let clock = GameClock::new(5_000);
        assert_eq!(clock.elapsed_game_ms(1_000, &cfg()), 0);
    }

    #[test]
    fn config_validation_rejects_bad_boundaries() {
        let mut config = cfg();
        config.midday_start_hour = config.morning_start_hour;
        assert!(config.validate().is_err());

        let mut config = cfg();
        config.day_duration_secs = 0.0;
        assert!(config.validate().is_err());

        let mut config = cfg();
        config.months_per_season = 5;
        assert!(config.validate().is_err());

        assert!(cfg().validate().is_ok());
    }

    #[test]
    fn config_round_trips_from_json() {
        let parsed = TimeConfig::from_json(r#"{ "day_duration_secs": 600.0 }"#).unwrap();
        assert!((parsed.day_duration_secs - 600.0).abs() < FLOAT_EPSILON);
        assert_eq!(parsed.days_per_month, 30);
        assert!(TimeConfig::from_json(r#"{ "day_duration_secs": -1.0 }"#).is_err());
    }

    #[test]
    fn season_from_month_cycles() {
        assert_eq!(Season::from_month(1, 3), Season::Spring);
        assert_eq!(Season::from_month(4, 3), Season::Summer);
        assert_eq!(Season::from_month(7, 3), Season::Autumn);
        assert_eq!(Season::from_month(10, 3), Season::Winter);
        assert_eq!(Season::from_month(13, 3), Season::Spring);
    }
}
