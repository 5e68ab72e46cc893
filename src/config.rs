//! # Scoring Config
//!
//! Tunable knobs for the demand calendar, loaded from TOML.
//!
//! - `[scoring]`: additive bonuses and divisors for the raw daily score.
//! - `[thresholds]`: normalized-score bands for the daily impact tier.
//! - `[category_defaults]`: per-category attendance stand-ins for events
//!   reporting zero attendees.
//! - `[flagship]`: subjects that always carry an extra bonus.
//! - `[markers]`: keyword lists for national reach and excluded areas.
//!
//! Every field has a built-in seed value, so a missing or partial file is
//! never fatal. Out-of-range numbers are hardened back to the seed on load.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::records::{EventCategory, ImpactLevel};

pub const DEFAULT_SCORING_CONFIG_PATH: &str = "config/scoring.toml";
pub const ENV_SCORING_CONFIG_PATH: &str = "SCORING_CONFIG_PATH";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub scoring: ScoreWeights,
    #[serde(default)]
    pub thresholds: TierThresholds,
    #[serde(default)]
    pub category_defaults: CategoryDefaults,
    #[serde(default)]
    pub flagship: FlagshipBonus,
    #[serde(default)]
    pub markers: Markers,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreWeights {
    /// Flat bonus for national holidays.
    #[serde(default = "default_holiday_bonus")]
    pub holiday_bonus: f64,
    /// Flat bonus for Saturdays and Sundays.
    #[serde(default = "default_weekend_bonus")]
    pub weekend_bonus: f64,
    /// Multiplier on the monthly trend score.
    #[serde(default = "default_trend_weight")]
    pub trend_weight: f64,
    /// Heads-per-point conversion for per-day attendance.
    #[serde(default = "default_attendee_divisor")]
    pub attendee_divisor: f64,
    /// Cruise calls are short stopovers; their contribution is divided by this.
    #[serde(default = "default_cruise_damping")]
    pub cruise_damping: f64,
    /// Multi-day competitions add attendees/lodging_divisor per extra night.
    #[serde(default = "default_lodging_divisor")]
    pub lodging_divisor: f64,
    /// Bonus for competitions with national reach, spread over the span.
    #[serde(default = "default_national_bonus")]
    pub national_bonus: f64,
    /// Attendance at which a competition counts as national-scale.
    #[serde(default = "default_national_attendee_min")]
    pub national_attendee_min: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TierThresholds {
    #[serde(default = "default_medium_threshold")]
    pub medium: f64,
    #[serde(default = "default_high_threshold")]
    pub high: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDefaults {
    #[serde(default = "default_competition_attendance")]
    pub competition: f64,
    #[serde(default = "default_cruise_attendance")]
    pub cruise: f64,
    #[serde(default = "default_concert_attendance")]
    pub concert: f64,
    #[serde(default = "default_festival_attendance")]
    pub festival: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlagshipBonus {
    #[serde(default = "default_flagship_bonus")]
    pub bonus: f64,
    /// Substring match against event subjects.
    #[serde(default = "default_flagship_subjects")]
    pub subjects: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Markers {
    /// Subject substrings that signal nationwide draw.
    #[serde(default = "default_national_keywords")]
    pub national: Vec<String>,
    /// Location substrings excluded from the calendar entirely.
    #[serde(default = "default_excluded_locations")]
    pub excluded_locations: Vec<String>,
}

fn default_holiday_bonus() -> f64 {
    50.0
}
fn default_weekend_bonus() -> f64 {
    20.0
}
fn default_trend_weight() -> f64 {
    2.0
}
fn default_attendee_divisor() -> f64 {
    5.0
}
fn default_cruise_damping() -> f64 {
    5.0
}
fn default_lodging_divisor() -> f64 {
    10.0
}
fn default_national_bonus() -> f64 {
    50.0
}
fn default_national_attendee_min() -> u32 {
    500
}
fn default_medium_threshold() -> f64 {
    30.0
}
fn default_high_threshold() -> f64 {
    50.0
}
fn default_competition_attendance() -> f64 {
    200.0
}
fn default_cruise_attendance() -> f64 {
    50.0
}
fn default_concert_attendance() -> f64 {
    100.0
}
fn default_festival_attendance() -> f64 {
    300.0
}
fn default_flagship_bonus() -> f64 {
    200.0
}
fn default_flagship_subjects() -> Vec<String> {
    vec!["霧フェス".to_string(), "KUSHIRO KIRI FESTIVAL".to_string()]
}
fn default_national_keywords() -> Vec<String> {
    vec!["全国".to_string()]
}
fn default_excluded_locations() -> Vec<String> {
    vec!["阿寒".to_string()]
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            holiday_bonus: default_holiday_bonus(),
            weekend_bonus: default_weekend_bonus(),
            trend_weight: default_trend_weight(),
            attendee_divisor: default_attendee_divisor(),
            cruise_damping: default_cruise_damping(),
            lodging_divisor: default_lodging_divisor(),
            national_bonus: default_national_bonus(),
            national_attendee_min: default_national_attendee_min(),
        }
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            medium: default_medium_threshold(),
            high: default_high_threshold(),
        }
    }
}

impl Default for CategoryDefaults {
    fn default() -> Self {
        Self {
            competition: default_competition_attendance(),
            cruise: default_cruise_attendance(),
            concert: default_concert_attendance(),
            festival: default_festival_attendance(),
        }
    }
}

impl Default for FlagshipBonus {
    fn default() -> Self {
        Self {
            bonus: default_flagship_bonus(),
            subjects: default_flagship_subjects(),
        }
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            national: default_national_keywords(),
            excluded_locations: default_excluded_locations(),
        }
    }
}

impl TierThresholds {
    /// Band a normalized daily score into its impact tier.
    pub fn tier_for(&self, normalized: f64) -> ImpactLevel {
        if normalized >= self.high {
            ImpactLevel::High
        } else if normalized >= self.medium {
            ImpactLevel::Medium
        } else {
            ImpactLevel::Low
        }
    }
}

impl CategoryDefaults {
    /// Attendance stand-in for records that report zero attendees.
    pub fn for_category(&self, category: EventCategory) -> f64 {
        match category {
            EventCategory::Competition => self.competition,
            EventCategory::Cruise => self.cruise,
            EventCategory::Concert => self.concert,
            EventCategory::Festival => self.festival,
        }
    }
}

impl FlagshipBonus {
    pub fn matches(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| subject.contains(s.as_str()))
    }
}

impl Markers {
    pub fn is_national(&self, subject: &str) -> bool {
        self.national.iter().any(|k| subject.contains(k.as_str()))
    }

    pub fn is_excluded_location(&self, location: &str) -> bool {
        self.excluded_locations
            .iter()
            .any(|k| location.contains(k.as_str()))
    }
}

impl ScoringConfig {
    /// Built-in seed values, identical to an empty TOML file.
    pub fn default_seed() -> Self {
        Self::default()
    }

    /// Parse from a TOML string; numeric fields are hardened afterwards.
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let mut cfg: ScoringConfig = toml::from_str(raw)?;
        cfg.harden();
        Ok(cfg)
    }

    /// Load from an explicit path; errors surface to the caller.
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading scoring config at {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("parsing scoring config at {}", path.display()))
    }

    /// Resolve the config path (env override, then the default location) and
    /// load it. Any failure falls back to the built-in seed with a warning.
    pub fn load_or_seed() -> Self {
        let path = std::env::var(ENV_SCORING_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SCORING_CONFIG_PATH));
        match Self::load_from_file(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "scoring config unavailable, using built-in seed");
                Self::default_seed()
            }
        }
    }

    /// Push odd numbers back to seed values so scoring math never sees a
    /// NaN, a negative bonus, or a zero divisor.
    fn harden(&mut self) {
        let seed_w = ScoreWeights::default();
        let seed_t = TierThresholds::default();
        let seed_c = CategoryDefaults::default();

        harden_weight(&mut self.scoring.holiday_bonus, seed_w.holiday_bonus, "scoring.holiday_bonus");
        harden_weight(&mut self.scoring.weekend_bonus, seed_w.weekend_bonus, "scoring.weekend_bonus");
        harden_weight(&mut self.scoring.trend_weight, seed_w.trend_weight, "scoring.trend_weight");
        harden_weight(&mut self.scoring.national_bonus, seed_w.national_bonus, "scoring.national_bonus");
        harden_divisor(&mut self.scoring.attendee_divisor, seed_w.attendee_divisor, "scoring.attendee_divisor");
        harden_divisor(&mut self.scoring.cruise_damping, seed_w.cruise_damping, "scoring.cruise_damping");
        harden_divisor(&mut self.scoring.lodging_divisor, seed_w.lodging_divisor, "scoring.lodging_divisor");

        harden_weight(&mut self.thresholds.medium, seed_t.medium, "thresholds.medium");
        harden_weight(&mut self.thresholds.high, seed_t.high, "thresholds.high");
        if self.thresholds.medium > self.thresholds.high {
            warn!(
                medium = self.thresholds.medium,
                high = self.thresholds.high,
                "inverted tier thresholds, collapsing medium to high"
            );
            self.thresholds.medium = self.thresholds.high;
        }

        harden_weight(&mut self.category_defaults.competition, seed_c.competition, "category_defaults.competition");
        harden_weight(&mut self.category_defaults.cruise, seed_c.cruise, "category_defaults.cruise");
        harden_weight(&mut self.category_defaults.concert, seed_c.concert, "category_defaults.concert");
        harden_weight(&mut self.category_defaults.festival, seed_c.festival, "category_defaults.festival");

        harden_weight(&mut self.flagship.bonus, default_flagship_bonus(), "flagship.bonus");
    }
}

fn harden_weight(value: &mut f64, seed: f64, name: &str) {
    if !value.is_finite() || *value < 0.0 {
        warn!(field = name, value = *value, "out-of-range config value, using seed");
        *value = seed;
    }
}

fn harden_divisor(value: &mut f64, seed: f64, name: &str) {
    if !value.is_finite() || *value <= 0.0 {
        warn!(field = name, value = *value, "non-positive divisor, using seed");
        *value = seed;
    }
}
