//! Simulation configuration with documented constants
//!
//! All tuned numbers are collected here with explanations of their purpose
//! and how they interact with each other. Loaded once at startup and passed
//! by reference; nothing mutates it afterwards.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{CoreError, Result};
use crate::core::types::{ResourceKind, TenantKind};

/// Per-resource severity cutoffs.
///
/// Bands are checked lowest-first: emergency <= critical <= warning.
/// The abundant band starts above `warning * 2`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdBands {
    pub warning: u64,
    pub critical: u64,
    pub emergency: u64,
}

impl Default for ThresholdBands {
    fn default() -> Self {
        Self {
            warning: 15,
            critical: 8,
            emergency: 3,
        }
    }
}

/// Top-level simulation configuration
///
/// These values have been tuned to produce tense but survivable pacing.
/// Changing them shifts how quickly a block slides into crisis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub thresholds: ThresholdConfig,
    pub trade: TradeConfig,
    pub satisfaction: SatisfactionConfig,
    pub conflict: ConflictConfig,
    pub events: EventConfig,
    pub consumption: ConsumptionConfig,
    pub history: HistoryConfig,
}

// === RESOURCE THRESHOLDS ===

/// Severity cutoffs per resource kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Cutoff table keyed by resource kind. Every kind must be present.
    pub bands: AHashMap<ResourceKind, ThresholdBands>,
}

impl ThresholdConfig {
    /// Cutoffs for one resource kind
    pub fn bands(&self, kind: ResourceKind) -> ThresholdBands {
        self.bands.get(&kind).copied().unwrap_or_default()
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        let mut bands = AHashMap::new();
        // Food depletes fastest (one per tenant per day), so its warning
        // band sits highest.
        bands.insert(
            ResourceKind::Food,
            ThresholdBands { warning: 20, critical: 10, emergency: 5 },
        );
        bands.insert(
            ResourceKind::Materials,
            ThresholdBands { warning: 15, critical: 8, emergency: 3 },
        );
        bands.insert(
            ResourceKind::Medical,
            ThresholdBands { warning: 10, critical: 5, emergency: 2 },
        );
        bands.insert(
            ResourceKind::Fuel,
            ThresholdBands { warning: 15, critical: 8, emergency: 3 },
        );
        bands.insert(
            ResourceKind::Cash,
            ThresholdBands { warning: 50, critical: 25, emergency: 10 },
        );
        Self { bands }
    }
}

// === TRADE ===

/// Fixed per-unit trade values. No supply/demand feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeConfig {
    /// Value of one unit of each kind, in abstract trade points.
    /// Cash is the anchor at 1.0; conversions floor, so round trips
    /// lose value and never invent it.
    pub unit_values: AHashMap<ResourceKind, f64>,
}

impl TradeConfig {
    pub fn unit_value(&self, kind: ResourceKind) -> f64 {
        self.unit_values.get(&kind).copied().unwrap_or(1.0)
    }
}

impl Default for TradeConfig {
    fn default() -> Self {
        let mut unit_values = AHashMap::new();
        unit_values.insert(ResourceKind::Food, 2.0);
        unit_values.insert(ResourceKind::Materials, 1.5);
        unit_values.insert(ResourceKind::Medical, 4.0);
        unit_values.insert(ResourceKind::Fuel, 3.0);
        unit_values.insert(ResourceKind::Cash, 1.0);
        Self { unit_values }
    }
}

// === SATISFACTION ===

/// Satisfaction factor table
///
/// Scores start from `base` and each factor adds or removes a flat delta.
/// The result clamps to [min, max]. Deltas are small on purpose: a tenant
/// needs three or four factors stacked one way before their band moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SatisfactionConfig {
    /// Starting score before factors apply
    pub base: i32,
    /// Floor of the clamped range
    pub min: i32,
    /// Ceiling of the clamped range
    pub max: i32,

    /// Bonus for living in a reinforced room
    pub reinforced_bonus: i32,
    /// Penalty while the room is flagged for repair
    pub needs_repair_penalty: i32,

    /// Defense level at or above which tenants feel protected
    pub defense_high_threshold: i32,
    /// Bonus at or above the high threshold
    pub defense_high_bonus: i32,
    /// Defense level at or below which tenants feel exposed
    pub defense_low_threshold: i32,
    /// Penalty at or below the low threshold
    pub defense_low_penalty: i32,

    /// Pocket food below this counts as going hungry
    pub low_food_cutoff: u64,
    pub low_food_penalty: i32,
    /// Pocket cash above this counts as personal security
    pub high_cash_cutoff: u64,
    pub high_cash_bonus: i32,

    /// Flat bonuses for the global boolean modifiers
    pub emergency_training_bonus: i32,
    pub building_quality_bonus: i32,
    pub patrol_system_bonus: i32,
    pub social_network_bonus: i32,

    /// Harmony bonus per elder in the building
    pub elder_harmony_per: i32,
    /// Elder harmony stops stacking past this total
    pub elder_harmony_cap: i32,

    /// Relationship bonus is `round((avg - 50) * relationship_scale)`.
    /// At 0.2, a universally loved tenant (avg 100) gains +10 and a
    /// universally loathed one (avg 0) loses 10.
    pub relationship_scale: f64,

    /// Scores at or below this are critical (band notifications fire)
    pub critical_level: i32,
    /// Scores at or below this (above critical) are warning
    pub warning_level: i32,
    /// Scores at or below this (above warning) are normal; above is high
    pub normal_level: i32,
}

impl Default for SatisfactionConfig {
    fn default() -> Self {
        Self {
            base: 50,
            min: 0,
            max: 100,

            reinforced_bonus: 3,
            needs_repair_penalty: 5,

            defense_high_threshold: 8,
            defense_high_bonus: 4,
            defense_low_threshold: 2,
            defense_low_penalty: 4,

            low_food_cutoff: 2,
            low_food_penalty: 6,
            high_cash_cutoff: 50,
            high_cash_bonus: 2,

            emergency_training_bonus: 2,
            building_quality_bonus: 3,
            patrol_system_bonus: 2,
            social_network_bonus: 2,

            elder_harmony_per: 1,
            elder_harmony_cap: 3,

            relationship_scale: 0.2,

            critical_level: 20,
            warning_level: 40,
            normal_level: 70,
        }
    }
}

// === CONFLICTS ===

/// Conflict detection and probability tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictConfig {
    /// Tenants below this satisfaction count toward a dispute
    pub satisfaction_threshold: i32,
    /// Food stock below `floor * tenant_count` raises a scarcity conflict
    pub food_floor_per_tenant: u64,
    /// Fuel stock below this flat floor raises a scarcity conflict
    pub fuel_floor: u64,
    /// Relationship affinity below this is hostile
    pub low_affinity_cutoff: i32,
    /// Independent daily chance per hostile pair
    pub interpersonal_chance: f64,
    /// Satisfaction granted to each involved tenant on resolution
    pub resolution_boost: i32,

    /// Gate probability model: p = base
    ///   + tenant_count * per_tenant
    ///   + max(0, 70 - avg_satisfaction) * low_satisfaction_rate
    ///   + scarcity_bonus when any resource sits at warning or worse
    ///   - elder_reduction when at least one elder lives here,
    /// clamped to [0, 1].
    ///
    /// At the defaults, a content block of six tenants with an elder sits
    /// near 0.07 per day; a starving, packed, elderless one approaches 0.5.
    pub base_chance: f64,
    pub per_tenant: f64,
    pub low_satisfaction_rate: f64,
    pub scarcity_bonus: f64,
    pub elder_reduction: f64,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            satisfaction_threshold: 30,
            food_floor_per_tenant: 3,
            fuel_floor: 10,
            low_affinity_cutoff: 20,
            interpersonal_chance: 0.30,
            resolution_boost: 10,

            base_chance: 0.05,
            per_tenant: 0.02,
            low_satisfaction_rate: 0.005,
            scarcity_bonus: 0.15,
            elder_reduction: 0.10,
        }
    }
}

// === EVENTS ===

/// Event scheduler tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Daily gate for the random-event trigger. Conflict events gate on
    /// the conflict probability model; special events always check.
    pub random_event_chance: f64,
    /// Maximum nesting depth of all/any_of condition trees, enforced at
    /// definition load time. Deeper trees are a config error, never an
    /// evaluation error.
    pub max_condition_depth: usize,
    /// Execution history grows to this many records...
    pub execution_history_cap: usize,
    /// ...then is trimmed down to the newest this-many.
    pub execution_history_trim: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            random_event_chance: 0.30,
            max_condition_depth: 8,
            execution_history_cap: 100,
            execution_history_trim: 50,
        }
    }
}

// === DAILY CONSUMPTION ===

/// Per-day resource draw rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumptionConfig {
    /// Food units each present tenant eats per day
    pub food_per_tenant: u64,
    /// Fuel the building burns per day while anyone is home
    pub fuel_base: u64,
    /// Medical units each infected tenant consumes per day
    pub medical_per_infected: u64,
    /// Weight of the newest observation in the smoothed consumption
    /// rate. At 0.3 the rate settles on a new steady level in roughly
    /// a week of days.
    pub rate_smoothing: f64,
    /// Extra food draw for heavy-labor occupations
    pub worker_food_bonus: AHashMap<TenantKind, u64>,
}

impl ConsumptionConfig {
    pub fn food_for(&self, kind: TenantKind) -> u64 {
        self.food_per_tenant + self.worker_food_bonus.get(&kind).copied().unwrap_or(0)
    }
}

impl Default for ConsumptionConfig {
    fn default() -> Self {
        let mut worker_food_bonus = AHashMap::new();
        worker_food_bonus.insert(TenantKind::Soldier, 1);
        worker_food_bonus.insert(TenantKind::Scavenger, 1);
        Self {
            food_per_tenant: 1,
            fuel_base: 2,
            medical_per_infected: 1,
            rate_smoothing: 0.3,
            worker_food_bonus,
        }
    }
}

// === HISTORY BOUNDS ===

/// Caps for the bounded logs. Oldest entries are evicted past the cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub ledger_cap: usize,
    pub transfer_cap: usize,
    pub satisfaction_cap: usize,
    pub conflict_cap: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            ledger_cap: 200,
            transfer_cap: 100,
            satisfaction_cap: 200,
            conflict_cap: 100,
        }
    }
}

impl SimConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file, falling back to defaults for any
    /// omitted section, then validate it.
    pub fn load_from_toml(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SimConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        for kind in ResourceKind::ALL {
            let bands = self.thresholds.bands(kind);
            if bands.warning == 0 {
                return Err(CoreError::Config(format!(
                    "{} warning cutoff must be positive",
                    kind
                )));
            }
            if bands.emergency > bands.critical || bands.critical > bands.warning {
                return Err(CoreError::Config(format!(
                    "{} cutoffs must satisfy emergency <= critical <= warning (got {} / {} / {})",
                    kind, bands.emergency, bands.critical, bands.warning
                )));
            }
            let unit = self.trade.unit_value(kind);
            if !unit.is_finite() || unit <= 0.0 {
                return Err(CoreError::Config(format!(
                    "{} unit value must be positive and finite (got {})",
                    kind, unit
                )));
            }
        }

        if self.satisfaction.min >= self.satisfaction.max {
            return Err(CoreError::Config(format!(
                "satisfaction min ({}) must be < max ({})",
                self.satisfaction.min, self.satisfaction.max
            )));
        }
        if self.satisfaction.base < self.satisfaction.min
            || self.satisfaction.base > self.satisfaction.max
        {
            return Err(CoreError::Config(format!(
                "satisfaction base ({}) must sit inside [{}, {}]",
                self.satisfaction.base, self.satisfaction.min, self.satisfaction.max
            )));
        }
        if !(self.satisfaction.critical_level < self.satisfaction.warning_level
            && self.satisfaction.warning_level < self.satisfaction.normal_level)
        {
            return Err(CoreError::Config(
                "satisfaction levels must satisfy critical < warning < normal".into(),
            ));
        }

        for (name, chance) in [
            ("random_event_chance", self.events.random_event_chance),
            ("interpersonal_chance", self.conflict.interpersonal_chance),
            ("conflict base_chance", self.conflict.base_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(CoreError::Config(format!(
                    "{} ({}) must be within [0, 1]",
                    name, chance
                )));
            }
        }

        if self.events.max_condition_depth == 0 {
            return Err(CoreError::Config(
                "max_condition_depth must be at least 1".into(),
            ));
        }
        if self.events.execution_history_trim >= self.events.execution_history_cap {
            return Err(CoreError::Config(format!(
                "execution_history_trim ({}) must be < execution_history_cap ({})",
                self.events.execution_history_trim, self.events.execution_history_cap
            )));
        }

        if !(0.0 < self.consumption.rate_smoothing && self.consumption.rate_smoothing <= 1.0) {
            return Err(CoreError::Config(format!(
                "rate_smoothing ({}) must be within (0, 1]",
                self.consumption.rate_smoothing
            )));
        }

        if self.history.ledger_cap == 0 || self.history.conflict_cap == 0 {
            return Err(CoreError::Config("history caps must be positive".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok(), "defaults must be consistent");
    }

    #[test]
    fn test_every_kind_has_bands_and_value() {
        let config = SimConfig::default();
        for kind in ResourceKind::ALL {
            assert!(config.thresholds.bands.contains_key(&kind), "missing bands for {}", kind);
            assert!(config.trade.unit_values.contains_key(&kind), "missing value for {}", kind);
        }
    }

    #[test]
    fn test_validate_rejects_unordered_cutoffs() {
        let mut config = SimConfig::default();
        config.thresholds.bands.insert(
            ResourceKind::Food,
            ThresholdBands { warning: 5, critical: 10, emergency: 2 },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_chance() {
        let mut config = SimConfig::default();
        config.events.random_event_chance = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_history_bounds() {
        let mut config = SimConfig::default();
        config.events.execution_history_trim = 200;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_partial_toml() {
        let content = r#"
[events]
random_event_chance = 0.5

[satisfaction]
base = 40
"#;
        let config: SimConfig = toml::from_str(content).expect("partial config should parse");
        assert_eq!(config.events.random_event_chance, 0.5);
        assert_eq!(config.satisfaction.base, 40);
        // Omitted sections fall back to defaults
        assert_eq!(config.conflict.resolution_boost, 10);
        assert_eq!(config.thresholds.bands(ResourceKind::Food).warning, 20);
    }
}
