//! Typed condition trees evaluated against world state
//!
//! Conditions gate event triggers and choice availability. The enum is
//! closed: kinds the loader does not recognize survive as
//! [`Condition::Unknown`] and evaluate to false, so one bad definition
//! disables its own branch and nothing else. Evaluation itself never
//! fails and never mutates anything except the world RNG.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimConfig;
use crate::core::types::{Day, ResourceKind, TenantFilter};
use crate::world::state::WorldState;

/// How bare a stockpile must be before a scarcity condition holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScarcityLevel {
    /// Stock below the warning cutoff
    Insufficient,
    /// Stock below half the warning cutoff
    Critical,
}

impl ScarcityLevel {
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "insufficient" => Some(ScarcityLevel::Insufficient),
            "critical" => Some(ScarcityLevel::Critical),
            _ => None,
        }
    }
}

/// One node of a condition tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Ledger stock at or above an amount
    HasResource { resource: ResourceKind, amount: u64 },
    /// Current day inside an inclusive range; an open end always passes
    DayRange { min: Option<Day>, max: Option<Day> },
    /// At least `count` present tenants match the filter
    HasTenantKind { filter: TenantFilter, count: usize },
    /// Stateless Bernoulli draw, re-rolled on every evaluation
    Probability { chance: f64 },
    /// Stock below a threshold-derived cutoff
    ResourceScarcity {
        resource: ResourceKind,
        level: ScarcityLevel,
    },
    /// Every child holds (an empty list holds)
    All { conditions: Vec<Condition> },
    /// At least one child holds (an empty list fails)
    AnyOf { conditions: Vec<Condition> },
    /// Unrecognized kind, preserved from the definition file
    Unknown { kind: String },
}

/// Evaluate one condition. Unknown kinds log and read as false.
pub fn evaluate(condition: &Condition, world: &mut WorldState, config: &SimConfig) -> bool {
    match condition {
        Condition::HasResource { resource, amount } => world.ledger.amount(*resource) >= *amount,
        Condition::DayRange { min, max } => {
            min.map_or(true, |lo| world.day >= lo) && max.map_or(true, |hi| world.day <= hi)
        }
        Condition::HasTenantKind { filter, count } => {
            world.tenants.count_matching(*filter) >= *count
        }
        Condition::Probability { chance } => world.rng.gen::<f64>() < *chance,
        Condition::ResourceScarcity { resource, level } => {
            let warning = config.thresholds.bands(*resource).warning;
            let cutoff = match level {
                ScarcityLevel::Insufficient => warning,
                ScarcityLevel::Critical => warning / 2,
            };
            world.ledger.amount(*resource) < cutoff
        }
        Condition::All { conditions } => conditions.iter().all(|c| evaluate(c, world, config)),
        Condition::AnyOf { conditions } => conditions.iter().any(|c| evaluate(c, world, config)),
        Condition::Unknown { kind } => {
            tracing::warn!("unknown condition kind '{}', treating as false", kind);
            false
        }
    }
}

/// Conjunction over a condition list. An empty list always holds.
pub fn evaluate_all(conditions: &[Condition], world: &mut WorldState, config: &SimConfig) -> bool {
    conditions.iter().all(|c| evaluate(c, world, config))
}

/// Nesting depth of a condition tree. Leaves are depth 1; `All` and
/// `AnyOf` add a level. The loader rejects definitions deeper than
/// `config.events.max_condition_depth`; evaluation never checks.
pub fn condition_depth(condition: &Condition) -> usize {
    match condition {
        Condition::All { conditions } | Condition::AnyOf { conditions } => {
            1 + conditions.iter().map(condition_depth).max().unwrap_or(0)
        }
        _ => 1,
    }
}
