//! Tenant satisfaction scoring
//!
//! Scores start from the configured base and move by flat per-factor
//! deltas (room condition, pocket adequacy, building defense, global
//! modifiers, elder harmony, relationships), then clamp to the configured
//! range. Recomputed for every tenant each day and on demand after a
//! relevant state change.

use std::collections::VecDeque;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::{SatisfactionConfig, SimConfig};
use crate::core::notify::NotificationSink;
use crate::core::types::{Day, ResourceKind, TenantFilter, TenantId, TenantKind};
use crate::world::state::WorldState;

/// Satisfaction band, worst first. Greater is happier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SatisfactionBand {
    Critical,
    Warning,
    Normal,
    High,
}

/// Band a score using the configured level table, lowest first
pub fn band(score: i32, config: &SatisfactionConfig) -> SatisfactionBand {
    if score <= config.critical_level {
        SatisfactionBand::Critical
    } else if score <= config.warning_level {
        SatisfactionBand::Warning
    } else if score <= config.normal_level {
        SatisfactionBand::Normal
    } else {
        SatisfactionBand::High
    }
}

/// One applied score change of at least a point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatisfactionChange {
    pub tenant: TenantId,
    pub day: Day,
    pub old: i32,
    pub new: i32,
    pub reason: String,
}

/// Scores per tenant plus the bounded change log
#[derive(Debug, Clone)]
pub struct SatisfactionBook {
    scores: AHashMap<TenantId, i32>,
    history: VecDeque<SatisfactionChange>,
    history_cap: usize,
}

impl SatisfactionBook {
    pub fn new(history_cap: usize) -> Self {
        Self {
            scores: AHashMap::new(),
            history: VecDeque::new(),
            history_cap,
        }
    }

    /// Register a tenant at a starting score. No history entry.
    pub fn insert(&mut self, tenant: TenantId, score: i32) {
        self.scores.insert(tenant, score);
    }

    pub fn remove(&mut self, tenant: TenantId) {
        self.scores.remove(&tenant);
    }

    pub fn score(&self, tenant: TenantId) -> Option<i32> {
        self.scores.get(&tenant).copied()
    }

    pub fn average(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        let total: i64 = self.scores.values().map(|s| *s as i64).sum();
        Some(total as f64 / self.scores.len() as f64)
    }

    /// Tenants strictly below a threshold, sorted by id
    pub fn below(&self, threshold: i32) -> Vec<TenantId> {
        let mut ids: Vec<TenantId> = self
            .scores
            .iter()
            .filter(|(_, score)| **score < threshold)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Every tracked score, sorted by id
    pub fn all_scores(&self) -> Vec<(TenantId, i32)> {
        let mut scores: Vec<_> = self.scores.iter().map(|(id, s)| (*id, *s)).collect();
        scores.sort_by_key(|(id, _)| *id);
        scores
    }

    pub fn changes(&self) -> impl Iterator<Item = &SatisfactionChange> {
        self.history.iter()
    }

    pub fn changes_len(&self) -> usize {
        self.history.len()
    }

    /// Write a new score for a tracked tenant. Appends a change record
    /// when the score moved by at least a point, and raises a sink alert
    /// when the band worsened into warning or critical.
    pub fn apply(
        &mut self,
        tenant: TenantId,
        new: i32,
        day: Day,
        reason: &str,
        config: &SatisfactionConfig,
        sink: &mut dyn NotificationSink,
    ) {
        let old = self.scores.get(&tenant).copied().unwrap_or(config.base);
        self.scores.insert(tenant, new);

        if (new - old).abs() >= 1 {
            self.history.push_back(SatisfactionChange {
                tenant,
                day,
                old,
                new,
                reason: reason.to_string(),
            });
            while self.history.len() > self.history_cap {
                self.history.pop_front();
            }
        }

        let old_band = band(old, config);
        let new_band = band(new, config);
        if new_band < old_band
            && matches!(new_band, SatisfactionBand::Critical | SatisfactionBand::Warning)
        {
            sink.satisfaction_alert(tenant, old_band, new_band, new);
        }
    }

    /// Shift a tracked tenant's score by a delta, clamped to the
    /// configured range. No-op None for untracked tenants.
    pub fn boost(
        &mut self,
        tenant: TenantId,
        delta: i32,
        day: Day,
        reason: &str,
        config: &SatisfactionConfig,
        sink: &mut dyn NotificationSink,
    ) -> Option<i32> {
        let old = self.scores.get(&tenant).copied()?;
        let new = (old + delta).clamp(config.min, config.max);
        self.apply(tenant, new, day, reason, config, sink);
        Some(new)
    }
}

/// Recompute one tenant's satisfaction from the factor table.
///
/// Returns the clamped score, or None for a tenant the registry does not
/// know. Reads room state via the tenant's own room assignment.
pub fn recompute(
    world: &mut WorldState,
    tenant_id: TenantId,
    reason: &str,
    config: &SimConfig,
    sink: &mut dyn NotificationSink,
) -> Option<i32> {
    let sat = &config.satisfaction;

    let (pocket_food, pocket_cash, room_id) = {
        let tenant = world.tenants.get(tenant_id)?;
        (
            tenant.pocket.get(ResourceKind::Food),
            tenant.pocket.get(ResourceKind::Cash),
            tenant.room,
        )
    };

    let mut score = sat.base;

    if let Some(room) = room_id.and_then(|id| world.building.room(id)) {
        if room.reinforced {
            score += sat.reinforced_bonus;
        }
        if room.needs_repair {
            score -= sat.needs_repair_penalty;
        }
    }

    let defense = world.building.defense_level;
    if defense >= sat.defense_high_threshold {
        score += sat.defense_high_bonus;
    } else if defense <= sat.defense_low_threshold {
        score -= sat.defense_low_penalty;
    }

    if pocket_food < sat.low_food_cutoff {
        score -= sat.low_food_penalty;
    }
    if pocket_cash > sat.high_cash_cutoff {
        score += sat.high_cash_bonus;
    }

    if world.flags.emergency_training {
        score += sat.emergency_training_bonus;
    }
    if world.flags.building_quality {
        score += sat.building_quality_bonus;
    }
    if world.flags.patrol_system {
        score += sat.patrol_system_bonus;
    }
    if world.flags.social_network {
        score += sat.social_network_bonus;
    }

    let elders = world
        .tenants
        .count_matching(TenantFilter::Kind(TenantKind::Elder)) as i32;
    score += (elders * sat.elder_harmony_per).min(sat.elder_harmony_cap);

    if let Some(avg) = world.relationships.average_for(tenant_id) {
        score += ((avg - 50.0) * sat.relationship_scale).round() as i32;
    }

    let new = score.clamp(sat.min, sat.max);
    let day = world.day;
    world.satisfaction.apply(tenant_id, new, day, reason, sat, sink);
    Some(new)
}

/// Recompute every tenant, in hire order. Returns how many were updated.
pub fn recompute_all(
    world: &mut WorldState,
    reason: &str,
    config: &SimConfig,
    sink: &mut dyn NotificationSink,
) -> usize {
    let ids = world.tenants.ids();
    let mut updated = 0;
    for id in ids {
        if recompute(world, id, reason, config, sink).is_some() {
            updated += 1;
        }
    }
    updated
}
