//! Conflict detection and resolution
//!
//! Three independent daily checks (satisfaction dispute, resource
//! scarcity, interpersonal) feed a bounded conflict log. The gate
//! probability for configured conflict events is a pure function of
//! current world state, recomputed fresh each call.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{ConflictConfig, SimConfig};
use crate::core::notify::NotificationSink;
use crate::core::types::{ConflictId, Day, ResourceKind, TenantId};
use crate::world::state::WorldState;

// ---------- Constants - severity ----------

/// Scarcity conflicts land mid-scale; the shortage itself escalates
/// through repeat raises, not through severity
const SCARCITY_SEVERITY: u8 = 3;
/// Personal feuds start small
const INTERPERSONAL_SEVERITY: u8 = 2;

/// What kind of trouble this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    SatisfactionDispute,
    ResourceScarcity,
    Interpersonal,
}

/// One raised conflict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictEvent {
    pub id: ConflictId,
    pub kind: ConflictKind,
    pub involved: Vec<TenantId>,
    /// 1 (grumbling) ..= 5 (fists)
    pub severity: u8,
    pub day: Day,
    pub resolved: bool,
}

/// Bounded conflict history with id handout
#[derive(Debug, Clone)]
pub struct ConflictLog {
    conflicts: VecDeque<ConflictEvent>,
    next_id: u32,
    cap: usize,
}

impl ConflictLog {
    pub fn new(cap: usize) -> Self {
        Self {
            conflicts: VecDeque::new(),
            next_id: 1,
            cap,
        }
    }

    pub fn push(
        &mut self,
        kind: ConflictKind,
        involved: Vec<TenantId>,
        severity: u8,
        day: Day,
    ) -> ConflictId {
        let id = ConflictId(self.next_id);
        self.next_id += 1;
        self.conflicts.push_back(ConflictEvent {
            id,
            kind,
            involved,
            severity: severity.clamp(1, 5),
            day,
            resolved: false,
        });
        while self.conflicts.len() > self.cap {
            self.conflicts.pop_front();
        }
        id
    }

    pub fn get(&self, id: ConflictId) -> Option<&ConflictEvent> {
        self.conflicts.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: ConflictId) -> Option<&mut ConflictEvent> {
        self.conflicts.iter_mut().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConflictEvent> {
        self.conflicts.iter()
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &ConflictEvent> {
        self.conflicts.iter().filter(|c| !c.resolved)
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Gate probability for configured conflict events.
///
/// `p = base + tenants * per_tenant
///     + max(0, 70 - avg_satisfaction) * low_satisfaction_rate
///     + scarcity_bonus if any stock is scarce
///     - elder_reduction if an elder lives here`, clamped to [0, 1].
pub fn conflict_probability(
    tenant_count: usize,
    avg_satisfaction: f64,
    resource_scarce: bool,
    elder_present: bool,
    config: &ConflictConfig,
) -> f64 {
    let mut p = config.base_chance + tenant_count as f64 * config.per_tenant;
    p += (70.0 - avg_satisfaction).max(0.0) * config.low_satisfaction_rate;
    if resource_scarce {
        p += config.scarcity_bonus;
    }
    if elder_present {
        p -= config.elder_reduction;
    }
    p.clamp(0.0, 1.0)
}

/// Run the three daily checks and log whatever they raise.
///
/// (a) two or more tenants below the dispute threshold -> one dispute
/// involving all of them, severity scaled by headcount;
/// (b) food below the per-tenant floor or fuel below the flat floor ->
/// a scarcity conflict naming the first two present tenants;
/// (c) each hostile relationship pair rolls independently per day.
pub fn run_daily_checks(
    world: &mut WorldState,
    config: &SimConfig,
    sink: &mut dyn NotificationSink,
) -> Vec<ConflictId> {
    let mut raised = Vec::new();
    let day = world.day;

    let low = world
        .satisfaction
        .below(config.conflict.satisfaction_threshold);
    if low.len() >= 2 {
        let severity = (low.len() / 2 + 1).clamp(1, 5) as u8;
        let id = world
            .conflicts
            .push(ConflictKind::SatisfactionDispute, low, severity, day);
        raised.push(id);
    }

    let present = world.tenants.present_count() as u64;
    if present > 0 {
        let food = world.ledger.amount(ResourceKind::Food);
        let fuel = world.ledger.amount(ResourceKind::Fuel);
        let food_floor = config.conflict.food_floor_per_tenant * present;
        if food < food_floor || fuel < config.conflict.fuel_floor {
            let involved: Vec<TenantId> =
                world.tenants.present().take(2).map(|t| t.id).collect();
            let id = world.conflicts.push(
                ConflictKind::ResourceScarcity,
                involved,
                SCARCITY_SEVERITY,
                day,
            );
            raised.push(id);
        }
    }

    for ((a, b), _) in world
        .relationships
        .pairs_below(config.conflict.low_affinity_cutoff)
    {
        let roll: f64 = world.rng.gen();
        if roll < config.conflict.interpersonal_chance {
            let id = world.conflicts.push(
                ConflictKind::Interpersonal,
                vec![a, b],
                INTERPERSONAL_SEVERITY,
                day,
            );
            raised.push(id);
        }
    }

    for id in &raised {
        if let Some(conflict) = world.conflicts.get(*id) {
            sink.conflict_raised(conflict);
        }
    }
    raised
}

/// Mark a conflict resolved and grant each involved tenant the
/// configured satisfaction boost. False when the conflict is unknown
/// or already resolved.
pub fn resolve_conflict(
    world: &mut WorldState,
    conflict_id: ConflictId,
    config: &SimConfig,
    sink: &mut dyn NotificationSink,
) -> bool {
    let involved = match world.conflicts.get_mut(conflict_id) {
        Some(conflict) if !conflict.resolved => {
            conflict.resolved = true;
            conflict.involved.clone()
        }
        _ => return false,
    };

    let day = world.day;
    for tenant in involved {
        // Evicted tenants just drop out of the boost
        world.satisfaction.boost(
            tenant,
            config.conflict.resolution_boost,
            day,
            "conflict resolved",
            &config.satisfaction,
            sink,
        );
    }
    tracing::debug!("conflict {:?} resolved", conflict_id);
    true
}
