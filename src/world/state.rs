//! WorldState - the single owned state container
//!
//! Everything the simulation mutates lives here as a typed field and is
//! passed explicitly (`&mut WorldState`) to whichever system holds the
//! tick. The RNG is part of the world so seeded runs replay exactly.

use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimConfig;
use crate::core::notify::NotificationSink;
use crate::core::types::{Day, ResourceKind, TenantId, TenantKind};
use crate::economy::ledger::{transfer_resources, Party, ResourceLedger};
use crate::economy::scarcity::{analyze_scarcity, ConsumptionStats, ScarcityReport};
use crate::economy::thresholds::StockSeverity;
use crate::tenancy::conflict::ConflictLog;
use crate::tenancy::relationships::RelationshipBook;
use crate::tenancy::satisfaction::SatisfactionBook;
use crate::world::building::BuildingState;
use crate::world::tenants::TenantRegistry;

/// Block-wide boolean modifiers that events toggle
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalModifiers {
    pub emergency_training: bool,
    pub building_quality: bool,
    pub patrol_system: bool,
    pub social_network: bool,
}

/// One global flag, addressable from event definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalFlag {
    EmergencyTraining,
    BuildingQuality,
    PatrolSystem,
    SocialNetwork,
}

impl GlobalFlag {
    pub fn key(&self) -> &'static str {
        match self {
            GlobalFlag::EmergencyTraining => "emergency_training",
            GlobalFlag::BuildingQuality => "building_quality",
            GlobalFlag::PatrolSystem => "patrol_system",
            GlobalFlag::SocialNetwork => "social_network",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "emergency_training" => Some(GlobalFlag::EmergencyTraining),
            "building_quality" => Some(GlobalFlag::BuildingQuality),
            "patrol_system" => Some(GlobalFlag::PatrolSystem),
            "social_network" => Some(GlobalFlag::SocialNetwork),
            _ => None,
        }
    }
}

impl GlobalModifiers {
    pub fn get(&self, flag: GlobalFlag) -> bool {
        match flag {
            GlobalFlag::EmergencyTraining => self.emergency_training,
            GlobalFlag::BuildingQuality => self.building_quality,
            GlobalFlag::PatrolSystem => self.patrol_system,
            GlobalFlag::SocialNetwork => self.social_network,
        }
    }

    pub fn set(&mut self, flag: GlobalFlag, on: bool) {
        match flag {
            GlobalFlag::EmergencyTraining => self.emergency_training = on,
            GlobalFlag::BuildingQuality => self.building_quality = on,
            GlobalFlag::PatrolSystem => self.patrol_system = on,
            GlobalFlag::SocialNetwork => self.social_network = on,
        }
    }
}

/// Typed target for state-mutation effects. Config files address
/// these by dotted string paths; the closed set is everything events
/// are allowed to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatePath {
    BuildingDefense,
    Flag(GlobalFlag),
}

impl StatePath {
    /// Parse a dotted config path like "building.defense" or
    /// "modifiers.patrol_system"
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "building.defense" => Some(StatePath::BuildingDefense),
            other => other
                .strip_prefix("modifiers.")
                .and_then(GlobalFlag::from_key)
                .map(StatePath::Flag),
        }
    }
}

/// The whole mutable world
pub struct WorldState {
    /// Current simulation day
    pub day: Day,
    pub ledger: ResourceLedger,
    pub tenants: TenantRegistry,
    pub building: BuildingState,
    pub flags: GlobalModifiers,
    pub satisfaction: SatisfactionBook,
    pub relationships: RelationshipBook,
    pub conflicts: ConflictLog,
    pub consumption: ConsumptionStats,
    /// Random number generator (deterministic)
    pub rng: ChaCha8Rng,
}

impl WorldState {
    pub fn new(seed: u64, config: &SimConfig) -> Self {
        Self {
            day: 0,
            ledger: ResourceLedger::new(config),
            tenants: TenantRegistry::new(),
            building: BuildingState::new(0),
            flags: GlobalModifiers::default(),
            satisfaction: SatisfactionBook::new(config.history.satisfaction_cap),
            relationships: RelationshipBook::new(),
            conflicts: ConflictLog::new(config.history.conflict_cap),
            consumption: ConsumptionStats::new(config.consumption.rate_smoothing),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Hire a tenant: registry entry, first vacant room, one seeded
    /// relationship per existing tenant, base satisfaction.
    pub fn hire_tenant(&mut self, name: &str, kind: TenantKind, config: &SimConfig) -> TenantId {
        let existing = self.tenants.ids();
        let id = self.tenants.hire(name, kind);

        if let Some(room_id) = self.building.vacant_room() {
            if let Some(room) = self.building.room_mut(room_id) {
                room.occupant = Some(id);
            }
            if let Some(tenant) = self.tenants.get_mut(id) {
                tenant.room = Some(room_id);
            }
        }

        self.relationships
            .seed_for_new_tenant(id, &existing, &mut self.rng);
        self.satisfaction.insert(id, config.satisfaction.base);
        id
    }

    /// Remove a tenant and every trace that should go with them.
    /// Conflict history keeps their id; it is a record, not a reference.
    pub fn evict_tenant(&mut self, id: TenantId) -> bool {
        let Some(tenant) = self.tenants.evict(id) else {
            return false;
        };
        if let Some(room_id) = tenant.room {
            if let Some(room) = self.building.room_mut(room_id) {
                room.occupant = None;
            }
        }
        self.relationships.remove_tenant(id);
        self.satisfaction.remove(id);
        true
    }

    /// Bookkeeping ledger write stamped with the current day
    pub fn modify_resource(
        &mut self,
        kind: ResourceKind,
        delta: i64,
        reason: &str,
        source: &str,
        sink: &mut dyn NotificationSink,
    ) -> bool {
        let day = self.day;
        self.ledger.modify(kind, delta, reason, source, day, sink)
    }

    /// Current stock and severity band for one kind
    pub fn resource_status(&self, kind: ResourceKind) -> (u64, StockSeverity) {
        self.ledger.status(kind)
    }

    /// On-demand scarcity picture for one kind
    pub fn scarcity_report(&self, kind: ResourceKind, config: &SimConfig) -> ScarcityReport {
        analyze_scarcity(
            kind,
            self.ledger.amount(kind),
            &self.consumption,
            config.thresholds.bands(kind),
        )
    }

    /// All-or-nothing transfer stamped with the current day
    pub fn transfer(
        &mut self,
        from: Party,
        to: Party,
        bundle: &[(ResourceKind, u64)],
        reason: &str,
        sink: &mut dyn NotificationSink,
    ) -> bool {
        let day = self.day;
        transfer_resources(
            &mut self.ledger,
            &mut self.tenants,
            from,
            to,
            bundle,
            reason,
            day,
            sink,
        )
    }

    /// True when any stock sits at warning or worse
    pub fn any_resource_scarce(&self) -> bool {
        ResourceKind::ALL
            .iter()
            .any(|kind| self.ledger.status(*kind).1.is_alarming())
    }
}
