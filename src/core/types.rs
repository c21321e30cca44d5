//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation day counter (turn unit)
pub type Day = u64;

/// Unique identifier for tenants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub u32);

impl TenantId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Unique identifier for rooms in the building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub u32);

impl RoomId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Unique identifier for conflict events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictId(pub u32);

impl ConflictId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// The five stockpiled resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Food,
    Materials,
    Medical,
    Fuel,
    Cash,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Food,
        ResourceKind::Materials,
        ResourceKind::Medical,
        ResourceKind::Fuel,
        ResourceKind::Cash,
    ];

    /// Config key / display name (lowercase)
    pub fn key(&self) -> &'static str {
        match self {
            ResourceKind::Food => "food",
            ResourceKind::Materials => "materials",
            ResourceKind::Medical => "medical",
            ResourceKind::Fuel => "fuel",
            ResourceKind::Cash => "cash",
        }
    }

    /// Parse a config key, case-insensitive
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "food" => Some(ResourceKind::Food),
            "materials" => Some(ResourceKind::Materials),
            "medical" => Some(ResourceKind::Medical),
            "fuel" => Some(ResourceKind::Fuel),
            "cash" => Some(ResourceKind::Cash),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Tenant occupation enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantKind {
    Worker,
    Soldier,
    Doctor,
    Elder,
    Scavenger,
}

impl TenantKind {
    pub const ALL: [TenantKind; 5] = [
        TenantKind::Worker,
        TenantKind::Soldier,
        TenantKind::Doctor,
        TenantKind::Elder,
        TenantKind::Scavenger,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            TenantKind::Worker => "worker",
            TenantKind::Soldier => "soldier",
            TenantKind::Doctor => "doctor",
            TenantKind::Elder => "elder",
            TenantKind::Scavenger => "scavenger",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "worker" => Some(TenantKind::Worker),
            "soldier" => Some(TenantKind::Soldier),
            "doctor" => Some(TenantKind::Doctor),
            "elder" => Some(TenantKind::Elder),
            "scavenger" => Some(TenantKind::Scavenger),
            _ => None,
        }
    }
}

impl std::fmt::Display for TenantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Tenant selector used by conditions and effect targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantFilter {
    /// Any tenant currently in the building
    Any,
    /// Any tenant with the infection flag set
    Infected,
    /// Tenants of one occupation
    Kind(TenantKind),
}

impl TenantFilter {
    /// Parse a config key: "any", "infected", or an occupation name
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "any" => Some(TenantFilter::Any),
            "infected" => Some(TenantFilter::Infected),
            other => TenantKind::from_key(other).map(TenantFilter::Kind),
        }
    }
}
