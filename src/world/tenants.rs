//! Tenants and the registry that owns their lifecycle

use serde::{Deserialize, Serialize};

use crate::core::types::{RoomId, TenantFilter, TenantId, TenantKind};
use crate::economy::ledger::ResourceStore;

/// One resident of the block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub kind: TenantKind,
    pub infected: bool,
    /// Away on an assignment; absent tenants don't eat, don't count,
    /// and can't be targeted by effects
    pub on_mission: bool,
    pub pocket: ResourceStore,
    pub room: Option<RoomId>,
}

impl Tenant {
    pub fn is_present(&self) -> bool {
        !self.on_mission
    }

    /// Does this tenant match a selector? Absent tenants never match.
    pub fn matches(&self, filter: TenantFilter) -> bool {
        if !self.is_present() {
            return false;
        }
        match filter {
            TenantFilter::Any => true,
            TenantFilter::Infected => self.infected,
            TenantFilter::Kind(kind) => self.kind == kind,
        }
    }
}

/// Owns all tenants; hire and evict go through here
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantRegistry {
    tenants: Vec<Tenant>,
    next_tenant_id: u32,
}

impl TenantRegistry {
    pub fn new() -> Self {
        Self {
            tenants: Vec::new(),
            next_tenant_id: 1,
        }
    }

    pub fn hire(&mut self, name: &str, kind: TenantKind) -> TenantId {
        let id = TenantId(self.next_tenant_id);
        self.next_tenant_id += 1;
        self.tenants.push(Tenant {
            id,
            name: name.to_string(),
            kind,
            infected: false,
            on_mission: false,
            pocket: ResourceStore::new(),
            room: None,
        });
        id
    }

    /// Remove a tenant entirely, returning them if they existed
    pub fn evict(&mut self, id: TenantId) -> Option<Tenant> {
        let index = self.tenants.iter().position(|t| t.id == id)?;
        Some(self.tenants.remove(index))
    }

    pub fn get(&self, id: TenantId) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: TenantId) -> Option<&mut Tenant> {
        self.tenants.iter_mut().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tenant> {
        self.tenants.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tenant> {
        self.tenants.iter_mut()
    }

    /// Tenants currently in the building
    pub fn present(&self) -> impl Iterator<Item = &Tenant> {
        self.tenants.iter().filter(|t| t.is_present())
    }

    pub fn present_count(&self) -> usize {
        self.present().count()
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }

    pub fn ids(&self) -> Vec<TenantId> {
        self.tenants.iter().map(|t| t.id).collect()
    }

    pub fn count_matching(&self, filter: TenantFilter) -> usize {
        self.tenants.iter().filter(|t| t.matches(filter)).count()
    }

    /// First tenant matching a selector, in hire order
    pub fn first_matching(&self, filter: TenantFilter) -> Option<TenantId> {
        self.tenants.iter().find(|t| t.matches(filter)).map(|t| t.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ResourceKind;

    #[test]
    fn test_hire_assigns_sequential_ids() {
        let mut registry = TenantRegistry::new();
        let a = registry.hire("Anya", TenantKind::Worker);
        let b = registry.hire("Boris", TenantKind::Soldier);
        assert_eq!(a, TenantId(1));
        assert_eq!(b, TenantId(2));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_evict_removes_tenant() {
        let mut registry = TenantRegistry::new();
        let a = registry.hire("Anya", TenantKind::Worker);
        let evicted = registry.evict(a);
        assert_eq!(evicted.unwrap().name, "Anya");
        assert!(registry.get(a).is_none());
        assert!(registry.evict(a).is_none(), "second evict is a no-op");
    }

    #[test]
    fn test_ids_stay_unique_after_evict() {
        let mut registry = TenantRegistry::new();
        let a = registry.hire("Anya", TenantKind::Worker);
        registry.evict(a);
        let b = registry.hire("Boris", TenantKind::Worker);
        assert_ne!(a, b, "evicted ids are never reused");
    }

    #[test]
    fn test_count_matching_filters() {
        let mut registry = TenantRegistry::new();
        registry.hire("Anya", TenantKind::Worker);
        let b = registry.hire("Boris", TenantKind::Soldier);
        let c = registry.hire("Clara", TenantKind::Doctor);
        registry.get_mut(c).unwrap().infected = true;

        assert_eq!(registry.count_matching(TenantFilter::Any), 3);
        assert_eq!(registry.count_matching(TenantFilter::Infected), 1);
        assert_eq!(
            registry.count_matching(TenantFilter::Kind(TenantKind::Soldier)),
            1
        );

        // Away tenants drop out of every count
        registry.get_mut(b).unwrap().on_mission = true;
        assert_eq!(registry.count_matching(TenantFilter::Any), 2);
        assert_eq!(
            registry.count_matching(TenantFilter::Kind(TenantKind::Soldier)),
            0
        );
    }

    #[test]
    fn test_first_matching_in_hire_order() {
        let mut registry = TenantRegistry::new();
        let a = registry.hire("Anya", TenantKind::Worker);
        let b = registry.hire("Boris", TenantKind::Worker);
        registry.get_mut(a).unwrap().infected = true;
        registry.get_mut(b).unwrap().infected = true;

        assert_eq!(registry.first_matching(TenantFilter::Infected), Some(a));
    }

    #[test]
    fn test_pocket_starts_empty() {
        let mut registry = TenantRegistry::new();
        let a = registry.hire("Anya", TenantKind::Worker);
        assert_eq!(registry.get(a).unwrap().pocket.get(ResourceKind::Food), 0);
    }
}
