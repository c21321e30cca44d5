//! Building, tenants, and the mutable world state

pub mod building;
pub mod state;
pub mod tenants;

pub use building::{BuildingState, Room};
pub use state::{GlobalFlag, GlobalModifiers, StatePath, WorldState};
pub use tenants::{Tenant, TenantRegistry};
