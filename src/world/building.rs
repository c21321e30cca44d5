//! Building state - defense level and rooms

use serde::{Deserialize, Serialize};

use crate::core::types::{RoomId, TenantId};

/// Defense level ceiling; effects clamp to 0..=MAX_DEFENSE
pub const MAX_DEFENSE: i32 = 10;

/// One room in the block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub reinforced: bool,
    pub needs_repair: bool,
    pub occupant: Option<TenantId>,
}

/// The tenement itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingState {
    /// 0 = open doors, MAX_DEFENSE = fortress
    pub defense_level: i32,
    pub rooms: Vec<Room>,
    next_room_id: u32,
}

impl BuildingState {
    pub fn new(room_count: usize) -> Self {
        let mut building = Self {
            defense_level: 3,
            rooms: Vec::new(),
            next_room_id: 1,
        };
        for _ in 0..room_count {
            building.add_room();
        }
        building
    }

    pub fn add_room(&mut self) -> RoomId {
        let id = RoomId(self.next_room_id);
        self.next_room_id += 1;
        self.rooms.push(Room {
            id,
            reinforced: false,
            needs_repair: false,
            occupant: None,
        });
        id
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.id == id)
    }

    /// First unoccupied room, if any
    pub fn vacant_room(&self) -> Option<RoomId> {
        self.rooms.iter().find(|r| r.occupant.is_none()).map(|r| r.id)
    }

    /// Rooms a damage effect may hit (not already flagged for repair)
    pub fn damageable_rooms(&self) -> Vec<RoomId> {
        self.rooms
            .iter()
            .filter(|r| !r.needs_repair)
            .map(|r| r.id)
            .collect()
    }

    /// The room a tenant lives in
    pub fn room_of(&self, tenant: TenantId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.occupant == Some(tenant))
    }

    pub fn set_defense(&mut self, level: i32) {
        self.defense_level = level.clamp(0, MAX_DEFENSE);
    }

    pub fn adjust_defense(&mut self, delta: i32) {
        self.set_defense(self.defense_level + delta);
    }
}
