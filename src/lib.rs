//! Blockwarden - tenement survival simulation core

pub mod core;
pub mod economy;
pub mod events;
pub mod sim;
pub mod tenancy;
pub mod world;
