//! Tenant layer - satisfaction scoring, relationships, conflicts

pub mod conflict;
pub mod relationships;
pub mod satisfaction;

pub use conflict::{
    conflict_probability, resolve_conflict, run_daily_checks, ConflictEvent, ConflictKind,
    ConflictLog,
};
pub use relationships::RelationshipBook;
pub use satisfaction::{
    band, recompute, recompute_all, SatisfactionBand, SatisfactionBook, SatisfactionChange,
};
