//! Event engine - conditions, effects, definitions, scheduling

pub mod condition;
pub mod definitions;
pub mod effect;
pub mod loader;
pub mod scheduler;

pub use condition::{condition_depth, evaluate, evaluate_all, Condition, ScarcityLevel};
pub use definitions::{Choice, EventBook, EventCategory, EventDef};
pub use effect::{
    execute, execute_all, ChanceModifier, ChanceSpec, Effect, EffectOutcome, EffectResult, StateOp,
};
pub use loader::{load_event_book, parse_event_book, validate_book};
pub use scheduler::{
    ChoiceExecution, ChoiceRejection, ChoiceView, EventScheduler, TriggeredEvent,
};
