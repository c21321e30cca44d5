//! The daily turn - upkeep, morale, conflict checks, event triggers

use serde::Serialize;

use crate::core::config::SimConfig;
use crate::core::notify::NotificationSink;
use crate::core::types::{ConflictId, Day, ResourceKind};
use crate::events::scheduler::{EventScheduler, TriggeredEvent};
use crate::tenancy::conflict::run_daily_checks;
use crate::tenancy::satisfaction::recompute_all;
use crate::world::state::WorldState;

/// Everything one day produced, for the host to render
#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub day: Day,
    /// Stock actually drawn for upkeep, one entry per consuming kind
    pub consumed: Vec<(ResourceKind, u64)>,
    /// Tenants whose full food portion could not be drawn
    pub hungry: u32,
    pub conflicts_raised: Vec<ConflictId>,
    /// Events fired this day, in trigger order
    pub triggered: Vec<TriggeredEvent>,
}

/// Advance the world one day.
///
/// Order is fixed: upkeep draws stock first, morale is recomputed
/// against the depleted stores, conflicts are checked against the new
/// morale, then the three event trigger points run (random, conflict,
/// special). Fired events go back to the host unresolved; resolving
/// them is a separate [`EventScheduler::execute_choice`] call.
pub fn run_day(
    world: &mut WorldState,
    scheduler: &EventScheduler,
    config: &SimConfig,
    sink: &mut dyn NotificationSink,
) -> DayReport {
    world.day += 1;
    let day = world.day;
    tracing::debug!("day {} begins", day);

    let (consumed, hungry) = apply_upkeep(world, config, sink);
    recompute_all(world, "daily recompute", config, sink);
    let conflicts_raised = run_daily_checks(world, config, sink);

    let mut triggered = Vec::new();
    if let Some(event) = scheduler.process_random_events(world, config) {
        triggered.push(event);
    }
    if let Some(event) = scheduler.process_conflict_events(world, config) {
        triggered.push(event);
    }
    if let Some(event) = scheduler.process_special_events(world, config) {
        triggered.push(event);
    }

    DayReport {
        day,
        consumed,
        hungry,
        conflicts_raised,
        triggered,
    }
}

/// Draw food, fuel and medical stock for the day.
///
/// Food is served in hire order; a tenant whose full portion cannot be
/// drawn counts as hungry even when part of it was. Fuel burns at the
/// flat base rate while anyone is home. Medical draws per infected
/// tenant present. Observed draws feed the consumption stats even when
/// zero, so depletion estimates track quiet days too.
fn apply_upkeep(
    world: &mut WorldState,
    config: &SimConfig,
    sink: &mut dyn NotificationSink,
) -> (Vec<(ResourceKind, u64)>, u32) {
    let portions: Vec<u64> = world
        .tenants
        .iter()
        .filter(|t| t.is_present())
        .map(|t| config.consumption.food_for(t.kind))
        .collect();

    let mut remaining = world.ledger.amount(ResourceKind::Food);
    let mut food_drawn = 0u64;
    let mut hungry = 0u32;
    for portion in portions {
        let served = portion.min(remaining);
        remaining -= served;
        food_drawn += served;
        if served < portion {
            hungry += 1;
        }
    }

    let fuel_drawn = if world.tenants.present_count() > 0 {
        config
            .consumption
            .fuel_base
            .min(world.ledger.amount(ResourceKind::Fuel))
    } else {
        0
    };

    let infected_present = world
        .tenants
        .iter()
        .filter(|t| t.is_present() && t.infected)
        .count() as u64;
    let medical_drawn = (infected_present * config.consumption.medical_per_infected)
        .min(world.ledger.amount(ResourceKind::Medical));

    let drawn = [
        (ResourceKind::Food, food_drawn),
        (ResourceKind::Fuel, fuel_drawn),
        (ResourceKind::Medical, medical_drawn),
    ];
    for (kind, amount) in drawn {
        if amount > 0 {
            world.modify_resource(kind, -(amount as i64), "daily upkeep", "upkeep", sink);
        }
        world.consumption.record_day(kind, amount);
    }

    (drawn.to_vec(), hungry)
}
