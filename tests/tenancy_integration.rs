//! Integration tests for the tenant layer
//!
//! These tests verify satisfaction scoring and conflict handling
//! against a real world state:
//! - The factor stack (room, defense, pocket, flags) lands exact scores
//! - Daily checks raise disputes, scarcity conflicts, and feuds
//! - Resolution grants the configured boost and cannot double-fire
//! - Eviction scrubs every live reference but keeps history
//! - The conflict gate probability follows the documented model

use blockwarden::core::config::SimConfig;
use blockwarden::core::notify::{NotificationSink, NullSink};
use blockwarden::core::types::{ResourceKind, TenantId, TenantKind};
use blockwarden::tenancy::{
    conflict_probability, recompute, resolve_conflict, run_daily_checks, ConflictKind,
    SatisfactionBand,
};
use blockwarden::world::WorldState;

/// Captures satisfaction band alerts for assertions
#[derive(Default)]
struct BandRecorder {
    alerts: Vec<(TenantId, SatisfactionBand, i32)>,
}

impl NotificationSink for BandRecorder {
    fn satisfaction_alert(
        &mut self,
        tenant: TenantId,
        _old: SatisfactionBand,
        new: SatisfactionBand,
        score: i32,
    ) {
        self.alerts.push((tenant, new, score));
    }
}

fn housed_world(config: &SimConfig, kinds: &[TenantKind]) -> (WorldState, Vec<TenantId>) {
    let mut world = WorldState::new(21, config);
    for _ in 0..kinds.len() {
        world.building.add_room();
    }
    let ids = kinds
        .iter()
        .enumerate()
        .map(|(i, kind)| world.hire_tenant(&format!("t{}", i), *kind, config))
        .collect();
    (world, ids)
}

// ============================================================================
// Satisfaction Factor Stack
// ============================================================================

/// Integration test: a well-kept building lands an exact score
///
/// 1. House one worker in a reinforced room
/// 2. Raise defense to the maximum and stock their pocket with food
/// 3. Verify the recomputed score is base 50 + reinforced 3 + defense 4
#[test]
fn test_satisfaction_factor_stack() {
    let config = SimConfig::default();
    let (mut world, ids) = housed_world(&config, &[TenantKind::Worker]);
    let tenant = ids[0];
    let mut sink = NullSink;

    let room = world.tenants.get(tenant).unwrap().room.expect("housed");
    world.building.room_mut(room).unwrap().reinforced = true;
    world.building.set_defense(10);
    world
        .tenants
        .get_mut(tenant)
        .unwrap()
        .pocket
        .add(ResourceKind::Food, 2);

    let score = recompute(&mut world, tenant, "audit", &config, &mut sink);
    assert_eq!(score, Some(57));
}

/// Integration test: hunger and exposure drag a score down
#[test]
fn test_hunger_and_exposure_drag_scores() {
    let config = SimConfig::default();
    let (mut world, ids) = housed_world(&config, &[TenantKind::Worker]);
    let mut sink = NullSink;

    // Empty pocket (-6) and defense at 1 (-4)
    world.building.set_defense(1);
    let score = recompute(&mut world, ids[0], "audit", &config, &mut sink);
    assert_eq!(score, Some(40));
}

/// Integration test: global modifiers lift everyone
#[test]
fn test_global_modifiers_lift_scores() {
    let config = SimConfig::default();
    let (mut world, ids) = housed_world(&config, &[TenantKind::Worker]);
    let mut sink = NullSink;

    use blockwarden::world::GlobalFlag;
    for flag in [
        GlobalFlag::EmergencyTraining,
        GlobalFlag::BuildingQuality,
        GlobalFlag::PatrolSystem,
        GlobalFlag::SocialNetwork,
    ] {
        world.flags.set(flag, true);
    }

    // base 50 - hungry 6 + flags (2 + 3 + 2 + 2)
    let score = recompute(&mut world, ids[0], "audit", &config, &mut sink);
    assert_eq!(score, Some(53));
}

// ============================================================================
// Conflict Detection and Resolution
// ============================================================================

/// Integration test: a dispute rises from low morale and resolves once
///
/// 1. House three tenants and force two scores below the threshold
/// 2. Run the daily checks and verify one dispute names exactly those two
/// 3. Resolve it and verify both got the configured boost
/// 4. Verify a second resolution attempt is refused
#[test]
fn test_conflict_detection_and_resolution_workflow() {
    let config = SimConfig::default();
    let (mut world, ids) = housed_world(
        &config,
        &[TenantKind::Worker, TenantKind::Worker, TenantKind::Doctor],
    );
    let mut recorder = BandRecorder::default();
    world.ledger.set_stock(ResourceKind::Food, 50);
    world.ledger.set_stock(ResourceKind::Fuel, 50);

    // Two tenants slip below the dispute threshold of 30
    let day = world.day;
    for id in &ids[..2] {
        world
            .satisfaction
            .apply(*id, 25, day, "bad week", &config.satisfaction, &mut recorder);
    }
    assert_eq!(recorder.alerts.len(), 2, "both slides raised band alerts");
    assert!(recorder
        .alerts
        .iter()
        .all(|(_, band, score)| *band == SatisfactionBand::Warning && *score == 25));

    let mut sink = NullSink;
    let raised = run_daily_checks(&mut world, &config, &mut sink);
    assert_eq!(raised.len(), 1);
    let conflict = world.conflicts.get(raised[0]).unwrap();
    assert_eq!(conflict.kind, ConflictKind::SatisfactionDispute);
    assert_eq!(conflict.involved, ids[..2].to_vec());
    assert!(!conflict.resolved);

    assert!(resolve_conflict(&mut world, raised[0], &config, &mut sink));
    assert_eq!(world.satisfaction.score(ids[0]), Some(35));
    assert_eq!(world.satisfaction.score(ids[1]), Some(35));
    assert_eq!(
        world.satisfaction.score(ids[2]),
        Some(50),
        "bystander untouched"
    );
    assert!(world.conflicts.get(raised[0]).unwrap().resolved);

    assert!(
        !resolve_conflict(&mut world, raised[0], &config, &mut sink),
        "a resolved conflict must not boost twice"
    );
    assert_eq!(world.satisfaction.score(ids[0]), Some(35));
}

/// Integration test: short stock raises a scarcity conflict
///
/// Food below the per-tenant floor or fuel below the flat floor both
/// qualify; the conflict names the first two present tenants.
#[test]
fn test_scarcity_conflict_raised_when_stock_short() {
    let config = SimConfig::default();
    let (mut world, ids) = housed_world(&config, &[TenantKind::Worker, TenantKind::Worker]);
    let mut sink = NullSink;

    // Floor for two tenants is 6 food; 5 is short. Fuel is fine.
    world.ledger.set_stock(ResourceKind::Food, 5);
    world.ledger.set_stock(ResourceKind::Fuel, 50);

    let raised = run_daily_checks(&mut world, &config, &mut sink);
    assert_eq!(raised.len(), 1);
    let conflict = world.conflicts.get(raised[0]).unwrap();
    assert_eq!(conflict.kind, ConflictKind::ResourceScarcity);
    assert_eq!(conflict.involved, ids);

    // Restock food, drain fuel below the flat floor of 10
    world.ledger.set_stock(ResourceKind::Food, 50);
    world.ledger.set_stock(ResourceKind::Fuel, 5);
    let raised = run_daily_checks(&mut world, &config, &mut sink);
    assert_eq!(raised.len(), 1);
    assert_eq!(
        world.conflicts.get(raised[0]).unwrap().kind,
        ConflictKind::ResourceScarcity
    );
}

/// Integration test: hostile pairs feud at the configured daily chance
#[test]
fn test_interpersonal_feuds_roll_daily() {
    let mut config = SimConfig::default();
    let (mut world, ids) = housed_world(&config, &[TenantKind::Worker, TenantKind::Worker]);
    let mut sink = NullSink;
    world.ledger.set_stock(ResourceKind::Food, 50);
    world.ledger.set_stock(ResourceKind::Fuel, 50);

    // Sour the pair well below the hostility cutoff of 20
    world.relationships.set(ids[0], ids[1], 5);

    config.conflict.interpersonal_chance = 1.0;
    let raised = run_daily_checks(&mut world, &config, &mut sink);
    assert_eq!(raised.len(), 1);
    let conflict = world.conflicts.get(raised[0]).unwrap();
    assert_eq!(conflict.kind, ConflictKind::Interpersonal);
    assert_eq!(conflict.involved.len(), 2);

    config.conflict.interpersonal_chance = 0.0;
    assert!(
        run_daily_checks(&mut world, &config, &mut sink).is_empty(),
        "a zero chance never feuds"
    );
}

// ============================================================================
// Eviction
// ============================================================================

/// Integration test: eviction scrubs live state but keeps the record
///
/// 1. House two tenants and raise a conflict naming both
/// 2. Evict one tenant
/// 3. Verify registry, satisfaction, relationships, and room all forgot them
/// 4. Verify the conflict log still names the evicted id
#[test]
fn test_eviction_scrubs_tenant_state() {
    let config = SimConfig::default();
    let (mut world, ids) = housed_world(&config, &[TenantKind::Worker, TenantKind::Worker]);
    let departing = ids[0];

    let day = world.day;
    let conflict_id =
        world
            .conflicts
            .push(ConflictKind::Interpersonal, vec![ids[0], ids[1]], 2, day);
    let room = world.tenants.get(departing).unwrap().room.expect("housed");

    assert!(world.evict_tenant(departing));
    assert!(world.tenants.get(departing).is_none());
    assert_eq!(world.tenants.len(), 1);
    assert_eq!(world.satisfaction.score(departing), None);
    assert!(world.relationships.is_empty());
    assert_eq!(world.building.room(room).unwrap().occupant, None);

    let record = world.conflicts.get(conflict_id).expect("history survives");
    assert!(record.involved.contains(&departing));

    assert!(!world.evict_tenant(departing), "double eviction refused");
}

// ============================================================================
// Conflict Gate Probability
// ============================================================================

/// Integration test: the gate probability follows the documented model
///
/// p = base + tenants * per_tenant + max(0, 70 - avg) * rate
///     + scarcity bonus - elder reduction, clamped to [0, 1]
#[test]
fn test_conflict_gate_probability_model() {
    let config = SimConfig::default().conflict;

    let base = conflict_probability(4, 50.0, false, false, &config);
    // 0.05 + 4 * 0.02 + 20 * 0.005
    assert!((base - 0.23).abs() < 1e-9);

    let scarce = conflict_probability(4, 50.0, true, false, &config);
    assert!((scarce - 0.38).abs() < 1e-9);

    let calmed = conflict_probability(4, 50.0, true, true, &config);
    assert!((calmed - 0.28).abs() < 1e-9);

    let packed = conflict_probability(500, 0.0, true, false, &config);
    assert_eq!(packed, 1.0, "clamps at certainty");

    let serene = conflict_probability(0, 100.0, false, true, &config);
    assert!(serene >= 0.0, "never negative");
}
