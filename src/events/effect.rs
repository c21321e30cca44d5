//! Effect execution against world state
//!
//! Effects are the only way event definitions mutate the world. Execution
//! never panics and never returns `Err`: anything that cannot apply comes
//! back as a `success: false` result carrying a skip reason, and one
//! failed effect never stops the rest of its list.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::notify::{NoticeKind, NotificationSink};
use crate::core::types::{ResourceKind, RoomId, TenantFilter, TenantId, TenantKind};
use crate::world::state::{GlobalFlag, StatePath, WorldState};

/// Probability with additive situational modifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChanceSpec {
    pub base: f64,
    #[serde(default)]
    pub modifiers: Vec<ChanceModifier>,
}

/// One additive term of a [`ChanceSpec`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanceModifier {
    /// `per` for every present tenant of an occupation
    PerTenantKind { kind: TenantKind, per: f64 },
    /// `per` for every point of building defense
    PerDefensePoint { per: f64 },
    /// Flat bonus while a global flag is set
    FlagBonus { flag: GlobalFlag, bonus: f64 },
}

impl ChanceSpec {
    pub fn flat(base: f64) -> Self {
        Self {
            base,
            modifiers: Vec::new(),
        }
    }

    /// Resolve against current world state, clamped to [0, 1]
    pub fn resolve(&self, world: &WorldState) -> f64 {
        let mut chance = self.base;
        for modifier in &self.modifiers {
            chance += match modifier {
                ChanceModifier::PerTenantKind { kind, per } => {
                    world.tenants.count_matching(TenantFilter::Kind(*kind)) as f64 * per
                }
                ChanceModifier::PerDefensePoint { per } => {
                    world.building.defense_level as f64 * per
                }
                ChanceModifier::FlagBonus { flag, bonus } => {
                    if world.flags.get(*flag) {
                        *bonus
                    } else {
                        0.0
                    }
                }
            };
        }
        chance.clamp(0.0, 1.0)
    }
}

/// Mutation op for state-path effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateOp {
    Set,
    Add,
    Multiply,
}

impl StateOp {
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "set" => Some(StateOp::Set),
            "add" => Some(StateOp::Add),
            "multiply" => Some(StateOp::Multiply),
            _ => None,
        }
    }
}

/// One executable effect
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Ledger write through the clamping bookkeeping path
    ModifyResource { resource: ResourceKind, amount: i64 },
    /// Human-readable line through the notification sink
    LogMessage { message: String, kind: NoticeKind },
    /// Flag a random intact room for repair
    DamageRandomRoom,
    /// Draw once against a resolved chance, then run one branch
    ProbabilityCheck {
        chance: ChanceSpec,
        success: Vec<Effect>,
        failure: Vec<Effect>,
    },
    /// Evict the first tenant matching the target
    RemoveTenant { target: TenantFilter },
    /// Clear the infection flag of the first matching infected tenant
    HealTenant { target: TenantFilter },
    /// Nested effects that only run while a soldier is present
    SoldierBonus { effects: Vec<Effect> },
    /// Typed write to building defense or a global flag
    ModifyState {
        path: StatePath,
        value: f64,
        op: StateOp,
    },
    /// Unrecognized kind, preserved from the definition file
    Unknown { kind: String },
}

/// What actually happened when one effect ran
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectOutcome {
    ResourceChanged {
        kind: ResourceKind,
        old: u64,
        new: u64,
    },
    MessageLogged,
    RoomDamaged {
        room: RoomId,
    },
    ChanceResolved {
        chance: f64,
        passed: bool,
        results: Vec<EffectResult>,
    },
    TenantRemoved {
        tenant: TenantId,
    },
    TenantHealed {
        tenant: TenantId,
    },
    BonusApplied {
        results: Vec<EffectResult>,
    },
    StateChanged {
        path: StatePath,
        value: f64,
    },
    Skipped {
        reason: String,
    },
}

/// Result of one executed effect. A `success: false` result is a
/// recorded no-op, never an abort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectResult {
    pub success: bool,
    pub outcome: EffectOutcome,
}

impl EffectResult {
    fn skipped(reason: &str) -> Self {
        Self {
            success: false,
            outcome: EffectOutcome::Skipped {
                reason: reason.to_string(),
            },
        }
    }
}

/// Execute one effect. `origin` labels ledger writes so resource
/// history reads back to the event and choice that caused them.
pub fn execute(
    effect: &Effect,
    world: &mut WorldState,
    origin: &str,
    sink: &mut dyn NotificationSink,
) -> EffectResult {
    match effect {
        Effect::ModifyResource { resource, amount } => {
            let old = world.ledger.amount(*resource);
            let day = world.day;
            world
                .ledger
                .modify(*resource, *amount, origin, "event", day, sink);
            let new = world.ledger.amount(*resource);
            EffectResult {
                success: true,
                outcome: EffectOutcome::ResourceChanged {
                    kind: *resource,
                    old,
                    new,
                },
            }
        }
        Effect::LogMessage { message, kind } => {
            sink.notice(*kind, message);
            EffectResult {
                success: true,
                outcome: EffectOutcome::MessageLogged,
            }
        }
        Effect::DamageRandomRoom => {
            let candidates = world.building.damageable_rooms();
            if candidates.is_empty() {
                return EffectResult::skipped("no_damageable_rooms");
            }
            let room = candidates[world.rng.gen_range(0..candidates.len())];
            if let Some(state) = world.building.room_mut(room) {
                state.needs_repair = true;
            }
            tracing::info!("room {:?} damaged by {}", room, origin);
            EffectResult {
                success: true,
                outcome: EffectOutcome::RoomDamaged { room },
            }
        }
        Effect::ProbabilityCheck {
            chance,
            success,
            failure,
        } => {
            let resolved = chance.resolve(world);
            let passed = world.rng.gen::<f64>() < resolved;
            let branch = if passed { success } else { failure };
            let results = execute_all(branch, world, origin, sink);
            EffectResult {
                success: passed,
                outcome: EffectOutcome::ChanceResolved {
                    chance: resolved,
                    passed,
                    results,
                },
            }
        }
        Effect::RemoveTenant { target } => match world.tenants.first_matching(*target) {
            Some(tenant) => {
                world.evict_tenant(tenant);
                tracing::info!("tenant {:?} removed by {}", tenant, origin);
                EffectResult {
                    success: true,
                    outcome: EffectOutcome::TenantRemoved { tenant },
                }
            }
            None => EffectResult::skipped("no_matching_tenant"),
        },
        Effect::HealTenant { target } => {
            let healed = world
                .tenants
                .iter()
                .find(|t| t.infected && t.matches(*target))
                .map(|t| t.id);
            match healed {
                Some(tenant) => {
                    if let Some(t) = world.tenants.get_mut(tenant) {
                        t.infected = false;
                    }
                    EffectResult {
                        success: true,
                        outcome: EffectOutcome::TenantHealed { tenant },
                    }
                }
                None => EffectResult::skipped("no_infected_match"),
            }
        }
        Effect::SoldierBonus { effects } => {
            if world
                .tenants
                .count_matching(TenantFilter::Kind(TenantKind::Soldier))
                == 0
            {
                return EffectResult::skipped("no_soldier_present");
            }
            let results = execute_all(effects, world, origin, sink);
            EffectResult {
                success: true,
                outcome: EffectOutcome::BonusApplied { results },
            }
        }
        Effect::ModifyState { path, value, op } => apply_state_change(world, *path, *value, *op),
        Effect::Unknown { kind } => {
            tracing::warn!("unknown effect kind '{}', skipping", kind);
            EffectResult::skipped("unknown_effect_kind")
        }
    }
}

/// Execute a list in order, collecting every result. A failed effect
/// never stops the ones after it.
pub fn execute_all(
    effects: &[Effect],
    world: &mut WorldState,
    origin: &str,
    sink: &mut dyn NotificationSink,
) -> Vec<EffectResult> {
    effects
        .iter()
        .map(|e| execute(e, world, origin, sink))
        .collect()
}

fn apply_state_change(world: &mut WorldState, path: StatePath, value: f64, op: StateOp) -> EffectResult {
    match path {
        StatePath::BuildingDefense => {
            let current = world.building.defense_level as f64;
            let target = match op {
                StateOp::Set => value,
                StateOp::Add => current + value,
                StateOp::Multiply => current * value,
            };
            // set_defense clamps to 0..=MAX_DEFENSE; float casts saturate
            world.building.set_defense(target.round() as i32);
            EffectResult {
                success: true,
                outcome: EffectOutcome::StateChanged {
                    path,
                    value: world.building.defense_level as f64,
                },
            }
        }
        StatePath::Flag(flag) => match op {
            StateOp::Set => {
                let on = value != 0.0;
                world.flags.set(flag, on);
                EffectResult {
                    success: true,
                    outcome: EffectOutcome::StateChanged {
                        path,
                        value: if on { 1.0 } else { 0.0 },
                    },
                }
            }
            // Flags accept Set only
            StateOp::Add | StateOp::Multiply => EffectResult::skipped("flag_op_not_set"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimConfig;
    use crate::core::notify::NullSink;
    use crate::world::state::GlobalFlag;

    #[derive(Default)]
    struct Recorder {
        notices: Vec<(NoticeKind, String)>,
    }

    impl NotificationSink for Recorder {
        fn notice(&mut self, kind: NoticeKind, message: &str) {
            self.notices.push((kind, message.to_string()));
        }
    }

    fn world() -> WorldState {
        WorldState::new(42, &SimConfig::default())
    }

    #[test]
    fn test_modify_resource_reports_old_and_new() {
        let mut world = world();
        let mut sink = NullSink;
        world.ledger.set_stock(ResourceKind::Food, 10);

        let effect = Effect::ModifyResource {
            resource: ResourceKind::Food,
            amount: -3,
        };
        let result = execute(&effect, &mut world, "test", &mut sink);
        assert!(result.success);
        match result.outcome {
            EffectOutcome::ResourceChanged { kind, old, new } => {
                assert_eq!(kind, ResourceKind::Food);
                assert_eq!(old, 10);
                assert_eq!(new, 7);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_modify_resource_clamps_at_zero() {
        let mut world = world();
        let mut sink = NullSink;
        world.ledger.set_stock(ResourceKind::Fuel, 2);

        let effect = Effect::ModifyResource {
            resource: ResourceKind::Fuel,
            amount: -10,
        };
        let result = execute(&effect, &mut world, "test", &mut sink);
        assert!(result.success, "bookkeeping path always applies");
        assert_eq!(world.ledger.amount(ResourceKind::Fuel), 0);
    }

    #[test]
    fn test_log_message_reaches_sink() {
        let mut world = world();
        let mut sink = Recorder::default();

        let effect = Effect::LogMessage {
            message: "the kettle is on".into(),
            kind: NoticeKind::Info,
        };
        let result = execute(&effect, &mut world, "test", &mut sink);
        assert!(result.success);
        assert_eq!(sink.notices.len(), 1);
        assert_eq!(sink.notices[0].1, "the kettle is on");
    }

    #[test]
    fn test_damage_random_room_flags_one() {
        let config = SimConfig::default();
        let mut world = WorldState::new(42, &config);
        let mut sink = NullSink;
        for _ in 0..3 {
            world.building.add_room();
        }

        let result = execute(&Effect::DamageRandomRoom, &mut world, "test", &mut sink);
        assert!(result.success);
        let damaged = world
            .building
            .rooms
            .iter()
            .filter(|r| r.needs_repair)
            .count();
        assert_eq!(damaged, 1);
    }

    #[test]
    fn test_damage_skips_when_nothing_intact() {
        let mut world = world();
        let mut sink = NullSink;
        let room = world.building.add_room();
        world.building.room_mut(room).unwrap().needs_repair = true;

        let result = execute(&Effect::DamageRandomRoom, &mut world, "test", &mut sink);
        assert!(!result.success);
        assert!(matches!(
            result.outcome,
            EffectOutcome::Skipped { ref reason } if reason == "no_damageable_rooms"
        ));
    }

    #[test]
    fn test_probability_check_branches() {
        let mut world = world();
        let mut sink = NullSink;
        world.ledger.set_stock(ResourceKind::Cash, 0);

        let certain = Effect::ProbabilityCheck {
            chance: ChanceSpec::flat(1.0),
            success: vec![Effect::ModifyResource {
                resource: ResourceKind::Cash,
                amount: 5,
            }],
            failure: vec![],
        };
        let result = execute(&certain, &mut world, "test", &mut sink);
        assert!(result.success);
        assert_eq!(world.ledger.amount(ResourceKind::Cash), 5);

        let impossible = Effect::ProbabilityCheck {
            chance: ChanceSpec::flat(0.0),
            success: vec![],
            failure: vec![Effect::ModifyResource {
                resource: ResourceKind::Cash,
                amount: -5,
            }],
        };
        let result = execute(&impossible, &mut world, "test", &mut sink);
        assert!(!result.success, "failed draw reports success false");
        assert_eq!(world.ledger.amount(ResourceKind::Cash), 0);
        match result.outcome {
            EffectOutcome::ChanceResolved { passed, results, .. } => {
                assert!(!passed);
                assert_eq!(results.len(), 1, "failure branch ran");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_chance_modifiers_resolve() {
        let config = SimConfig::default();
        let mut world = WorldState::new(42, &config);
        world.building.add_room();
        world.building.add_room();
        world.hire_tenant("Anya", TenantKind::Soldier, &config);
        world.hire_tenant("Boris", TenantKind::Soldier, &config);
        world.building.set_defense(5);
        world.flags.set(GlobalFlag::PatrolSystem, true);

        let spec = ChanceSpec {
            base: 0.1,
            modifiers: vec![
                ChanceModifier::PerTenantKind {
                    kind: TenantKind::Soldier,
                    per: 0.05,
                },
                ChanceModifier::PerDefensePoint { per: 0.02 },
                ChanceModifier::FlagBonus {
                    flag: GlobalFlag::PatrolSystem,
                    bonus: 0.1,
                },
            ],
        };
        // 0.1 + 2 * 0.05 + 5 * 0.02 + 0.1 = 0.4
        assert!((spec.resolve(&world) - 0.4).abs() < 1e-9);

        world.flags.set(GlobalFlag::PatrolSystem, false);
        assert!((spec.resolve(&world) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_chance_resolve_clamps() {
        let world = world();
        assert_eq!(ChanceSpec::flat(4.0).resolve(&world), 1.0);
        assert_eq!(ChanceSpec::flat(-1.0).resolve(&world), 0.0);
    }

    #[test]
    fn test_remove_tenant_evicts_first_match() {
        let config = SimConfig::default();
        let mut world = WorldState::new(42, &config);
        let a = world.hire_tenant("Anya", TenantKind::Worker, &config);
        let b = world.hire_tenant("Boris", TenantKind::Worker, &config);
        world.tenants.get_mut(b).unwrap().infected = true;
        let mut sink = NullSink;

        let effect = Effect::RemoveTenant {
            target: TenantFilter::Infected,
        };
        let result = execute(&effect, &mut world, "test", &mut sink);
        assert!(result.success);
        assert!(world.tenants.get(b).is_none(), "infected tenant gone");
        assert!(world.tenants.get(a).is_some());
        assert_eq!(world.satisfaction.score(b), None, "books cleaned up");

        // Nobody left to match
        let result = execute(&effect, &mut world, "test", &mut sink);
        assert!(!result.success);
    }

    #[test]
    fn test_heal_tenant_clears_infection() {
        let config = SimConfig::default();
        let mut world = WorldState::new(42, &config);
        let a = world.hire_tenant("Anya", TenantKind::Worker, &config);
        world.tenants.get_mut(a).unwrap().infected = true;
        let mut sink = NullSink;

        let effect = Effect::HealTenant {
            target: TenantFilter::Infected,
        };
        let result = execute(&effect, &mut world, "test", &mut sink);
        assert!(result.success);
        assert!(!world.tenants.get(a).unwrap().infected);

        let result = execute(&effect, &mut world, "test", &mut sink);
        assert!(!result.success, "no infected tenant left");
    }

    #[test]
    fn test_heal_respects_kind_target() {
        let config = SimConfig::default();
        let mut world = WorldState::new(42, &config);
        let worker = world.hire_tenant("Anya", TenantKind::Worker, &config);
        let doctor = world.hire_tenant("Clara", TenantKind::Doctor, &config);
        world.tenants.get_mut(worker).unwrap().infected = true;
        world.tenants.get_mut(doctor).unwrap().infected = true;
        let mut sink = NullSink;

        let effect = Effect::HealTenant {
            target: TenantFilter::Kind(TenantKind::Doctor),
        };
        execute(&effect, &mut world, "test", &mut sink);
        assert!(!world.tenants.get(doctor).unwrap().infected);
        assert!(world.tenants.get(worker).unwrap().infected, "worker untouched");
    }

    #[test]
    fn test_soldier_bonus_gated_on_presence() {
        let config = SimConfig::default();
        let mut world = WorldState::new(42, &config);
        let mut sink = NullSink;
        let effect = Effect::SoldierBonus {
            effects: vec![Effect::ModifyResource {
                resource: ResourceKind::Materials,
                amount: 2,
            }],
        };

        let result = execute(&effect, &mut world, "test", &mut sink);
        assert!(!result.success);
        assert_eq!(world.ledger.amount(ResourceKind::Materials), 0);

        world.hire_tenant("Boris", TenantKind::Soldier, &config);
        let result = execute(&effect, &mut world, "test", &mut sink);
        assert!(result.success);
        assert_eq!(world.ledger.amount(ResourceKind::Materials), 2);
    }

    #[test]
    fn test_modify_state_defense_ops_clamp() {
        let mut world = world();
        let mut sink = NullSink;
        world.building.set_defense(3);

        let add = Effect::ModifyState {
            path: StatePath::BuildingDefense,
            value: 4.0,
            op: StateOp::Add,
        };
        execute(&add, &mut world, "test", &mut sink);
        assert_eq!(world.building.defense_level, 7);

        let overshoot = Effect::ModifyState {
            path: StatePath::BuildingDefense,
            value: 50.0,
            op: StateOp::Set,
        };
        execute(&overshoot, &mut world, "test", &mut sink);
        assert_eq!(world.building.defense_level, 10, "clamped at the ceiling");

        let halve = Effect::ModifyState {
            path: StatePath::BuildingDefense,
            value: 0.25,
            op: StateOp::Multiply,
        };
        execute(&halve, &mut world, "test", &mut sink);
        assert_eq!(world.building.defense_level, 3, "10 * 0.25 rounds to 3");
    }

    #[test]
    fn test_modify_state_flag_set_only() {
        let mut world = world();
        let mut sink = NullSink;

        let set_on = Effect::ModifyState {
            path: StatePath::Flag(GlobalFlag::SocialNetwork),
            value: 1.0,
            op: StateOp::Set,
        };
        let result = execute(&set_on, &mut world, "test", &mut sink);
        assert!(result.success);
        assert!(world.flags.social_network);

        let add = Effect::ModifyState {
            path: StatePath::Flag(GlobalFlag::SocialNetwork),
            value: 1.0,
            op: StateOp::Add,
        };
        let result = execute(&add, &mut world, "test", &mut sink);
        assert!(!result.success, "arithmetic on a flag is rejected");
        assert!(world.flags.social_network, "flag untouched");

        let set_off = Effect::ModifyState {
            path: StatePath::Flag(GlobalFlag::SocialNetwork),
            value: 0.0,
            op: StateOp::Set,
        };
        execute(&set_off, &mut world, "test", &mut sink);
        assert!(!world.flags.social_network);
    }

    #[test]
    fn test_unknown_effect_skips() {
        let mut world = world();
        let mut sink = NullSink;
        let result = execute(
            &Effect::Unknown {
                kind: "summon_rain".into(),
            },
            &mut world,
            "test",
            &mut sink,
        );
        assert!(!result.success);
        assert!(matches!(
            result.outcome,
            EffectOutcome::Skipped { ref reason } if reason == "unknown_effect_kind"
        ));
    }

    #[test]
    fn test_execute_all_continues_past_failures() {
        let mut world = world();
        let mut sink = NullSink;
        let effects = vec![
            Effect::Unknown {
                kind: "broken".into(),
            },
            Effect::ModifyResource {
                resource: ResourceKind::Food,
                amount: 5,
            },
        ];
        let results = execute_all(&effects, &mut world, "test", &mut sink);
        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[1].success);
        assert_eq!(world.ledger.amount(ResourceKind::Food), 5);
    }

    #[test]
    fn test_ledger_history_carries_origin() {
        let mut world = world();
        let mut sink = NullSink;
        let effect = Effect::ModifyResource {
            resource: ResourceKind::Cash,
            amount: 7,
        };
        execute(&effect, &mut world, "night_raiders/pay_off", &mut sink);
        let last = world.ledger.history().last().unwrap();
        assert_eq!(last.reason, "night_raiders/pay_off");
        assert_eq!(last.source, "event");
    }
}
