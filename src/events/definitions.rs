//! Event definitions and the book that holds them
//!
//! Definitions are data: trigger conditions, player-facing choices, and
//! the effects each choice carries. The built-in set matches
//! `data/events.toml`; hosts load replacements from disk through
//! [`crate::events::loader`].

use serde::{Deserialize, Serialize};

use crate::core::notify::NoticeKind;
use crate::core::types::{ResourceKind, TenantFilter, TenantKind};
use crate::events::condition::{condition_depth, Condition, ScarcityLevel};
use crate::events::effect::{ChanceModifier, ChanceSpec, Effect, StateOp};
use crate::world::state::{GlobalFlag, StatePath};

/// Which trigger point an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Daily random pool, gated by `random_event_chance`
    Random,
    /// Gated by the conflict probability model
    Conflict,
    /// Checked every day without a gate
    Special,
    /// Fired by id from the host, never scheduled
    Scripted,
}

impl EventCategory {
    pub const ALL: [EventCategory; 4] = [
        EventCategory::Random,
        EventCategory::Conflict,
        EventCategory::Special,
        EventCategory::Scripted,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            EventCategory::Random => "random",
            EventCategory::Conflict => "conflict",
            EventCategory::Special => "special",
            EventCategory::Scripted => "scripted",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "random" => Some(EventCategory::Random),
            "conflict" => Some(EventCategory::Conflict),
            "special" => Some(EventCategory::Special),
            "scripted" => Some(EventCategory::Scripted),
            _ => None,
        }
    }
}

/// One selectable response to an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
    /// Gates availability; re-checked at execution time
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub effects: Vec<Effect>,
}

/// One event definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDef {
    pub id: String,
    pub title: String,
    pub category: EventCategory,
    /// Selection weight class. Higher always beats lower; ties randomize.
    pub priority: f64,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub choices: Vec<Choice>,
    /// Situational choices, appended when their conditions hold
    #[serde(default)]
    pub extra_choices: Vec<Choice>,
}

impl EventDef {
    /// Deepest condition tree anywhere in this definition
    pub fn max_condition_depth(&self) -> usize {
        let trigger = self
            .conditions
            .iter()
            .map(condition_depth)
            .max()
            .unwrap_or(0);
        let choices = self
            .choices
            .iter()
            .chain(self.extra_choices.iter())
            .flat_map(|c| c.conditions.iter())
            .map(condition_depth)
            .max()
            .unwrap_or(0);
        trigger.max(choices)
    }
}

/// The full set of event definitions, immutable once scheduled
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventBook {
    events: Vec<EventDef>,
}

impl EventBook {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn add(&mut self, event: EventDef) {
        self.events.push(event);
    }

    pub fn get(&self, id: &str) -> Option<&EventDef> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn by_category(&self, category: EventCategory) -> impl Iterator<Item = &EventDef> {
        self.events.iter().filter(move |e| e.category == category)
    }

    pub fn all(&self) -> &[EventDef] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Built-in definitions, same content as `data/events.toml`
    pub fn with_defaults() -> Self {
        let mut book = Self::new();

        // ---------- Random pool ----------

        book.add(EventDef {
            id: "scavenger_haul".into(),
            title: "A Heavy Rucksack".into(),
            category: EventCategory::Random,
            priority: 5.0,
            conditions: vec![Condition::HasTenantKind {
                filter: TenantFilter::Kind(TenantKind::Scavenger),
                count: 1,
            }],
            choices: vec![
                Choice {
                    id: "stockpile_everything".into(),
                    label: "Claim the whole haul for the cellar".into(),
                    conditions: vec![],
                    effects: vec![
                        Effect::ModifyResource {
                            resource: ResourceKind::Food,
                            amount: 4,
                        },
                        Effect::ModifyResource {
                            resource: ResourceKind::Materials,
                            amount: 3,
                        },
                        Effect::LogMessage {
                            message: "The haul goes straight into the cellar.".into(),
                            kind: NoticeKind::Success,
                        },
                    ],
                },
                Choice {
                    id: "split_the_find".into(),
                    label: "Let the scavenger keep a cut".into(),
                    conditions: vec![],
                    effects: vec![
                        Effect::ModifyResource {
                            resource: ResourceKind::Food,
                            amount: 2,
                        },
                        Effect::LogMessage {
                            message: "Half the haul reaches the cellar. Goodwill keeps the rest."
                                .into(),
                            kind: NoticeKind::Info,
                        },
                    ],
                },
            ],
            extra_choices: vec![],
        });

        book.add(EventDef {
            id: "travelling_trader".into(),
            title: "A Knock at the Gate".into(),
            category: EventCategory::Random,
            priority: 5.0,
            conditions: vec![Condition::HasResource {
                resource: ResourceKind::Cash,
                amount: 10,
            }],
            choices: vec![
                Choice {
                    id: "buy_medicine".into(),
                    label: "Buy the trader's medicine box".into(),
                    conditions: vec![Condition::HasResource {
                        resource: ResourceKind::Cash,
                        amount: 10,
                    }],
                    effects: vec![
                        Effect::ModifyResource {
                            resource: ResourceKind::Cash,
                            amount: -10,
                        },
                        Effect::ModifyResource {
                            resource: ResourceKind::Medical,
                            amount: 3,
                        },
                        Effect::LogMessage {
                            message: "Three sealed kits join the cabinet.".into(),
                            kind: NoticeKind::Success,
                        },
                    ],
                },
                Choice {
                    id: "turn_them_away".into(),
                    label: "Turn the trader away".into(),
                    conditions: vec![],
                    effects: vec![Effect::LogMessage {
                        message: "The trader shrugs and moves down the street.".into(),
                        kind: NoticeKind::Info,
                    }],
                },
            ],
            extra_choices: vec![Choice {
                id: "let_the_elder_haggle".into(),
                label: "Let the elder haggle over the price".into(),
                conditions: vec![Condition::HasTenantKind {
                    filter: TenantFilter::Kind(TenantKind::Elder),
                    count: 1,
                }],
                effects: vec![Effect::ProbabilityCheck {
                    chance: ChanceSpec::flat(0.6),
                    success: vec![
                        Effect::ModifyResource {
                            resource: ResourceKind::Cash,
                            amount: -6,
                        },
                        Effect::ModifyResource {
                            resource: ResourceKind::Medical,
                            amount: 3,
                        },
                        Effect::LogMessage {
                            message: "The elder talks the price down to six.".into(),
                            kind: NoticeKind::Success,
                        },
                    ],
                    failure: vec![Effect::LogMessage {
                        message: "The trader will not budge and walks.".into(),
                        kind: NoticeKind::Warning,
                    }],
                }],
            }],
        });

        book.add(EventDef {
            id: "night_raiders".into(),
            title: "Torches in the Alley".into(),
            category: EventCategory::Random,
            priority: 9.0,
            conditions: vec![Condition::DayRange {
                min: Some(3),
                max: None,
            }],
            choices: vec![
                Choice {
                    id: "barricade".into(),
                    label: "Barricade the doors and wait them out".into(),
                    conditions: vec![],
                    effects: vec![Effect::ProbabilityCheck {
                        chance: ChanceSpec {
                            base: 0.5,
                            modifiers: vec![
                                ChanceModifier::PerDefensePoint { per: 0.04 },
                                ChanceModifier::FlagBonus {
                                    flag: GlobalFlag::PatrolSystem,
                                    bonus: 0.1,
                                },
                            ],
                        },
                        success: vec![Effect::LogMessage {
                            message: "The doors hold until dawn.".into(),
                            kind: NoticeKind::Success,
                        }],
                        failure: vec![
                            Effect::ModifyResource {
                                resource: ResourceKind::Materials,
                                amount: -5,
                            },
                            Effect::DamageRandomRoom,
                            Effect::LogMessage {
                                message: "They pry a window loose and strip a room.".into(),
                                kind: NoticeKind::Danger,
                            },
                        ],
                    }],
                },
                Choice {
                    id: "fight_back".into(),
                    label: "Meet them at the stoop".into(),
                    conditions: vec![Condition::HasTenantKind {
                        filter: TenantFilter::Kind(TenantKind::Soldier),
                        count: 1,
                    }],
                    effects: vec![Effect::ProbabilityCheck {
                        chance: ChanceSpec {
                            base: 0.6,
                            modifiers: vec![ChanceModifier::PerTenantKind {
                                kind: TenantKind::Soldier,
                                per: 0.1,
                            }],
                        },
                        success: vec![
                            Effect::SoldierBonus {
                                effects: vec![Effect::ModifyResource {
                                    resource: ResourceKind::Materials,
                                    amount: 2,
                                }],
                            },
                            Effect::LogMessage {
                                message: "The raiders scatter, dropping what they carried.".into(),
                                kind: NoticeKind::Success,
                            },
                        ],
                        failure: vec![
                            Effect::DamageRandomRoom,
                            Effect::LogMessage {
                                message: "The line breaks and the raiders get inside.".into(),
                                kind: NoticeKind::Danger,
                            },
                        ],
                    }],
                },
            ],
            extra_choices: vec![],
        });

        book.add(EventDef {
            id: "burst_pipe".into(),
            title: "Water Down the Stairwell".into(),
            category: EventCategory::Random,
            priority: 4.0,
            conditions: vec![],
            choices: vec![
                Choice {
                    id: "patch_it".into(),
                    label: "Patch the pipe before it spreads".into(),
                    conditions: vec![Condition::HasResource {
                        resource: ResourceKind::Materials,
                        amount: 3,
                    }],
                    effects: vec![
                        Effect::ModifyResource {
                            resource: ResourceKind::Materials,
                            amount: -3,
                        },
                        Effect::LogMessage {
                            message: "The patch holds. The stairwell dries out.".into(),
                            kind: NoticeKind::Success,
                        },
                    ],
                },
                Choice {
                    id: "let_it_drip".into(),
                    label: "Put a bucket under it".into(),
                    conditions: vec![],
                    effects: vec![
                        Effect::DamageRandomRoom,
                        Effect::LogMessage {
                            message: "The damp crawls into a ceiling overnight.".into(),
                            kind: NoticeKind::Warning,
                        },
                    ],
                },
            ],
            extra_choices: vec![],
        });

        // ---------- Conflict pool ----------

        book.add(EventDef {
            id: "corridor_dispute".into(),
            title: "Shouting on the Third Floor".into(),
            category: EventCategory::Conflict,
            priority: 7.0,
            conditions: vec![],
            choices: vec![
                Choice {
                    id: "buy_peace".into(),
                    label: "Put food on the table between them".into(),
                    conditions: vec![Condition::HasResource {
                        resource: ResourceKind::Food,
                        amount: 4,
                    }],
                    effects: vec![
                        Effect::ModifyResource {
                            resource: ResourceKind::Food,
                            amount: -4,
                        },
                        Effect::LogMessage {
                            message: "A shared meal takes the heat out of it.".into(),
                            kind: NoticeKind::Success,
                        },
                    ],
                },
                Choice {
                    id: "stay_out_of_it".into(),
                    label: "Let them sort it out themselves".into(),
                    conditions: vec![],
                    effects: vec![Effect::ProbabilityCheck {
                        chance: ChanceSpec::flat(0.5),
                        success: vec![Effect::LogMessage {
                            message: "It burns out on its own by evening.".into(),
                            kind: NoticeKind::Info,
                        }],
                        failure: vec![
                            Effect::DamageRandomRoom,
                            Effect::LogMessage {
                                message: "A door comes off its hinges before it ends.".into(),
                                kind: NoticeKind::Danger,
                            },
                        ],
                    }],
                },
            ],
            extra_choices: vec![],
        });

        book.add(EventDef {
            id: "pantry_standoff".into(),
            title: "Fists Over the Last Tins".into(),
            category: EventCategory::Conflict,
            priority: 9.0,
            conditions: vec![Condition::ResourceScarcity {
                resource: ResourceKind::Food,
                level: ScarcityLevel::Insufficient,
            }],
            choices: vec![
                Choice {
                    id: "open_the_strongbox".into(),
                    label: "Pay the corner store's siege prices".into(),
                    conditions: vec![Condition::HasResource {
                        resource: ResourceKind::Cash,
                        amount: 12,
                    }],
                    effects: vec![
                        Effect::ModifyResource {
                            resource: ResourceKind::Cash,
                            amount: -12,
                        },
                        Effect::ModifyResource {
                            resource: ResourceKind::Food,
                            amount: 6,
                        },
                        Effect::LogMessage {
                            message: "Sacks on the counter quiet the queue.".into(),
                            kind: NoticeKind::Success,
                        },
                    ],
                },
                Choice {
                    id: "ration_harder".into(),
                    label: "Cut the rations and post the list".into(),
                    conditions: vec![],
                    effects: vec![Effect::LogMessage {
                        message: "Thinner portions, longer faces.".into(),
                        kind: NoticeKind::Warning,
                    }],
                },
            ],
            extra_choices: vec![Choice {
                id: "send_scavengers".into(),
                label: "Send the scavengers out past the wire".into(),
                conditions: vec![Condition::HasTenantKind {
                    filter: TenantFilter::Kind(TenantKind::Scavenger),
                    count: 1,
                }],
                effects: vec![Effect::ProbabilityCheck {
                    chance: ChanceSpec {
                        base: 0.55,
                        modifiers: vec![ChanceModifier::PerTenantKind {
                            kind: TenantKind::Scavenger,
                            per: 0.1,
                        }],
                    },
                    success: vec![
                        Effect::ModifyResource {
                            resource: ResourceKind::Food,
                            amount: 8,
                        },
                        Effect::LogMessage {
                            message: "They come back heavy before curfew.".into(),
                            kind: NoticeKind::Success,
                        },
                    ],
                    failure: vec![Effect::LogMessage {
                        message: "They come back empty-handed and shaken.".into(),
                        kind: NoticeKind::Danger,
                    }],
                }],
            }],
        });

        // ---------- Special pool ----------

        book.add(EventDef {
            id: "fever_spike".into(),
            title: "Coughing Through the Walls".into(),
            category: EventCategory::Special,
            priority: 10.0,
            conditions: vec![Condition::HasTenantKind {
                filter: TenantFilter::Infected,
                count: 1,
            }],
            choices: vec![
                Choice {
                    id: "treat".into(),
                    label: "Spend supplies on a proper treatment".into(),
                    conditions: vec![Condition::HasResource {
                        resource: ResourceKind::Medical,
                        amount: 2,
                    }],
                    effects: vec![
                        Effect::ModifyResource {
                            resource: ResourceKind::Medical,
                            amount: -2,
                        },
                        Effect::HealTenant {
                            target: TenantFilter::Infected,
                        },
                        Effect::LogMessage {
                            message: "The fever breaks by morning.".into(),
                            kind: NoticeKind::Success,
                        },
                    ],
                },
                Choice {
                    id: "isolate".into(),
                    label: "Tape the door and slide meals under it".into(),
                    conditions: vec![],
                    effects: vec![Effect::LogMessage {
                        message: "The sick room stays shut. For now it holds.".into(),
                        kind: NoticeKind::Warning,
                    }],
                },
            ],
            extra_choices: vec![
                Choice {
                    id: "doctor_rounds".into(),
                    label: "Have the doctor make rounds".into(),
                    conditions: vec![Condition::HasTenantKind {
                        filter: TenantFilter::Kind(TenantKind::Doctor),
                        count: 1,
                    }],
                    effects: vec![
                        Effect::ModifyResource {
                            resource: ResourceKind::Medical,
                            amount: -1,
                        },
                        Effect::HealTenant {
                            target: TenantFilter::Infected,
                        },
                        Effect::LogMessage {
                            message: "The doctor stretches one kit across the ward.".into(),
                            kind: NoticeKind::Success,
                        },
                    ],
                },
                Choice {
                    id: "turn_them_out".into(),
                    label: "Turn the sick out of the building".into(),
                    conditions: vec![],
                    effects: vec![
                        Effect::RemoveTenant {
                            target: TenantFilter::Infected,
                        },
                        Effect::LogMessage {
                            message: "A bundle of belongings lands on the curb.".into(),
                            kind: NoticeKind::Danger,
                        },
                    ],
                },
            ],
        });

        book.add(EventDef {
            id: "city_inspection".into(),
            title: "A Clipboard at the Door".into(),
            category: EventCategory::Special,
            priority: 6.0,
            conditions: vec![
                Condition::DayRange {
                    min: Some(7),
                    max: None,
                },
                Condition::AnyOf {
                    conditions: vec![
                        Condition::Probability { chance: 0.25 },
                        Condition::All {
                            conditions: vec![
                                Condition::ResourceScarcity {
                                    resource: ResourceKind::Materials,
                                    level: ScarcityLevel::Insufficient,
                                },
                                Condition::DayRange {
                                    min: Some(10),
                                    max: None,
                                },
                            ],
                        },
                    ],
                },
            ],
            choices: vec![
                Choice {
                    id: "bribe".into(),
                    label: "Fold cash into the paperwork".into(),
                    conditions: vec![Condition::HasResource {
                        resource: ResourceKind::Cash,
                        amount: 15,
                    }],
                    effects: vec![
                        Effect::ModifyResource {
                            resource: ResourceKind::Cash,
                            amount: -15,
                        },
                        Effect::ModifyState {
                            path: StatePath::BuildingDefense,
                            value: 1.0,
                            op: StateOp::Add,
                        },
                        Effect::LogMessage {
                            message: "The inspector signs off and even flags the gate for reinforcement.".into(),
                            kind: NoticeKind::Info,
                        },
                    ],
                },
                Choice {
                    id: "cooperate".into(),
                    label: "Walk the inspector through honestly".into(),
                    conditions: vec![],
                    effects: vec![Effect::ProbabilityCheck {
                        chance: ChanceSpec {
                            base: 0.6,
                            modifiers: vec![ChanceModifier::FlagBonus {
                                flag: GlobalFlag::BuildingQuality,
                                bonus: 0.25,
                            }],
                        },
                        success: vec![Effect::LogMessage {
                            message: "The inspection passes clean.".into(),
                            kind: NoticeKind::Success,
                        }],
                        failure: vec![
                            Effect::ModifyResource {
                                resource: ResourceKind::Cash,
                                amount: -5,
                            },
                            Effect::LogMessage {
                                message: "A fine for the cracked stairwell.".into(),
                                kind: NoticeKind::Warning,
                            },
                        ],
                    }],
                },
            ],
            extra_choices: vec![],
        });

        // ---------- Scripted ----------

        book.add(EventDef {
            id: "first_light".into(),
            title: "First Light Over the Block".into(),
            category: EventCategory::Scripted,
            priority: 10.0,
            conditions: vec![Condition::DayRange {
                min: None,
                max: Some(1),
            }],
            choices: vec![
                Choice {
                    id: "take_stock".into(),
                    label: "Spend the morning counting the cellar".into(),
                    conditions: vec![],
                    effects: vec![
                        Effect::ModifyResource {
                            resource: ResourceKind::Food,
                            amount: 5,
                        },
                        Effect::LogMessage {
                            message: "A forgotten crate turns up behind the boiler.".into(),
                            kind: NoticeKind::Info,
                        },
                    ],
                },
                Choice {
                    id: "meet_the_neighbors".into(),
                    label: "Knock on every door and introduce yourself".into(),
                    conditions: vec![],
                    effects: vec![
                        Effect::ModifyState {
                            path: StatePath::Flag(GlobalFlag::SocialNetwork),
                            value: 1.0,
                            op: StateOp::Set,
                        },
                        Effect::LogMessage {
                            message: "Names learned, kettles shared.".into(),
                            kind: NoticeKind::Info,
                        },
                    ],
                },
            ],
            extra_choices: vec![],
        });

        book
    }
}
