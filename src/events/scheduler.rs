//! Daily event scheduling and choice execution
//!
//! Three trigger points run once per day in a fixed order: random
//! (gated by a flat daily chance), conflict (gated by the probability
//! model), special (no gate, conditions carry the weight). Scripted
//! events fire by id when the host asks. At most one event fires per
//! trigger point per day; the host presents its choices and calls back
//! into [`EventScheduler::execute_choice`].

use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimConfig;
use crate::core::notify::NotificationSink;
use crate::core::types::{Day, TenantFilter, TenantKind};
use crate::events::condition::evaluate_all;
use crate::events::definitions::{EventBook, EventCategory, EventDef};
use crate::events::effect::{execute_all, EffectResult};
use crate::tenancy::conflict::conflict_probability;
use crate::world::state::WorldState;

/// What the host shows for one available choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceView {
    pub id: String,
    pub label: String,
}

/// A fired event, ready for presentation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggeredEvent {
    pub event_id: String,
    pub title: String,
    pub choices: Vec<ChoiceView>,
}

/// One recorded choice execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceExecution {
    pub day: Day,
    pub event_id: String,
    pub choice_id: String,
    pub results: Vec<EffectResult>,
}

/// Why [`EventScheduler::execute_choice`] refused to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceRejection {
    UnknownEvent,
    UnknownChoice,
    /// The world moved since presentation and the conditions no longer hold
    ConditionsNotMet,
}

/// Owns the event book and the bounded execution history
pub struct EventScheduler {
    book: EventBook,
    history: Vec<ChoiceExecution>,
    history_cap: usize,
    history_trim: usize,
}

impl EventScheduler {
    pub fn new(book: EventBook, config: &SimConfig) -> Self {
        Self {
            book,
            history: Vec::new(),
            history_cap: config.events.execution_history_cap,
            history_trim: config.events.execution_history_trim,
        }
    }

    pub fn book(&self) -> &EventBook {
        &self.book
    }

    /// Daily random trigger: flat gate, then the eligible random pool
    pub fn process_random_events(
        &self,
        world: &mut WorldState,
        config: &SimConfig,
    ) -> Option<TriggeredEvent> {
        if world.rng.gen::<f64>() >= config.events.random_event_chance {
            return None;
        }
        self.fire_from(EventCategory::Random, world, config)
    }

    /// Daily conflict trigger: gate on the probability model, then the
    /// eligible conflict pool. An empty building never riots.
    pub fn process_conflict_events(
        &self,
        world: &mut WorldState,
        config: &SimConfig,
    ) -> Option<TriggeredEvent> {
        let avg = world.satisfaction.average()?;
        let elder_present = world
            .tenants
            .count_matching(TenantFilter::Kind(TenantKind::Elder))
            > 0;
        let p = conflict_probability(
            world.tenants.present_count(),
            avg,
            world.any_resource_scarce(),
            elder_present,
            &config.conflict,
        );
        if world.rng.gen::<f64>() >= p {
            return None;
        }
        self.fire_from(EventCategory::Conflict, world, config)
    }

    /// Daily special trigger: checked every day, no gate
    pub fn process_special_events(
        &self,
        world: &mut WorldState,
        config: &SimConfig,
    ) -> Option<TriggeredEvent> {
        self.fire_from(EventCategory::Special, world, config)
    }

    /// Fire a scripted event by id. None when the id is unknown, the
    /// event is not scripted, or its trigger conditions fail.
    pub fn trigger_scripted(
        &self,
        world: &mut WorldState,
        event_id: &str,
        config: &SimConfig,
    ) -> Option<TriggeredEvent> {
        let event = self.book.get(event_id)?;
        if event.category != EventCategory::Scripted {
            tracing::warn!("event '{}' is not scripted, refusing to fire", event_id);
            return None;
        }
        if !evaluate_all(&event.conditions, world, config) {
            tracing::debug!("scripted event '{}' conditions failed", event_id);
            return None;
        }
        Some(self.build_triggered(event, world, config))
    }

    fn fire_from(
        &self,
        category: EventCategory,
        world: &mut WorldState,
        config: &SimConfig,
    ) -> Option<TriggeredEvent> {
        let mut eligible: Vec<&EventDef> = Vec::new();
        for event in self.book.by_category(category) {
            if evaluate_all(&event.conditions, world, config) {
                eligible.push(event);
            }
        }
        let chosen = pick_by_priority(&eligible, world)?;
        Some(self.build_triggered(chosen, world, config))
    }

    /// Union of static choices that pass their conditions and extra
    /// choices evaluated one by one
    fn build_triggered(
        &self,
        event: &EventDef,
        world: &mut WorldState,
        config: &SimConfig,
    ) -> TriggeredEvent {
        let mut choices = Vec::new();
        for choice in &event.choices {
            if evaluate_all(&choice.conditions, world, config) {
                choices.push(ChoiceView {
                    id: choice.id.clone(),
                    label: choice.label.clone(),
                });
            }
        }
        for extra in &event.extra_choices {
            if evaluate_all(&extra.conditions, world, config) {
                choices.push(ChoiceView {
                    id: extra.id.clone(),
                    label: extra.label.clone(),
                });
            }
        }
        tracing::info!("event '{}' fired with {} choices", event.id, choices.len());
        TriggeredEvent {
            event_id: event.id.clone(),
            title: event.title.clone(),
            choices,
        }
    }

    /// Re-validate and run one choice, recording the execution.
    ///
    /// Conditions are checked again here because the world may have
    /// moved between presentation and selection.
    pub fn execute_choice(
        &mut self,
        world: &mut WorldState,
        event_id: &str,
        choice_id: &str,
        config: &SimConfig,
        sink: &mut dyn NotificationSink,
    ) -> std::result::Result<ChoiceExecution, ChoiceRejection> {
        let Some(event) = self.book.get(event_id) else {
            return Err(ChoiceRejection::UnknownEvent);
        };
        let Some(choice) = event
            .choices
            .iter()
            .chain(event.extra_choices.iter())
            .find(|c| c.id == choice_id)
        else {
            return Err(ChoiceRejection::UnknownChoice);
        };
        if !evaluate_all(&choice.conditions, world, config) {
            tracing::debug!("choice '{}/{}' failed revalidation", event_id, choice_id);
            return Err(ChoiceRejection::ConditionsNotMet);
        }

        let origin = format!("{}/{}", event_id, choice_id);
        let results = execute_all(&choice.effects, world, &origin, sink);
        let execution = ChoiceExecution {
            day: world.day,
            event_id: event_id.to_string(),
            choice_id: choice_id.to_string(),
            results,
        };
        self.history.push(execution.clone());
        if self.history.len() > self.history_cap {
            let excess = self.history.len() - self.history_trim;
            self.history.drain(..excess);
        }
        Ok(execution)
    }

    pub fn history(&self) -> &[ChoiceExecution] {
        &self.history
    }
}

/// Highest priority wins outright; ties break uniformly at random.
fn pick_by_priority<'a>(
    candidates: &[&'a EventDef],
    world: &mut WorldState,
) -> Option<&'a EventDef> {
    let top = candidates.iter().map(|e| OrderedFloat(e.priority)).max()?;
    let top_tier: Vec<&EventDef> = candidates
        .iter()
        .copied()
        .filter(|e| OrderedFloat(e.priority) == top)
        .collect();
    let index = world.rng.gen_range(0..top_tier.len());
    Some(top_tier[index])
}
