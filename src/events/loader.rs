//! TOML event definitions
//!
//! Same two-step shape as config loading: raw serde structs mirror the
//! file, then convert into the typed enums with load-time validation.
//! Unknown condition and effect kinds survive conversion as `Unknown`
//! variants (false / skip at runtime); structural problems inside a
//! known kind are hard errors, as are duplicate ids, non-finite
//! numbers, and condition trees past the configured depth.

use std::path::Path;

use ahash::AHashSet;
use serde::Deserialize;

use crate::core::config::SimConfig;
use crate::core::error::{CoreError, Result};
use crate::core::notify::NoticeKind;
use crate::core::types::{ResourceKind, TenantFilter, TenantKind};
use crate::events::condition::{Condition, ScarcityLevel};
use crate::events::definitions::{Choice, EventBook, EventCategory, EventDef};
use crate::events::effect::{ChanceModifier, ChanceSpec, Effect, StateOp};
use crate::world::state::{GlobalFlag, StatePath};

#[derive(Debug, Deserialize)]
struct TomlEventFile {
    #[serde(default)]
    events: Vec<TomlEvent>,
}

#[derive(Debug, Deserialize)]
struct TomlEvent {
    id: String,
    title: String,
    category: String,
    #[serde(default = "default_priority")]
    priority: f64,
    #[serde(default)]
    conditions: Vec<TomlCondition>,
    #[serde(default)]
    choices: Vec<TomlChoice>,
    #[serde(default)]
    extra_choices: Vec<TomlChoice>,
}

fn default_priority() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
struct TomlChoice {
    id: String,
    label: String,
    #[serde(default)]
    conditions: Vec<TomlCondition>,
    #[serde(default)]
    effects: Vec<TomlEffect>,
}

#[derive(Debug, Clone, Deserialize)]
struct TomlCondition {
    kind: String,
    resource: Option<String>,
    amount: Option<u64>,
    min: Option<u64>,
    max: Option<u64>,
    tenant: Option<String>,
    count: Option<usize>,
    chance: Option<f64>,
    level: Option<String>,
    conditions: Option<Vec<TomlCondition>>,
}

#[derive(Debug, Clone, Deserialize)]
struct TomlEffect {
    kind: String,
    resource: Option<String>,
    amount: Option<i64>,
    message: Option<String>,
    log: Option<String>,
    chance: Option<TomlChance>,
    success: Option<Vec<TomlEffect>>,
    failure: Option<Vec<TomlEffect>>,
    target: Option<String>,
    effects: Option<Vec<TomlEffect>>,
    path: Option<String>,
    value: Option<f64>,
    op: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TomlChance {
    base: f64,
    #[serde(default)]
    modifiers: Vec<TomlChanceModifier>,
}

#[derive(Debug, Clone, Deserialize)]
struct TomlChanceModifier {
    kind: String,
    tenant: Option<String>,
    per: Option<f64>,
    flag: Option<String>,
    bonus: Option<f64>,
}

/// Parse event definitions from TOML text and validate them
pub fn parse_event_book(content: &str, config: &SimConfig) -> Result<EventBook> {
    let raw: TomlEventFile = toml::from_str(content)?;
    let mut book = EventBook::new();
    for event in &raw.events {
        book.add(convert_event(event)?);
    }
    validate_book(&book, config)?;
    Ok(book)
}

/// Load event definitions from a TOML file
pub fn load_event_book(path: &Path, config: &SimConfig) -> Result<EventBook> {
    let content = std::fs::read_to_string(path)?;
    parse_event_book(&content, config)
}

/// Validate an assembled book: unique event and choice ids, finite
/// priorities, at least one choice per event, condition depth within
/// the configured limit. Also applies to programmatically built books.
pub fn validate_book(book: &EventBook, config: &SimConfig) -> Result<()> {
    let mut seen = AHashSet::new();
    for event in book.all() {
        if !seen.insert(event.id.as_str()) {
            return Err(definition_error(&event.id, "duplicate event id"));
        }
        if !event.priority.is_finite() {
            return Err(definition_error(
                &event.id,
                format!("priority must be finite (got {})", event.priority),
            ));
        }
        if event.choices.is_empty() && event.extra_choices.is_empty() {
            return Err(definition_error(&event.id, "event needs at least one choice"));
        }
        let mut choice_ids = AHashSet::new();
        for choice in event.choices.iter().chain(event.extra_choices.iter()) {
            if !choice_ids.insert(choice.id.as_str()) {
                return Err(definition_error(
                    &event.id,
                    format!("duplicate choice id '{}'", choice.id),
                ));
            }
        }
        let depth = event.max_condition_depth();
        if depth > config.events.max_condition_depth {
            return Err(definition_error(
                &event.id,
                format!(
                    "condition depth {} exceeds the limit of {}",
                    depth, config.events.max_condition_depth
                ),
            ));
        }
    }
    Ok(())
}

fn definition_error(id: &str, message: impl Into<String>) -> CoreError {
    CoreError::EventDefinition {
        id: id.to_string(),
        message: message.into(),
    }
}

fn convert_event(raw: &TomlEvent) -> Result<EventDef> {
    let category = EventCategory::from_key(&raw.category)
        .ok_or_else(|| definition_error(&raw.id, format!("unknown category '{}'", raw.category)))?;
    let conditions = raw
        .conditions
        .iter()
        .map(|c| convert_condition(c, &raw.id))
        .collect::<Result<Vec<_>>>()?;
    let choices = raw
        .choices
        .iter()
        .map(|c| convert_choice(c, &raw.id))
        .collect::<Result<Vec<_>>>()?;
    let extra_choices = raw
        .extra_choices
        .iter()
        .map(|c| convert_choice(c, &raw.id))
        .collect::<Result<Vec<_>>>()?;
    Ok(EventDef {
        id: raw.id.clone(),
        title: raw.title.clone(),
        category,
        priority: raw.priority,
        conditions,
        choices,
        extra_choices,
    })
}

fn convert_choice(raw: &TomlChoice, event_id: &str) -> Result<Choice> {
    let conditions = raw
        .conditions
        .iter()
        .map(|c| convert_condition(c, event_id))
        .collect::<Result<Vec<_>>>()?;
    let effects = raw
        .effects
        .iter()
        .map(|e| convert_effect(e, event_id))
        .collect::<Result<Vec<_>>>()?;
    Ok(Choice {
        id: raw.id.clone(),
        label: raw.label.clone(),
        conditions,
        effects,
    })
}

fn convert_condition(raw: &TomlCondition, event_id: &str) -> Result<Condition> {
    let kind = raw.kind.to_lowercase();
    match kind.as_str() {
        "has_resource" => {
            let resource = parse_resource(raw.resource.as_deref(), event_id, &kind)?;
            let amount = raw
                .amount
                .ok_or_else(|| definition_error(event_id, "has_resource needs an amount"))?;
            Ok(Condition::HasResource { resource, amount })
        }
        "day_range" => {
            if raw.min.is_none() && raw.max.is_none() {
                return Err(definition_error(event_id, "day_range needs min or max"));
            }
            Ok(Condition::DayRange {
                min: raw.min,
                max: raw.max,
            })
        }
        "has_tenant_kind" => {
            let key = raw.tenant.as_deref().ok_or_else(|| {
                definition_error(event_id, "has_tenant_kind needs a tenant selector")
            })?;
            let filter = TenantFilter::from_key(key).ok_or_else(|| {
                definition_error(event_id, format!("unknown tenant selector '{}'", key))
            })?;
            Ok(Condition::HasTenantKind {
                filter,
                count: raw.count.unwrap_or(1),
            })
        }
        "probability" => {
            let chance = raw
                .chance
                .ok_or_else(|| definition_error(event_id, "probability needs a chance"))?;
            check_unit_interval(chance, event_id, "probability chance")?;
            Ok(Condition::Probability { chance })
        }
        "resource_scarcity" => {
            let resource = parse_resource(raw.resource.as_deref(), event_id, &kind)?;
            let key = raw.level.as_deref().unwrap_or("insufficient");
            let level = ScarcityLevel::from_key(key).ok_or_else(|| {
                definition_error(event_id, format!("unknown scarcity level '{}'", key))
            })?;
            Ok(Condition::ResourceScarcity { resource, level })
        }
        "all" | "any_of" => {
            let children = raw
                .conditions
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .map(|c| convert_condition(c, event_id))
                .collect::<Result<Vec<_>>>()?;
            if kind == "all" {
                Ok(Condition::All { conditions: children })
            } else {
                Ok(Condition::AnyOf { conditions: children })
            }
        }
        _ => Ok(Condition::Unknown { kind: raw.kind.clone() }),
    }
}

fn convert_effect(raw: &TomlEffect, event_id: &str) -> Result<Effect> {
    let kind = raw.kind.to_lowercase();
    match kind.as_str() {
        "modify_resource" => {
            let resource = parse_resource(raw.resource.as_deref(), event_id, &kind)?;
            let amount = raw
                .amount
                .ok_or_else(|| definition_error(event_id, "modify_resource needs an amount"))?;
            Ok(Effect::ModifyResource { resource, amount })
        }
        "log_message" => {
            let message = raw
                .message
                .clone()
                .ok_or_else(|| definition_error(event_id, "log_message needs a message"))?;
            let log_key = raw.log.as_deref().unwrap_or("info");
            let notice = NoticeKind::from_key(log_key).ok_or_else(|| {
                definition_error(event_id, format!("unknown log kind '{}'", log_key))
            })?;
            Ok(Effect::LogMessage {
                message,
                kind: notice,
            })
        }
        "damage_random_room" => Ok(Effect::DamageRandomRoom),
        "probability_check" => {
            let chance = raw
                .chance
                .as_ref()
                .ok_or_else(|| definition_error(event_id, "probability_check needs a chance"))?;
            let spec = convert_chance(chance, event_id)?;
            let success = convert_branch(raw.success.as_deref(), event_id)?;
            let failure = convert_branch(raw.failure.as_deref(), event_id)?;
            Ok(Effect::ProbabilityCheck {
                chance: spec,
                success,
                failure,
            })
        }
        "remove_tenant" => {
            let key = raw
                .target
                .as_deref()
                .ok_or_else(|| definition_error(event_id, "remove_tenant needs a target"))?;
            let target = TenantFilter::from_key(key).ok_or_else(|| {
                definition_error(event_id, format!("unknown tenant target '{}'", key))
            })?;
            Ok(Effect::RemoveTenant { target })
        }
        "heal_tenant" => {
            // Healing without a target means "whoever is sick"
            let key = raw.target.as_deref().unwrap_or("infected");
            let target = TenantFilter::from_key(key).ok_or_else(|| {
                definition_error(event_id, format!("unknown tenant target '{}'", key))
            })?;
            Ok(Effect::HealTenant { target })
        }
        "soldier_bonus" => {
            let effects = convert_branch(raw.effects.as_deref(), event_id)?;
            Ok(Effect::SoldierBonus { effects })
        }
        "modify_state" => {
            let path_key = raw
                .path
                .as_deref()
                .ok_or_else(|| definition_error(event_id, "modify_state needs a path"))?;
            let value = raw
                .value
                .ok_or_else(|| definition_error(event_id, "modify_state needs a value"))?;
            check_finite(value, event_id, "modify_state value")?;
            let op_key = raw.op.as_deref().unwrap_or("set");
            let op = StateOp::from_key(op_key).ok_or_else(|| {
                definition_error(event_id, format!("unknown state op '{}'", op_key))
            })?;
            // Unaddressable paths degrade to Unknown rather than erroring
            match StatePath::from_key(path_key) {
                Some(path) => Ok(Effect::ModifyState { path, value, op }),
                None => Ok(Effect::Unknown {
                    kind: format!("modify_state:{}", path_key),
                }),
            }
        }
        _ => Ok(Effect::Unknown { kind: raw.kind.clone() }),
    }
}

fn convert_branch(raw: Option<&[TomlEffect]>, event_id: &str) -> Result<Vec<Effect>> {
    raw.unwrap_or(&[])
        .iter()
        .map(|e| convert_effect(e, event_id))
        .collect()
}

fn convert_chance(raw: &TomlChance, event_id: &str) -> Result<ChanceSpec> {
    check_finite(raw.base, event_id, "chance base")?;
    let modifiers = raw
        .modifiers
        .iter()
        .map(|m| convert_modifier(m, event_id))
        .collect::<Result<Vec<_>>>()?;
    Ok(ChanceSpec {
        base: raw.base,
        modifiers,
    })
}

fn convert_modifier(raw: &TomlChanceModifier, event_id: &str) -> Result<ChanceModifier> {
    let kind = raw.kind.to_lowercase();
    match kind.as_str() {
        "per_tenant_kind" => {
            let key = raw
                .tenant
                .as_deref()
                .ok_or_else(|| definition_error(event_id, "per_tenant_kind needs a tenant"))?;
            let tenant = TenantKind::from_key(key).ok_or_else(|| {
                definition_error(event_id, format!("unknown occupation '{}'", key))
            })?;
            let per = raw
                .per
                .ok_or_else(|| definition_error(event_id, "per_tenant_kind needs per"))?;
            check_finite(per, event_id, "per_tenant_kind per")?;
            Ok(ChanceModifier::PerTenantKind { kind: tenant, per })
        }
        "per_defense_point" => {
            let per = raw
                .per
                .ok_or_else(|| definition_error(event_id, "per_defense_point needs per"))?;
            check_finite(per, event_id, "per_defense_point per")?;
            Ok(ChanceModifier::PerDefensePoint { per })
        }
        "flag_bonus" => {
            let key = raw
                .flag
                .as_deref()
                .ok_or_else(|| definition_error(event_id, "flag_bonus needs a flag"))?;
            let flag = GlobalFlag::from_key(key)
                .ok_or_else(|| definition_error(event_id, format!("unknown flag '{}'", key)))?;
            let bonus = raw
                .bonus
                .ok_or_else(|| definition_error(event_id, "flag_bonus needs a bonus"))?;
            check_finite(bonus, event_id, "flag_bonus bonus")?;
            Ok(ChanceModifier::FlagBonus { flag, bonus })
        }
        other => Err(definition_error(
            event_id,
            format!("unknown chance modifier '{}'", other),
        )),
    }
}

fn parse_resource(key: Option<&str>, event_id: &str, context: &str) -> Result<ResourceKind> {
    let key =
        key.ok_or_else(|| definition_error(event_id, format!("{} needs a resource", context)))?;
    ResourceKind::from_key(key)
        .ok_or_else(|| definition_error(event_id, format!("unknown resource '{}'", key)))
}

fn check_finite(value: f64, event_id: &str, what: &str) -> Result<()> {
    if !value.is_finite() {
        return Err(definition_error(
            event_id,
            format!("{} must be finite (got {})", what, value),
        ));
    }
    Ok(())
}

fn check_unit_interval(value: f64, event_id: &str, what: &str) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(definition_error(
            event_id,
            format!("{} must be within [0, 1] (got {})", what, value),
        ));
    }
    Ok(())
}
