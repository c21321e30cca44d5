//! Resource ledger - block-level stockpile with a bounded audit history
//!
//! All landlord stock mutation funnels through [`ResourceLedger::modify`]
//! (clamping) or [`ResourceLedger::modify_checked`] (rejecting). Tenant
//! pockets share the same [`ResourceStore`] shape and move value only
//! through [`transfer_resources`], which is all-or-nothing.

use std::collections::VecDeque;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::{SimConfig, ThresholdConfig};
use crate::core::notify::NotificationSink;
use crate::core::types::{Day, ResourceKind, TenantId};
use crate::economy::thresholds::{classify, StockSeverity};
use crate::world::tenants::TenantRegistry;

/// A plain resource store: kind -> non-negative amount.
///
/// Used for the landlord stockpile and for tenant pockets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceStore {
    amounts: AHashMap<ResourceKind, u64>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_amounts(pairs: &[(ResourceKind, u64)]) -> Self {
        let mut store = Self::new();
        for (kind, amount) in pairs {
            store.add(*kind, *amount);
        }
        store
    }

    pub fn get(&self, kind: ResourceKind) -> u64 {
        self.amounts.get(&kind).copied().unwrap_or(0)
    }

    pub fn set(&mut self, kind: ResourceKind, amount: u64) {
        self.amounts.insert(kind, amount);
    }

    pub fn add(&mut self, kind: ResourceKind, amount: u64) {
        let entry = self.amounts.entry(kind).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Remove up to `amount`, returns how much was actually removed
    pub fn remove(&mut self, kind: ResourceKind, amount: u64) -> u64 {
        if let Some(entry) = self.amounts.get_mut(&kind) {
            let removed = amount.min(*entry);
            *entry -= removed;
            removed
        } else {
            0
        }
    }

    pub fn has(&self, kind: ResourceKind, amount: u64) -> bool {
        self.get(kind) >= amount
    }
}

/// One ledger write. `delta` is the requested change; `old`/`new` carry
/// the clamped result actually applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceChange {
    pub kind: ResourceKind,
    pub old: u64,
    pub new: u64,
    pub delta: i64,
    pub reason: String,
    pub source: String,
    pub day: Day,
}

/// A side of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Landlord,
    Tenant(TenantId),
}

/// One attempted transfer, kept whether or not it went through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    pub from: Party,
    pub to: Party,
    pub resources: Vec<(ResourceKind, u64)>,
    pub reason: String,
    pub day: Day,
    pub success: bool,
}

/// Landlord stockpile plus the bounded modification/transfer logs
#[derive(Debug, Clone)]
pub struct ResourceLedger {
    stock: ResourceStore,
    history: VecDeque<ResourceChange>,
    transfers: VecDeque<TransferRecord>,
    thresholds: ThresholdConfig,
    history_cap: usize,
    transfer_cap: usize,
}

impl ResourceLedger {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            stock: ResourceStore::new(),
            history: VecDeque::new(),
            transfers: VecDeque::new(),
            thresholds: config.thresholds.clone(),
            history_cap: config.history.ledger_cap,
            transfer_cap: config.history.transfer_cap,
        }
    }

    /// Setup-only write: no history record, no alerts
    pub fn set_stock(&mut self, kind: ResourceKind, amount: u64) {
        self.stock.set(kind, amount);
    }

    pub fn amount(&self, kind: ResourceKind) -> u64 {
        self.stock.get(kind)
    }

    /// Current stock plus its severity band
    pub fn status(&self, kind: ResourceKind) -> (u64, StockSeverity) {
        let amount = self.stock.get(kind);
        (amount, classify(amount, self.thresholds.bands(kind)))
    }

    /// Stock of every kind, in declaration order
    pub fn snapshot(&self) -> Vec<(ResourceKind, u64)> {
        ResourceKind::ALL
            .iter()
            .map(|kind| (*kind, self.stock.get(*kind)))
            .collect()
    }

    /// Bookkeeping write path: clamps at zero, always applies.
    ///
    /// Appends a history record and raises a sink alert when the new
    /// stock lands at warning or worse. Returns whether the write
    /// applied (the clamping path always does).
    pub fn modify(
        &mut self,
        kind: ResourceKind,
        delta: i64,
        reason: &str,
        source: &str,
        day: Day,
        sink: &mut dyn NotificationSink,
    ) -> bool {
        let old = self.stock.get(kind);
        let new = if delta >= 0 {
            old.saturating_add(delta as u64)
        } else {
            old.saturating_sub(delta.unsigned_abs())
        };
        self.stock.set(kind, new);
        self.push_change(ResourceChange {
            kind,
            old,
            new,
            delta,
            reason: reason.to_string(),
            source: source.to_string(),
            day,
        });

        let severity = classify(new, self.thresholds.bands(kind));
        if severity.is_alarming() {
            sink.resource_alert(kind, severity, new);
        }
        true
    }

    /// Validated write path: rejects an over-draft outright.
    ///
    /// Returns false and leaves stock and history untouched when the
    /// delta would take the kind below zero.
    pub fn modify_checked(
        &mut self,
        kind: ResourceKind,
        delta: i64,
        reason: &str,
        source: &str,
        day: Day,
        sink: &mut dyn NotificationSink,
    ) -> bool {
        if delta < 0 && self.stock.get(kind) < delta.unsigned_abs() {
            tracing::debug!(
                "rejected {} write of {} against stock {}",
                kind,
                delta,
                self.stock.get(kind)
            );
            return false;
        }
        self.modify(kind, delta, reason, source, day, sink)
    }

    pub fn history(&self) -> impl Iterator<Item = &ResourceChange> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn transfers(&self) -> impl Iterator<Item = &TransferRecord> {
        self.transfers.iter()
    }

    fn push_change(&mut self, change: ResourceChange) {
        self.history.push_back(change);
        while self.history.len() > self.history_cap {
            self.history.pop_front();
        }
    }

    fn push_transfer(&mut self, record: TransferRecord) {
        self.transfers.push_back(record);
        while self.transfers.len() > self.transfer_cap {
            self.transfers.pop_front();
        }
    }
}

/// Move resources between the landlord stockpile and tenant pockets.
///
/// All-or-nothing: every entry is validated against the source before
/// anything moves. Any shortfall (or a missing tenant) rejects the whole
/// transfer and records it with `success: false`. Duplicate kinds in the
/// bundle are aggregated before validation so they cannot slip past it.
pub fn transfer_resources(
    ledger: &mut ResourceLedger,
    tenants: &mut TenantRegistry,
    from: Party,
    to: Party,
    bundle: &[(ResourceKind, u64)],
    reason: &str,
    day: Day,
    sink: &mut dyn NotificationSink,
) -> bool {
    let mut wanted: AHashMap<ResourceKind, u64> = AHashMap::new();
    for (kind, amount) in bundle {
        *wanted.entry(*kind).or_insert(0) += amount;
    }
    let resources: Vec<(ResourceKind, u64)> =
        wanted.iter().map(|(kind, amount)| (*kind, *amount)).collect();

    let available = |party: Party,
                     kind: ResourceKind,
                     ledger: &ResourceLedger,
                     tenants: &TenantRegistry| match party {
        Party::Landlord => Some(ledger.amount(kind)),
        Party::Tenant(id) => tenants.get(id).map(|t| t.pocket.get(kind)),
    };

    let valid = resources.iter().all(|(kind, amount)| {
        available(from, *kind, ledger, tenants).is_some_and(|have| have >= *amount)
    }) && match to {
        Party::Landlord => true,
        Party::Tenant(id) => tenants.get(id).is_some(),
    };

    if !valid {
        tracing::debug!("transfer {:?} -> {:?} rejected ({})", from, to, reason);
        ledger.push_transfer(TransferRecord {
            from,
            to,
            resources,
            reason: reason.to_string(),
            day,
            success: false,
        });
        return false;
    }

    for (kind, amount) in &resources {
        match from {
            Party::Landlord => {
                ledger.modify(*kind, -(*amount as i64), reason, "transfer", day, sink);
            }
            Party::Tenant(id) => {
                if let Some(tenant) = tenants.get_mut(id) {
                    tenant.pocket.remove(*kind, *amount);
                }
            }
        }
        match to {
            Party::Landlord => {
                ledger.modify(*kind, *amount as i64, reason, "transfer", day, sink);
            }
            Party::Tenant(id) => {
                if let Some(tenant) = tenants.get_mut(id) {
                    tenant.pocket.add(*kind, *amount);
                }
            }
        }
    }

    ledger.push_transfer(TransferRecord {
        from,
        to,
        resources,
        reason: reason.to_string(),
        day,
        success: true,
    });
    true
}
