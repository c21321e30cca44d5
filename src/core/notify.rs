//! Notification sink seam between the simulation and its host
//!
//! The core never talks to a UI directly. Anything a player should see
//! goes through [`NotificationSink`]; the host injects whichever
//! implementation it wants. All methods are fire-and-forget with empty
//! default bodies, so a sink only implements what it cares about.

use serde::{Deserialize, Serialize};

use crate::core::types::{ResourceKind, TenantId};
use crate::economy::thresholds::StockSeverity;
use crate::tenancy::conflict::ConflictEvent;
use crate::tenancy::satisfaction::SatisfactionBand;

/// Tone of a human-readable log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Danger,
}

impl NoticeKind {
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "info" => Some(NoticeKind::Info),
            "success" => Some(NoticeKind::Success),
            "warning" => Some(NoticeKind::Warning),
            "danger" => Some(NoticeKind::Danger),
            _ => None,
        }
    }
}

/// Receiver for user-facing simulation output
pub trait NotificationSink {
    /// Human-readable log line
    fn notice(&mut self, _kind: NoticeKind, _message: &str) {}

    /// Stock crossed into warning or worse after a ledger write
    fn resource_alert(&mut self, _kind: ResourceKind, _severity: StockSeverity, _stock: u64) {}

    /// A tenant's satisfaction band worsened into warning or critical
    fn satisfaction_alert(
        &mut self,
        _tenant: TenantId,
        _old: SatisfactionBand,
        _new: SatisfactionBand,
        _score: i32,
    ) {
    }

    /// The detector raised a new conflict
    fn conflict_raised(&mut self, _conflict: &ConflictEvent) {}
}

/// Routes notifications to the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notice(&mut self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Info | NoticeKind::Success => tracing::info!("{}", message),
            NoticeKind::Warning => tracing::warn!("{}", message),
            NoticeKind::Danger => tracing::error!("{}", message),
        }
    }

    fn resource_alert(&mut self, kind: ResourceKind, severity: StockSeverity, stock: u64) {
        tracing::warn!("{} stock at {} ({:?})", kind, stock, severity);
    }

    fn satisfaction_alert(
        &mut self,
        tenant: TenantId,
        old: SatisfactionBand,
        new: SatisfactionBand,
        score: i32,
    ) {
        tracing::warn!(
            "tenant {:?} satisfaction slipped {:?} -> {:?} ({})",
            tenant,
            old,
            new,
            score
        );
    }

    fn conflict_raised(&mut self, conflict: &ConflictEvent) {
        tracing::warn!(
            "conflict {:?} ({:?}, severity {}) involving {} tenants",
            conflict.id,
            conflict.kind,
            conflict.severity,
            conflict.involved.len()
        );
    }
}

/// Discards everything. Handy default for tests and benchmarks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_kind_from_key() {
        assert_eq!(NoticeKind::from_key("info"), Some(NoticeKind::Info));
        assert_eq!(NoticeKind::from_key("DANGER"), Some(NoticeKind::Danger));
        assert_eq!(NoticeKind::from_key("shout"), None);
    }

    #[test]
    fn test_null_sink_accepts_everything() {
        let mut sink = NullSink;
        sink.notice(NoticeKind::Info, "quiet day");
        sink.resource_alert(ResourceKind::Food, StockSeverity::Warning, 12);
    }
}
