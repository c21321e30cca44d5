//! Scarcity analysis - how bad is it, and how long until it runs out
//!
//! Consumption is observed once per day and folded into a smoothed
//! per-kind rate; reports are derived on demand and never stored.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::ThresholdBands;
use crate::core::types::ResourceKind;

/// Depletion estimates cap here; also reported when consumption is zero
pub const DEPLETION_SENTINEL: u64 = 9999;

/// Direction the smoothed consumption rate is moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionTrend {
    Increasing,
    Stable,
    Decreasing,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct RateTrack {
    rate: f64,
    prev_rate: f64,
    sampled: bool,
}

/// Rolling per-kind daily consumption estimates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionStats {
    tracks: AHashMap<ResourceKind, RateTrack>,
    /// Weight of the newest observation
    smoothing: f64,
}

impl ConsumptionStats {
    pub fn new(smoothing: f64) -> Self {
        Self {
            tracks: AHashMap::new(),
            smoothing,
        }
    }

    /// Fold one day's observed consumption into the smoothed rate.
    /// The first sample seeds the rate directly so early depletion
    /// estimates are not dragged toward zero.
    pub fn record_day(&mut self, kind: ResourceKind, consumed: u64) {
        let track = self.tracks.entry(kind).or_default();
        track.prev_rate = track.rate;
        if track.sampled {
            track.rate =
                track.rate * (1.0 - self.smoothing) + consumed as f64 * self.smoothing;
        } else {
            track.rate = consumed as f64;
            track.prev_rate = track.rate;
            track.sampled = true;
        }
    }

    pub fn daily_rate(&self, kind: ResourceKind) -> f64 {
        self.tracks.get(&kind).map(|t| t.rate).unwrap_or(0.0)
    }

    /// Trend of the smoothed rate, banded at +/- 0.1 per day
    pub fn trend(&self, kind: ResourceKind) -> ConsumptionTrend {
        let track = self.tracks.get(&kind).copied().unwrap_or_default();
        let derivative = track.rate - track.prev_rate;
        if derivative > 0.1 {
            ConsumptionTrend::Increasing
        } else if derivative < -0.1 {
            ConsumptionTrend::Decreasing
        } else {
            ConsumptionTrend::Stable
        }
    }
}

/// On-demand scarcity report for one resource kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScarcityReport {
    pub kind: ResourceKind,
    /// 0 = swimming in it, 100 = gone
    pub scarcity_index: f64,
    pub daily_rate: f64,
    pub trend: ConsumptionTrend,
    /// Whole days of stock left at the current rate, capped at the sentinel
    pub depletion_days: u64,
}

/// Derive the scarcity picture for one kind from current stock, the
/// smoothed consumption rate, and the configured warning cutoff.
///
/// `scarcity_index = clamp(0, 100, 100 - stock / (warning * 3) * 100)`,
/// so the index hits zero once stock reaches three warning-bands worth.
pub fn analyze_scarcity(
    kind: ResourceKind,
    stock: u64,
    stats: &ConsumptionStats,
    bands: ThresholdBands,
) -> ScarcityReport {
    let ceiling = (bands.warning * 3).max(1) as f64;
    let scarcity_index = (100.0 - stock as f64 / ceiling * 100.0).clamp(0.0, 100.0);

    let daily_rate = stats.daily_rate(kind);
    let depletion_days = if daily_rate > 0.0 {
        ((stock as f64 / daily_rate).floor() as u64).min(DEPLETION_SENTINEL)
    } else {
        DEPLETION_SENTINEL
    };

    ScarcityReport {
        kind,
        scarcity_index,
        daily_rate,
        trend: stats.trend(kind),
        depletion_days,
    }
}
