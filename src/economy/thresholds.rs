//! Stock severity banding
//!
//! Maps a raw stock level to one of five severity bands using the
//! configured per-kind cutoffs. Banding is the shared vocabulary for
//! alerts, scarcity conditions, and the conflict gate.

use serde::{Deserialize, Serialize};

use crate::core::config::ThresholdBands;

/// Severity band for a stock level, worst first.
///
/// Ordering follows abundance: `Emergency < Critical < ... < Abundant`,
/// so a greater band always means more stock headroom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockSeverity {
    Emergency,
    Critical,
    Warning,
    Normal,
    Abundant,
}

impl StockSeverity {
    /// Warning or worse
    pub fn is_alarming(&self) -> bool {
        matches!(
            self,
            StockSeverity::Emergency | StockSeverity::Critical | StockSeverity::Warning
        )
    }
}

/// Classify a stock level against its cutoffs, lowest band first.
///
/// Boundaries are inclusive on the lower band: a stock exactly at the
/// emergency cutoff is an emergency. The abundant band starts above
/// `warning * 2`.
pub fn classify(stock: u64, bands: ThresholdBands) -> StockSeverity {
    if stock <= bands.emergency {
        StockSeverity::Emergency
    } else if stock <= bands.critical {
        StockSeverity::Critical
    } else if stock <= bands.warning {
        StockSeverity::Warning
    } else if stock <= bands.warning * 2 {
        StockSeverity::Normal
    } else {
        StockSeverity::Abundant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands() -> ThresholdBands {
        ThresholdBands { warning: 20, critical: 10, emergency: 5 }
    }

    #[test]
    fn test_classify_bands() {
        assert_eq!(classify(0, bands()), StockSeverity::Emergency);
        assert_eq!(classify(5, bands()), StockSeverity::Emergency);
        assert_eq!(classify(6, bands()), StockSeverity::Critical);
        assert_eq!(classify(10, bands()), StockSeverity::Critical);
        assert_eq!(classify(11, bands()), StockSeverity::Warning);
        assert_eq!(classify(20, bands()), StockSeverity::Warning);
        assert_eq!(classify(21, bands()), StockSeverity::Normal);
        assert_eq!(classify(40, bands()), StockSeverity::Normal);
        assert_eq!(classify(41, bands()), StockSeverity::Abundant);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let mut previous = classify(0, bands());
        for stock in 1..100 {
            let current = classify(stock, bands());
            assert!(
                current >= previous,
                "stock {} classified {:?}, below {:?} at {}",
                stock,
                current,
                previous,
                stock - 1
            );
            previous = current;
        }
    }

    #[test]
    fn test_alarming_bands() {
        assert!(StockSeverity::Emergency.is_alarming());
        assert!(StockSeverity::Critical.is_alarming());
        assert!(StockSeverity::Warning.is_alarming());
        assert!(!StockSeverity::Normal.is_alarming());
        assert!(!StockSeverity::Abundant.is_alarming());
    }
}
