//! Pairwise tenant relationships
//!
//! Stored under a canonical (low, high) id pair so lookups are direction
//! free. Seeded on hire, adjusted by effects and conflicts, averaged into
//! satisfaction.

use ahash::AHashMap;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::TenantId;

// ---------- Constants - seeding ----------

/// Fresh relationships center here (neutral)
pub const INITIAL_AFFINITY: i32 = 50;
/// Uniform jitter applied around the initial affinity
pub const INITIAL_SPREAD: i32 = 10;

/// Affinity range endpoints
pub const MIN_AFFINITY: i32 = 0;
pub const MAX_AFFINITY: i32 = 100;

fn pair_key(a: TenantId, b: TenantId) -> (TenantId, TenantId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// All relationships in the block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipBook {
    affinities: AHashMap<(TenantId, TenantId), i32>,
}

impl RelationshipBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create one relationship between the new tenant and every existing
    /// tenant, jittered around the neutral starting affinity.
    pub fn seed_for_new_tenant(
        &mut self,
        new_tenant: TenantId,
        existing: &[TenantId],
        rng: &mut ChaCha8Rng,
    ) {
        for other in existing {
            if *other == new_tenant {
                continue;
            }
            let affinity = INITIAL_AFFINITY + rng.gen_range(-INITIAL_SPREAD..=INITIAL_SPREAD);
            self.affinities.insert(
                pair_key(new_tenant, *other),
                affinity.clamp(MIN_AFFINITY, MAX_AFFINITY),
            );
        }
    }

    pub fn affinity(&self, a: TenantId, b: TenantId) -> Option<i32> {
        self.affinities.get(&pair_key(a, b)).copied()
    }

    pub fn set(&mut self, a: TenantId, b: TenantId, affinity: i32) {
        self.affinities
            .insert(pair_key(a, b), affinity.clamp(MIN_AFFINITY, MAX_AFFINITY));
    }

    /// Shift an existing relationship, clamped to the affinity range.
    /// Returns the new value, or None when the pair has no relationship.
    pub fn adjust(&mut self, a: TenantId, b: TenantId, delta: i32) -> Option<i32> {
        let entry = self.affinities.get_mut(&pair_key(a, b))?;
        *entry = (*entry + delta).clamp(MIN_AFFINITY, MAX_AFFINITY);
        Some(*entry)
    }

    /// Mean affinity across every relationship involving this tenant
    pub fn average_for(&self, tenant: TenantId) -> Option<f64> {
        let mut total = 0i64;
        let mut count = 0u32;
        for ((a, b), affinity) in &self.affinities {
            if *a == tenant || *b == tenant {
                total += *affinity as i64;
                count += 1;
            }
        }
        if count == 0 {
            None
        } else {
            Some(total as f64 / count as f64)
        }
    }

    /// Every pair at or below the cutoff, sorted by id pair so callers
    /// drawing randomness per pair stay deterministic.
    pub fn pairs_below(&self, cutoff: i32) -> Vec<((TenantId, TenantId), i32)> {
        let mut pairs: Vec<_> = self
            .affinities
            .iter()
            .filter(|(_, affinity)| **affinity < cutoff)
            .map(|(pair, affinity)| (*pair, *affinity))
            .collect();
        pairs.sort_by_key(|(pair, _)| *pair);
        pairs
    }

    /// Drop every relationship involving an evicted tenant
    pub fn remove_tenant(&mut self, tenant: TenantId) {
        self.affinities
            .retain(|(a, b), _| *a != tenant && *b != tenant);
    }

    pub fn len(&self) -> usize {
        self.affinities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.affinities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;

    #[test]
    fn test_seed_creates_one_per_existing() {
        let mut book = RelationshipBook::new();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let existing = vec![TenantId(1), TenantId(2), TenantId(3)];
        book.seed_for_new_tenant(TenantId(4), &existing, &mut rng);

        assert_eq!(book.len(), 3);
        for other in existing {
            let affinity = book.affinity(TenantId(4), other).unwrap();
            assert!(
                (INITIAL_AFFINITY - INITIAL_SPREAD..=INITIAL_AFFINITY + INITIAL_SPREAD)
                    .contains(&affinity),
                "seeded affinity {} outside jitter window",
                affinity
            );
        }
    }

    #[test]
    fn test_lookup_is_direction_free() {
        let mut book = RelationshipBook::new();
        book.set(TenantId(2), TenantId(1), 80);
        assert_eq!(book.affinity(TenantId(1), TenantId(2)), Some(80));
        assert_eq!(book.affinity(TenantId(2), TenantId(1)), Some(80));
    }

    #[test]
    fn test_adjust_clamps() {
        let mut book = RelationshipBook::new();
        book.set(TenantId(1), TenantId(2), 95);
        assert_eq!(book.adjust(TenantId(1), TenantId(2), 20), Some(100));
        assert_eq!(book.adjust(TenantId(1), TenantId(2), -150), Some(0));
        assert_eq!(book.adjust(TenantId(1), TenantId(9), 5), None);
    }

    #[test]
    fn test_average_for() {
        let mut book = RelationshipBook::new();
        book.set(TenantId(1), TenantId(2), 60);
        book.set(TenantId(1), TenantId(3), 40);
        book.set(TenantId(2), TenantId(3), 90);

        assert_eq!(book.average_for(TenantId(1)), Some(50.0));
        assert_eq!(book.average_for(TenantId(2)), Some(75.0));
        assert_eq!(book.average_for(TenantId(7)), None);
    }

    #[test]
    fn test_pairs_below_sorted() {
        let mut book = RelationshipBook::new();
        book.set(TenantId(5), TenantId(2), 10);
        book.set(TenantId(1), TenantId(3), 15);
        book.set(TenantId(1), TenantId(2), 50);

        let hostile = book.pairs_below(20);
        assert_eq!(hostile.len(), 2);
        assert_eq!(hostile[0].0, (TenantId(1), TenantId(3)));
        assert_eq!(hostile[1].0, (TenantId(2), TenantId(5)));
    }

    #[test]
    fn test_remove_tenant_drops_pairs() {
        let mut book = RelationshipBook::new();
        book.set(TenantId(1), TenantId(2), 50);
        book.set(TenantId(1), TenantId(3), 50);
        book.set(TenantId(2), TenantId(3), 50);

        book.remove_tenant(TenantId(1));
        assert_eq!(book.len(), 1);
        assert!(book.affinity(TenantId(2), TenantId(3)).is_some());
    }
}
