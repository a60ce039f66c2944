//! # Search Yield Table
//!
//! Weighted table turning raw entropy rolls into resource grants.
//!
//! One search performs `rolls` independent draws. Each draw picks an entry
//! with probability `weight / total_weight`, then a quantity uniformly in
//! `min_quantity..=max_quantity`. Draws of the same resource are summed and
//! zero-quantity draws are dropped, so a search may yield nothing.

use std::collections::BTreeMap;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use sich_shared::{ResourceId, RESOURCE_TYPE_COUNT};

use crate::entropy::EntropySource;
use crate::error::{EconomyError, EconomyResult};

/// Default number of draws per search.
pub const DEFAULT_ROLLS: u32 = 3;

/// One possible draw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldEntry {
    /// Resource granted.
    pub resource: ResourceId,
    /// Relative weight (higher = more common).
    pub weight: u32,
    /// Minimum quantity.
    pub min_quantity: u64,
    /// Maximum quantity.
    pub max_quantity: u64,
}

impl YieldEntry {
    /// Creates an entry.
    #[inline]
    #[must_use]
    pub const fn new(
        resource: ResourceId,
        weight: u32,
        min_quantity: u64,
        max_quantity: u64,
    ) -> Self {
        Self {
            resource,
            weight,
            min_quantity,
            max_quantity,
        }
    }
}

/// Weighted yield table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldTable {
    /// Draws per search.
    #[serde(default = "default_rolls")]
    pub rolls: u32,
    /// Possible draws.
    pub entries: Vec<YieldEntry>,
}

const fn default_rolls() -> u32 {
    DEFAULT_ROLLS
}

impl Default for YieldTable {
    fn default() -> Self {
        Self::uniform()
    }
}

impl YieldTable {
    /// Every resource type with equal weight, 1 to 3 units, three draws.
    #[must_use]
    pub fn uniform() -> Self {
        Self {
            rolls: DEFAULT_ROLLS,
            entries: (0..RESOURCE_TYPE_COUNT)
                .map(|raw| YieldEntry::new(ResourceId::new(raw), 1, 1, 3))
                .collect(),
        }
    }

    /// Sum of all entry weights.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.weight)).sum()
    }

    /// Checks the table is usable.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for unknown resource types, `min > max`, or a table
    /// that draws but has no weight.
    pub fn validate(&self) -> EconomyResult<()> {
        for entry in &self.entries {
            if entry.resource.get() >= RESOURCE_TYPE_COUNT {
                return Err(EconomyError::InvalidConfig(format!(
                    "yield entry uses unknown resource type {}",
                    entry.resource.get()
                )));
            }
            if entry.min_quantity > entry.max_quantity {
                return Err(EconomyError::InvalidConfig(format!(
                    "yield entry for {} has min {} > max {}",
                    entry.resource, entry.min_quantity, entry.max_quantity
                )));
            }
        }
        if self.rolls > 0 && self.total_weight() == 0 {
            return Err(EconomyError::InvalidConfig(
                "yield table draws but has zero total weight".to_string(),
            ));
        }
        Ok(())
    }

    /// Draws one search worth of resources, sorted by resource type.
    pub fn roll(
        &self,
        entropy: &mut dyn EntropySource,
        player: Address,
        timestamp: u64,
    ) -> Vec<(ResourceId, u64)> {
        let total_weight = self.total_weight();
        if total_weight == 0 {
            return Vec::new();
        }

        let mut granted: BTreeMap<ResourceId, u64> = BTreeMap::new();
        for _ in 0..self.rolls {
            let hash = entropy.next_roll(player, timestamp);
            let Some(entry) = self.pick(hash % total_weight) else {
                continue;
            };

            let span = entry.max_quantity - entry.min_quantity;
            let quantity = if span == 0 {
                entry.min_quantity
            } else {
                entry.min_quantity + (hash >> 32) % span.saturating_add(1)
            };
            if quantity == 0 {
                continue;
            }

            let total = granted.entry(entry.resource).or_insert(0);
            *total = total.saturating_add(quantity);
        }
        granted.into_iter().collect()
    }

    fn pick(&self, weight_roll: u64) -> Option<&YieldEntry> {
        let mut cumulative = 0u64;
        for entry in &self.entries {
            cumulative += u64::from(entry.weight);
            if weight_roll < cumulative {
                return Some(entry);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::RngEntropy;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sich_shared::{DIAMOND, GOLD, WOOD};

    const PLAYER: Address = Address::repeat_byte(0x07);

    #[test]
    fn test_uniform_table_is_valid() {
        let table = YieldTable::uniform();
        table.validate().unwrap();
        assert_eq!(table.entries.len(), RESOURCE_TYPE_COUNT as usize);
        assert_eq!(table.total_weight(), u64::from(RESOURCE_TYPE_COUNT));
    }

    #[test]
    fn test_scripted_roll() {
        // hash 0 -> Wood: hash % total weight picks the entry, high bits pick quantity.
        let table = YieldTable {
            rolls: 1,
            entries: vec![YieldEntry::new(WOOD, 1, 2, 2), YieldEntry::new(GOLD, 1, 5, 5)],
        };
        let mut entropy = RngEntropy::new(StepRng::new(1, 0));
        assert_eq!(table.roll(&mut entropy, PLAYER, 0), vec![(GOLD, 5)]);

        let mut entropy = RngEntropy::new(StepRng::new(0, 0));
        assert_eq!(table.roll(&mut entropy, PLAYER, 0), vec![(WOOD, 2)]);
    }

    #[test]
    fn test_duplicate_draws_are_summed() {
        let table = YieldTable {
            rolls: 4,
            entries: vec![YieldEntry::new(DIAMOND, 1, 1, 1)],
        };
        let mut entropy = RngEntropy::new(StepRng::new(0, 1));
        assert_eq!(table.roll(&mut entropy, PLAYER, 0), vec![(DIAMOND, 4)]);
    }

    #[test]
    fn test_zero_quantity_draws_are_dropped() {
        let table = YieldTable {
            rolls: 3,
            entries: vec![YieldEntry::new(WOOD, 1, 0, 0)],
        };
        let mut entropy = RngEntropy::new(StepRng::new(0, 1));
        assert!(table.roll(&mut entropy, PLAYER, 0).is_empty());
    }

    #[test]
    fn test_quantities_stay_in_range() {
        let table = YieldTable::uniform();
        let mut entropy = RngEntropy::new(ChaCha8Rng::seed_from_u64(7));
        for t in 0..1_000 {
            let total: u64 = table
                .roll(&mut entropy, PLAYER, t)
                .iter()
                .map(|(_, q)| q)
                .sum();
            assert!((3..=9).contains(&total));
        }
    }

    #[test]
    fn test_every_resource_can_appear() {
        let table = YieldTable::uniform();
        let mut entropy = RngEntropy::new(ChaCha8Rng::seed_from_u64(11));
        let mut seen = [false; RESOURCE_TYPE_COUNT as usize];
        for t in 0..500 {
            for (resource, _) in table.roll(&mut entropy, PLAYER, t) {
                seen[resource.get() as usize] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        let bad_range = YieldTable {
            rolls: 1,
            entries: vec![YieldEntry::new(WOOD, 1, 3, 1)],
        };
        assert!(matches!(bad_range.validate(), Err(EconomyError::InvalidConfig(_))));

        let no_weight = YieldTable {
            rolls: 1,
            entries: vec![YieldEntry::new(WOOD, 0, 1, 1)],
        };
        assert!(matches!(no_weight.validate(), Err(EconomyError::InvalidConfig(_))));

        let unknown = YieldTable {
            rolls: 1,
            entries: vec![YieldEntry::new(ResourceId::new(99), 1, 1, 1)],
        };
        assert!(matches!(unknown.validate(), Err(EconomyError::InvalidConfig(_))));
    }
}
