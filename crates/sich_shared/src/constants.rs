//! # Economy Constants
//!
//! Fixed parameters of the SICH economy.
//!
//! **CRITICAL:** Resource type numbers are part of every stored balance key.
//! Renumbering them invalidates existing state.

use crate::ids::ResourceId;

// =============================================================================
// RESOURCE TYPES
// =============================================================================

/// Wood - common building material.
pub const WOOD: ResourceId = ResourceId::new(0);

/// Iron - blades and plating.
pub const IRON: ResourceId = ResourceId::new(1);

/// Gold - trim and enchantment focus.
pub const GOLD: ResourceId = ResourceId::new(2);

/// Leather - straps and padding.
pub const LEATHER: ResourceId = ResourceId::new(3);

/// Stone - found while searching, used by no current recipe.
pub const STONE: ResourceId = ResourceId::new(4);

/// Diamond - rarest material.
pub const DIAMOND: ResourceId = ResourceId::new(5);

/// Number of resource types. Valid ids are `0..RESOURCE_TYPE_COUNT`.
pub const RESOURCE_TYPE_COUNT: u32 = 6;

// =============================================================================
// SEARCH
// =============================================================================

/// Minimum seconds between two successful searches by the same player.
pub const DEFAULT_SEARCH_COOLDOWN_SECS: u64 = 60;

// =============================================================================
// REWARD CURRENCY
// =============================================================================

/// Decimal places of the reward currency (matches ERC-20 convention).
pub const REWARD_DECIMALS: u32 = 18;

/// Default reward currency name.
pub const DEFAULT_REWARD_NAME: &str = "Magic";

/// Default reward currency symbol.
pub const DEFAULT_REWARD_SYMBOL: &str = "MAGIC";

// =============================================================================
// METADATA
// =============================================================================

/// Default base URI for resource metadata.
pub const DEFAULT_RESOURCE_URI: &str = "https://example.com/resources/";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_ids_are_in_range() {
        for id in [WOOD, IRON, GOLD, LEATHER, STONE, DIAMOND] {
            assert!(id.get() < RESOURCE_TYPE_COUNT);
        }
    }
}
