//! Identifier types shared across the economy.

use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Any party that can hold balances or roles: players, admins, and the
/// engine/marketplace components themselves.
pub type Principal = Address;

/// Sequential identifier of a unique item within one item kind.
///
/// The first minted token of every kind is `1`; `0` means "nothing minted".
pub type TokenId = u64;

/// A fungible resource type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(u32);

impl ResourceId {
    /// Wraps a raw resource type number.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw resource type number.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Human-readable name of the resource.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self.0 {
            0 => "Wood",
            1 => "Iron",
            2 => "Gold",
            3 => "Leather",
            4 => "Stone",
            5 => "Diamond",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name(), self.0)
    }
}

impl From<u32> for ResourceId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// The four craftable item kinds. Each kind has its own registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ItemKind {
    /// Curved cavalry sword.
    CossackSabre = 0,
    /// Staff of the elders.
    ElderStaff = 1,
    /// Armor of the characternyk warrior-mystics.
    CharacternykArmor = 2,
    /// Bracelet worn into battle.
    BattleBracelet = 3,
}

impl ItemKind {
    /// Every item kind, in registry order.
    pub const ALL: [Self; 4] = [
        Self::CossackSabre,
        Self::ElderStaff,
        Self::CharacternykArmor,
        Self::BattleBracelet,
    ];

    /// Collection name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CossackSabre => "Cossack Sabre",
            Self::ElderStaff => "Elder Staff",
            Self::CharacternykArmor => "Characternyk Armor",
            Self::BattleBracelet => "Battle Bracelet",
        }
    }

    /// Collection symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::CossackSabre => "SABRE",
            Self::ElderStaff => "STAFF",
            Self::CharacternykArmor => "ARMOR",
            Self::BattleBracelet => "BRACELET",
        }
    }

    /// Default base metadata URI.
    #[must_use]
    pub const fn default_uri(self) -> &'static str {
        match self {
            Self::CossackSabre => "https://example.com/sabre/",
            Self::ElderStaff => "https://example.com/staff/",
            Self::CharacternykArmor => "https://example.com/armor/",
            Self::BattleBracelet => "https://example.com/bracelet/",
        }
    }

    /// Default marketplace payout in whole reward units.
    #[must_use]
    pub const fn default_reward(self) -> u64 {
        match self {
            Self::CossackSabre => 100,
            Self::ElderStaff => 150,
            Self::CharacternykArmor => 220,
            Self::BattleBracelet => 280,
        }
    }

    /// Position of this kind in [`ItemKind::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_kind_index_matches_all() {
        for (i, kind) in ItemKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_resource_display() {
        assert_eq!(ResourceId::new(1).to_string(), "Iron#1");
        assert_eq!(ResourceId::new(9).name(), "Unknown");
    }
}
