//! # Economy Configuration
//!
//! Construction-time settings, loaded from TOML once at startup.
//!
//! ```toml
//! admin = "0x1111111111111111111111111111111111111111"
//! resource_uri = "ipfs://resources/"
//! search_cooldown_secs = 30
//!
//! [item_rewards]
//! cossack_sabre = 100
//! elder_staff = 150
//! characternyk_armor = 220
//! battle_bracelet = 280
//!
//! [search_yields]
//! rolls = 2
//! entries = [
//!   { resource = 0, weight = 3, min_quantity = 1, max_quantity = 2 },
//!   { resource = 5, weight = 1, min_quantity = 1, max_quantity = 1 },
//! ]
//! ```
//!
//! Every key is optional except `admin`. A per-kind table, when present,
//! must name all four kinds.

use std::path::Path;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use sich_shared::constants::{DEFAULT_RESOURCE_URI, DEFAULT_REWARD_NAME, DEFAULT_REWARD_SYMBOL};
use sich_shared::{ItemKind, DEFAULT_SEARCH_COOLDOWN_SECS};

use crate::error::{EconomyError, EconomyResult};
use crate::fixed_point::FixedPoint18;
use crate::search::YieldTable;

/// One value per item kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerKind<T> {
    /// Cossack Sabre.
    pub cossack_sabre: T,
    /// Elder Staff.
    pub elder_staff: T,
    /// Characternyk Armor.
    pub characternyk_armor: T,
    /// Battle Bracelet.
    pub battle_bracelet: T,
}

impl<T> PerKind<T> {
    /// Builds a table by calling `f` for every kind.
    pub fn from_fn(mut f: impl FnMut(ItemKind) -> T) -> Self {
        Self {
            cossack_sabre: f(ItemKind::CossackSabre),
            elder_staff: f(ItemKind::ElderStaff),
            characternyk_armor: f(ItemKind::CharacternykArmor),
            battle_bracelet: f(ItemKind::BattleBracelet),
        }
    }

    /// Value for `kind`.
    #[must_use]
    pub const fn get(&self, kind: ItemKind) -> &T {
        match kind {
            ItemKind::CossackSabre => &self.cossack_sabre,
            ItemKind::ElderStaff => &self.elder_staff,
            ItemKind::CharacternykArmor => &self.characternyk_armor,
            ItemKind::BattleBracelet => &self.battle_bracelet,
        }
    }
}

/// Everything needed to bootstrap an economy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomyConfig {
    /// Initial admin of every component.
    pub admin: Address,
    /// Base metadata URI of the resource ledger.
    pub resource_uri: String,
    /// Base metadata URI per item kind.
    pub item_uris: PerKind<String>,
    /// Reward currency name.
    pub reward_name: String,
    /// Reward currency symbol.
    pub reward_symbol: String,
    /// Marketplace payout per item kind, in whole reward units.
    pub item_rewards: PerKind<u64>,
    /// Minimum seconds between searches.
    pub search_cooldown_secs: u64,
    /// Search yield table.
    pub search_yields: YieldTable,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            admin: Address::ZERO,
            resource_uri: DEFAULT_RESOURCE_URI.to_string(),
            item_uris: PerKind::from_fn(|kind| kind.default_uri().to_string()),
            reward_name: DEFAULT_REWARD_NAME.to_string(),
            reward_symbol: DEFAULT_REWARD_SYMBOL.to_string(),
            item_rewards: PerKind::from_fn(ItemKind::default_reward),
            search_cooldown_secs: DEFAULT_SEARCH_COOLDOWN_SECS,
            search_yields: YieldTable::uniform(),
        }
    }
}

impl EconomyConfig {
    /// Default settings administered by `admin`.
    #[must_use]
    pub fn with_admin(admin: Address) -> Self {
        Self {
            admin,
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on malformed TOML or failed validation.
    pub fn from_toml_str(contents: &str) -> EconomyResult<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| EconomyError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the file cannot be read or fails to parse.
    pub fn load(path: impl AsRef<Path>) -> EconomyResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EconomyError::InvalidConfig(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&contents)?;
        tracing::info!(path = %path.display(), admin = %config.admin, "configuration loaded");
        Ok(config)
    }

    /// Serializes back to TOML.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if serialization fails.
    pub fn to_toml_string(&self) -> EconomyResult<String> {
        toml::to_string_pretty(self).map_err(|e| EconomyError::InvalidConfig(e.to_string()))
    }

    /// Checks the settings are usable.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for a zero admin or an invalid yield table.
    pub fn validate(&self) -> EconomyResult<()> {
        if self.admin == Address::ZERO {
            return Err(EconomyError::InvalidConfig(
                "admin must be a non-zero address".to_string(),
            ));
        }
        self.search_yields.validate()
    }

    /// Marketplace payout for `kind` as a reward amount.
    #[must_use]
    pub fn reward_for(&self, kind: ItemKind) -> FixedPoint18 {
        FixedPoint18::from_whole(*self.item_rewards.get(kind))
    }
}
