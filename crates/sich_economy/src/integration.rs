//! # Economy Facade
//!
//! **One call to stand the whole economy up.**
//!
//! [`Economy::bootstrap`] constructs every component, wires the roles the
//! components need to call each other, and applies the configured prices.
//!
//! ```text
//!   CraftingEngine ── minter, burner ──> ResourceLedger
//!   CraftingEngine ── minter ──────────> ItemRegistry (x4)
//!   Marketplace ───── burner ──────────> ItemRegistry (x4)
//!   Marketplace ───── minter ──────────> RewardLedger
//! ```
//!
//! Component addresses are derived from the admin and a deployment nonce:
//! resources `0`, item registries `1..=4`, rewards `5`, marketplace `6`,
//! engine `7`.

use std::sync::Arc;

use alloy_primitives::Address;
use sich_shared::{derive_contract_address, ItemKind, ResourceId, TokenId};

use crate::access::Role;
use crate::clock::Clock;
use crate::config::EconomyConfig;
use crate::crafting::{CraftReceipt, CraftingEngine, EngineHandle, SearchOutcome};
use crate::entropy::EntropySource;
use crate::error::{EconomyError, EconomyResult};
use crate::events::LedgerEvent;
use crate::fixed_point::FixedPoint18;
use crate::items::{ItemHandle, ItemRegistry};
use crate::marketplace::{Marketplace, MarketplaceHandle, SaleReceipt};
use crate::resources::{ResourceHandle, ResourceLedger};
use crate::reward::{RewardHandle, RewardLedger};

/// Deployment nonce of the resource ledger.
const RESOURCES_NONCE: u64 = 0;
/// Deployment nonce of the first item registry.
const FIRST_ITEM_NONCE: u64 = 1;
/// Deployment nonce of the reward ledger.
const REWARDS_NONCE: u64 = 5;
/// Deployment nonce of the marketplace.
const MARKETPLACE_NONCE: u64 = 6;
/// Deployment nonce of the crafting engine.
const ENGINE_NONCE: u64 = 7;

/// A component whose role table can be administered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Asset {
    /// The resource ledger.
    Resources,
    /// The registry of one item kind.
    Item(ItemKind),
    /// The reward ledger.
    Rewards,
    /// The crafting engine.
    Engine,
    /// The marketplace.
    Marketplace,
}

/// A fully wired economy.
#[derive(Clone)]
pub struct Economy {
    admin: Address,
    resources: ResourceHandle,
    items: [ItemHandle; 4],
    rewards: RewardHandle,
    engine: EngineHandle,
    marketplace: MarketplaceHandle,
}

impl std::fmt::Debug for Economy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Economy")
            .field("admin", &self.admin)
            .field("resources", &self.address_of(Asset::Resources))
            .field("rewards", &self.address_of(Asset::Rewards))
            .field("engine", &self.address_of(Asset::Engine))
            .field("marketplace", &self.address_of(Asset::Marketplace))
            .finish_non_exhaustive()
    }
}

impl Economy {
    /// Constructs and wires every component.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `config` fails validation.
    pub fn bootstrap(
        config: &EconomyConfig,
        clock: Arc<dyn Clock>,
        entropy: Box<dyn EntropySource>,
    ) -> EconomyResult<Self> {
        config.validate()?;
        let admin = config.admin;
        let at = |nonce| derive_contract_address(admin, nonce);

        let engine_address = at(ENGINE_NONCE);
        let marketplace_address = at(MARKETPLACE_NONCE);

        let mut resources =
            ResourceLedger::new(at(RESOURCES_NONCE), config.resource_uri.clone(), admin);
        resources.grant_role(admin, Role::Minter, engine_address)?;
        resources.grant_role(admin, Role::Burner, engine_address)?;
        let resources = resources.into_handle();

        let mut items = Vec::with_capacity(ItemKind::ALL.len());
        for (nonce, kind) in (FIRST_ITEM_NONCE..).zip(ItemKind::ALL) {
            let mut registry =
                ItemRegistry::new(kind, at(nonce), config.item_uris.get(kind).clone(), admin);
            registry.grant_role(admin, Role::Minter, engine_address)?;
            registry.grant_role(admin, Role::Burner, marketplace_address)?;
            items.push(registry.into_handle());
        }
        let items: [ItemHandle; 4] = items.try_into().map_err(|_| {
            EconomyError::InvariantViolation("expected one registry per item kind".to_string())
        })?;

        let mut rewards = RewardLedger::new(
            at(REWARDS_NONCE),
            config.reward_name.clone(),
            config.reward_symbol.clone(),
            admin,
        );
        rewards.grant_role(admin, Role::Minter, marketplace_address)?;
        let rewards = rewards.into_handle();

        let mut marketplace = Marketplace::new(marketplace_address, admin, Arc::clone(&rewards));
        for (kind, registry) in ItemKind::ALL.into_iter().zip(&items) {
            let item = marketplace.register(admin, Arc::clone(registry))?;
            marketplace.set_item_reward(admin, item, config.reward_for(kind))?;
        }

        let engine = CraftingEngine::new(
            engine_address,
            admin,
            Arc::clone(&resources),
            items.clone(),
            clock,
            entropy,
        )?
        .with_yield_table(config.search_yields.clone())?
        .with_search_cooldown(config.search_cooldown_secs);

        tracing::info!(
            %admin,
            engine = %engine_address,
            marketplace = %marketplace_address,
            "economy bootstrapped"
        );

        Ok(Self {
            admin,
            resources,
            items,
            rewards,
            engine: engine.into_handle(),
            marketplace: marketplace.into_handle(),
        })
    }

    // ========================================================================
    // Handles
    // ========================================================================

    /// Initial admin of every component.
    #[must_use]
    pub const fn admin(&self) -> Address {
        self.admin
    }

    /// The resource ledger.
    #[must_use]
    pub const fn resources(&self) -> &ResourceHandle {
        &self.resources
    }

    /// The registry of `kind`.
    #[must_use]
    pub const fn item(&self, kind: ItemKind) -> &ItemHandle {
        &self.items[kind.index()]
    }

    /// The reward ledger.
    #[must_use]
    pub const fn rewards(&self) -> &RewardHandle {
        &self.rewards
    }

    /// The crafting engine.
    #[must_use]
    pub const fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    /// The marketplace.
    #[must_use]
    pub const fn marketplace(&self) -> &MarketplaceHandle {
        &self.marketplace
    }

    /// Principal of `asset`.
    #[must_use]
    pub fn address_of(&self, asset: Asset) -> Address {
        match asset {
            Asset::Resources => self.resources.lock().address(),
            Asset::Item(kind) => self.item(kind).lock().address(),
            Asset::Rewards => self.rewards.lock().address(),
            Asset::Engine => self.engine.lock().address(),
            Asset::Marketplace => self.marketplace.lock().address(),
        }
    }

    // ========================================================================
    // Administration
    // ========================================================================

    /// Grants `role` on `asset` to `account`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not an admin of `asset`.
    pub fn grant_role(
        &self,
        caller: Address,
        asset: Asset,
        role: Role,
        account: Address,
    ) -> EconomyResult<()> {
        match asset {
            Asset::Resources => self.resources.lock().grant_role(caller, role, account),
            Asset::Item(kind) => self.item(kind).lock().grant_role(caller, role, account),
            Asset::Rewards => self.rewards.lock().grant_role(caller, role, account),
            Asset::Engine => self.engine.lock().grant_role(caller, role, account),
            Asset::Marketplace => self.marketplace.lock().grant_role(caller, role, account),
        }
    }

    /// Revokes `role` on `asset` from `account`.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, or `InvariantViolation` when removing the last admin.
    pub fn revoke_role(
        &self,
        caller: Address,
        asset: Asset,
        role: Role,
        account: Address,
    ) -> EconomyResult<()> {
        match asset {
            Asset::Resources => self.resources.lock().revoke_role(caller, role, account),
            Asset::Item(kind) => self.item(kind).lock().revoke_role(caller, role, account),
            Asset::Rewards => self.rewards.lock().revoke_role(caller, role, account),
            Asset::Engine => self.engine.lock().revoke_role(caller, role, account),
            Asset::Marketplace => self.marketplace.lock().revoke_role(caller, role, account),
        }
    }

    /// Drops `caller`'s own `role` on `asset`.
    ///
    /// # Errors
    ///
    /// `InvariantViolation` when renouncing the last admin.
    pub fn renounce_role(&self, caller: Address, asset: Asset, role: Role) -> EconomyResult<()> {
        match asset {
            Asset::Resources => self.resources.lock().renounce_role(caller, role),
            Asset::Item(kind) => self.item(kind).lock().renounce_role(caller, role),
            Asset::Rewards => self.rewards.lock().renounce_role(caller, role),
            Asset::Engine => self.engine.lock().renounce_role(caller, role),
            Asset::Marketplace => self.marketplace.lock().renounce_role(caller, role),
        }
    }

    /// Returns true if `principal` holds `role` on `asset`.
    #[must_use]
    pub fn has_role(&self, asset: Asset, role: Role, principal: Address) -> bool {
        match asset {
            Asset::Resources => self.resources.lock().has_role(role, principal),
            Asset::Item(kind) => self.item(kind).lock().has_role(role, principal),
            Asset::Rewards => self.rewards.lock().has_role(role, principal),
            Asset::Engine => self.engine.lock().access().has_role(role, principal),
            Asset::Marketplace => self.marketplace.lock().access().has_role(role, principal),
        }
    }

    /// Sets the marketplace payout for `kind`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not a marketplace admin.
    pub fn set_item_reward(
        &self,
        caller: Address,
        kind: ItemKind,
        amount: FixedPoint18,
    ) -> EconomyResult<()> {
        let item = self.address_of(Asset::Item(kind));
        self.marketplace.lock().set_item_reward(caller, item, amount)
    }

    // ========================================================================
    // Player actions
    // ========================================================================

    /// Runs a search for `player`.
    ///
    /// # Errors
    ///
    /// See [`CraftingEngine::search`].
    pub fn search(&self, player: Address) -> EconomyResult<SearchOutcome> {
        self.engine.lock().search(player)
    }

    /// Crafts one item of `kind` for `player`.
    ///
    /// # Errors
    ///
    /// See [`CraftingEngine::craft`].
    pub fn craft(&self, player: Address, kind: ItemKind) -> EconomyResult<CraftReceipt> {
        self.engine.lock().craft(player, kind)
    }

    /// Sells `token_id` of `kind` on behalf of `seller`.
    ///
    /// # Errors
    ///
    /// See [`Marketplace::sell`].
    pub fn sell(
        &self,
        seller: Address,
        kind: ItemKind,
        token_id: TokenId,
    ) -> EconomyResult<SaleReceipt> {
        let item = self.address_of(Asset::Item(kind));
        self.marketplace.lock().sell(seller, item, token_id)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Resource balance of `owner`.
    #[must_use]
    pub fn resource_balance(&self, owner: Address, resource: ResourceId) -> u64 {
        self.resources.lock().balance_of(owner, resource)
    }

    /// Current owner of `token_id` of `kind`.
    ///
    /// # Errors
    ///
    /// `NotFound` for unminted or burned tokens.
    pub fn owner_of(&self, kind: ItemKind, token_id: TokenId) -> EconomyResult<Address> {
        self.item(kind).lock().owner_of(token_id)
    }

    /// Reward balance of `owner`.
    #[must_use]
    pub fn reward_balance(&self, owner: Address) -> FixedPoint18 {
        self.rewards.lock().balance_of(owner)
    }

    /// Marketplace payout for `kind`.
    #[must_use]
    pub fn item_reward(&self, kind: ItemKind) -> FixedPoint18 {
        let item = self.address_of(Asset::Item(kind));
        self.marketplace.lock().item_reward(item)
    }

    /// Drains the journals of every component: engine, marketplace,
    /// resources, item registries in kind order, rewards.
    pub fn drain_events(&self) -> Vec<LedgerEvent> {
        let mut events = self.engine.lock().drain_events();
        events.extend(self.marketplace.lock().drain_events());
        events.extend(self.resources.lock().drain_events());
        for registry in &self.items {
            events.extend(registry.lock().drain_events());
        }
        events.extend(self.rewards.lock().drain_events());
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::entropy::RngEntropy;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const ADMIN: Address = Address::repeat_byte(0x01);

    fn economy() -> Economy {
        Economy::bootstrap(
            &EconomyConfig::with_admin(ADMIN),
            Arc::new(ManualClock::new(0)),
            Box::new(RngEntropy::new(ChaCha8Rng::seed_from_u64(1))),
        )
        .unwrap()
    }

    #[test]
    fn test_bootstrap_wires_roles() {
        let economy = economy();
        let engine = economy.address_of(Asset::Engine);
        let market = economy.address_of(Asset::Marketplace);

        assert!(economy.has_role(Asset::Resources, Role::Minter, engine));
        assert!(economy.has_role(Asset::Resources, Role::Burner, engine));
        assert!(economy.has_role(Asset::Rewards, Role::Minter, market));
        for kind in ItemKind::ALL {
            assert!(economy.has_role(Asset::Item(kind), Role::Minter, engine));
            assert!(economy.has_role(Asset::Item(kind), Role::Burner, market));
            assert!(!economy.has_role(Asset::Item(kind), Role::Minter, market));
            assert!(economy.has_role(Asset::Item(kind), Role::Admin, ADMIN));
        }
        assert!(!economy.has_role(Asset::Resources, Role::Minter, ADMIN));
    }

    #[test]
    fn test_bootstrap_applies_rewards() {
        let economy = economy();
        assert_eq!(economy.item_reward(ItemKind::CossackSabre), FixedPoint18::from_whole(100));
        assert_eq!(economy.item_reward(ItemKind::ElderStaff), FixedPoint18::from_whole(150));
        assert_eq!(economy.item_reward(ItemKind::CharacternykArmor), FixedPoint18::from_whole(220));
        assert_eq!(economy.item_reward(ItemKind::BattleBracelet), FixedPoint18::from_whole(280));
    }

    #[test]
    fn test_addresses_are_distinct() {
        let economy = economy();
        let mut addresses = vec![
            economy.address_of(Asset::Resources),
            economy.address_of(Asset::Rewards),
            economy.address_of(Asset::Engine),
            economy.address_of(Asset::Marketplace),
        ];
        addresses.extend(ItemKind::ALL.map(|kind| economy.address_of(Asset::Item(kind))));
        let count = addresses.len();
        addresses.sort();
        addresses.dedup();
        assert_eq!(addresses.len(), count);
    }

    #[test]
    fn test_bootstrap_rejects_zero_admin() {
        let result = Economy::bootstrap(
            &EconomyConfig::default(),
            Arc::new(ManualClock::new(0)),
            Box::new(RngEntropy::new(ChaCha8Rng::seed_from_u64(1))),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_drain_collects_setup_events() {
        let economy = economy();
        let events = economy.drain_events();
        let grants = events
            .iter()
            .filter(|e| matches!(e, LedgerEvent::RoleGranted { .. }))
            .count();
        // 2 on resources, 2 per item registry, 1 on rewards.
        assert_eq!(grants, 11);
        assert!(economy.drain_events().is_empty());
    }
}
