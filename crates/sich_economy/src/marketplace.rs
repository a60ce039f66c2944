//! # Marketplace
//!
//! Buys crafted items back for the reward currency.
//!
//! ## Sale sequence (atomic)
//!
//! ```text
//! sell(seller, registry, token)
//!   1. owner_of(token) == seller          else NotFound / Unauthorized
//!   2. marketplace holds burner           else Unauthorized
//!   3. marketplace can mint the price     else Unauthorized (skipped at 0)
//!   4. pull into custody if approved, then burn
//!   5. mint the price to the seller       (skipped at 0)
//! ```
//!
//! Steps 1-3 run with the registry and the reward ledger locked, so steps
//! 4-5 cannot fail halfway. Lock order: marketplace → item registry →
//! rewards.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::Address;
use parking_lot::Mutex;
use sich_shared::{ItemKind, TokenId};

use crate::access::{AccessControl, Role};
use crate::error::{Denial, EconomyError, EconomyResult};
use crate::events::{EventJournal, LedgerEvent};
use crate::fixed_point::FixedPoint18;
use crate::items::ItemHandle;
use crate::reward::RewardHandle;

/// Shared, single-writer handle to the marketplace.
pub type MarketplaceHandle = Arc<Mutex<Marketplace>>;

/// Result of a successful sale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleReceipt {
    /// The seller.
    pub seller: Address,
    /// Item kind sold.
    pub kind: ItemKind,
    /// Burned token.
    pub token_id: TokenId,
    /// Reward credited to the seller.
    pub payout: FixedPoint18,
    /// True if the item passed through marketplace custody before burning.
    pub custodied: bool,
}

/// Price table and sale desk.
#[derive(Debug)]
pub struct Marketplace {
    address: Address,
    access: AccessControl,
    rewards: RewardHandle,
    /// Known item registries by address.
    registries: HashMap<Address, ItemHandle>,
    /// Payout per item registry. Absent means zero.
    prices: HashMap<Address, FixedPoint18>,
    journal: EventJournal,
}

impl Marketplace {
    /// Creates a marketplace paying out of `rewards`.
    #[must_use]
    pub fn new(address: Address, admin: Address, rewards: RewardHandle) -> Self {
        Self {
            address,
            access: AccessControl::new(address, admin),
            rewards,
            registries: HashMap::new(),
            prices: HashMap::new(),
            journal: EventJournal::new(),
        }
    }

    /// Makes `registry` sellable here (admin only). Returns its address.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `caller` is not an admin
    /// - `InvalidArgument` if a registry is already known at that address
    pub fn register(&mut self, caller: Address, registry: ItemHandle) -> EconomyResult<Address> {
        self.access.require(Role::Admin, caller)?;
        let address = registry.lock().address();
        if self.registries.contains_key(&address) {
            return Err(EconomyError::InvalidArgument(format!(
                "item registry {address} already registered"
            )));
        }
        tracing::info!(%address, sender = %caller, "item registry registered");
        self.registries.insert(address, registry);
        Ok(address)
    }

    /// Wraps the marketplace in a shared handle.
    #[must_use]
    pub fn into_handle(self) -> MarketplaceHandle {
        Arc::new(Mutex::new(self))
    }

    /// This marketplace's principal.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Role table (read-only).
    #[must_use]
    pub const fn access(&self) -> &AccessControl {
        &self.access
    }

    /// Grants a role on the marketplace (admin only).
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not an admin.
    pub fn grant_role(
        &mut self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> EconomyResult<()> {
        self.access.grant_role(caller, role, account, &mut self.journal)
    }

    /// Revokes a role on the marketplace (admin only).
    ///
    /// # Errors
    ///
    /// `Unauthorized` or `InvariantViolation` (last admin).
    pub fn revoke_role(
        &mut self,
        caller: Address,
        role: Role,
        account: Address,
    ) -> EconomyResult<()> {
        self.access.revoke_role(caller, role, account, &mut self.journal)
    }

    /// Drops one of the caller's own roles on the marketplace.
    ///
    /// # Errors
    ///
    /// `InvariantViolation` when renouncing the last admin.
    pub fn renounce_role(&mut self, caller: Address, role: Role) -> EconomyResult<()> {
        self.access.renounce_role(caller, role, &mut self.journal)
    }

    /// Payout for one item of the registry at `item`. Zero until configured.
    #[must_use]
    pub fn item_reward(&self, item: Address) -> FixedPoint18 {
        self.prices.get(&item).copied().unwrap_or(FixedPoint18::ZERO)
    }

    /// Sets the payout for items of `item` (admin only). Zero is allowed.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `caller` is not an admin
    /// - `InvalidArgument` if `item` is not a registered registry
    pub fn set_item_reward(
        &mut self,
        caller: Address,
        item: Address,
        amount: FixedPoint18,
    ) -> EconomyResult<()> {
        self.access.require(Role::Admin, caller)?;
        if !self.registries.contains_key(&item) {
            return Err(EconomyError::InvalidArgument(format!(
                "unknown item registry {item}"
            )));
        }

        self.prices.insert(item, amount);
        tracing::info!(%item, %amount, "item reward set");
        self.journal.record(LedgerEvent::ItemRewardSet { item, amount });
        Ok(())
    }

    /// Burns `token_id` of registry `item` owned by `seller` and pays the
    /// configured reward.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `item` is not a registered registry
    /// - `NotFound` if the token was never minted or is already sold
    /// - `Unauthorized` if `seller` does not own the token, or the
    ///   marketplace lacks `burner` on the registry or `minter` on rewards
    pub fn sell(
        &mut self,
        seller: Address,
        item: Address,
        token_id: TokenId,
    ) -> EconomyResult<SaleReceipt> {
        let handle = self.registries.get(&item).ok_or_else(|| {
            EconomyError::InvalidArgument(format!("unknown item registry {item}"))
        })?;
        let payout = self.item_reward(item);

        let mut registry = handle.lock();
        let mut rewards = self.rewards.lock();

        let owner = registry.owner_of(token_id)?;
        if owner != seller {
            tracing::warn!(%seller, %owner, token_id, "sale rejected: not the owner");
            return Err(EconomyError::Unauthorized {
                principal: seller,
                denial: Denial::NotOwner,
            });
        }
        registry.access().require(Role::Burner, self.address)?;
        if !payout.is_zero() {
            rewards.ensure_can_mint(self.address, seller, payout)?;
        }

        let custodied =
            seller != self.address && registry.is_approved_or_owner(self.address, token_id)?;
        if custodied {
            registry.transfer_from(self.address, seller, self.address, token_id)?;
        }
        registry.burn(self.address, token_id)?;
        if !payout.is_zero() {
            rewards.mint(self.address, seller, payout)?;
        }

        let kind = registry.kind();
        drop(rewards);
        drop(registry);

        tracing::info!(%seller, %kind, token_id, %payout, "item sold");
        self.journal.record(LedgerEvent::Sold {
            seller,
            item,
            token_id,
            payout,
        });
        Ok(SaleReceipt {
            seller,
            kind,
            token_id,
            payout,
            custodied,
        })
    }

    /// Takes every pending event.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        self.journal.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemRegistry;
    use crate::reward::RewardLedger;

    const MARKET: Address = Address::repeat_byte(0xF0);
    const ADMIN: Address = Address::repeat_byte(0x01);
    const ALICE: Address = Address::repeat_byte(0x02);
    const BOB: Address = Address::repeat_byte(0x03);

    struct Fixture {
        market: Marketplace,
        sabres: ItemHandle,
        rewards: RewardHandle,
    }

    fn fixture() -> Fixture {
        let mut rewards = RewardLedger::new(Address::repeat_byte(0xC0), "Magic", "MAGIC", ADMIN);
        rewards.grant_role(ADMIN, Role::Minter, MARKET).unwrap();
        let rewards = rewards.into_handle();

        let mut sabres = ItemRegistry::new(
            ItemKind::CossackSabre,
            Address::repeat_byte(0xB0),
            "sabre/",
            ADMIN,
        );
        sabres.grant_role(ADMIN, Role::Minter, ADMIN).unwrap();
        sabres.grant_role(ADMIN, Role::Minter, MARKET).unwrap();
        sabres.grant_role(ADMIN, Role::Burner, MARKET).unwrap();
        let sabres = sabres.into_handle();

        let mut market = Marketplace::new(MARKET, ADMIN, Arc::clone(&rewards));
        market.register(ADMIN, Arc::clone(&sabres)).unwrap();
        Fixture {
            market,
            sabres,
            rewards,
        }
    }

    fn sabre_for(f: &Fixture, owner: Address) -> TokenId {
        f.sabres.lock().mint_to(ADMIN, owner).unwrap()
    }

    fn sabre_address(f: &Fixture) -> Address {
        f.sabres.lock().address()
    }

    #[test]
    fn test_sell_pays_configured_reward() {
        let mut f = fixture();
        let item = sabre_address(&f);
        f.market
            .set_item_reward(ADMIN, item, FixedPoint18::from_whole(100))
            .unwrap();
        let id = sabre_for(&f, ALICE);

        let receipt = f.market.sell(ALICE, item, id).unwrap();
        assert_eq!(receipt.payout, FixedPoint18::from_whole(100));
        assert!(!receipt.custodied);
        assert_eq!(f.rewards.lock().balance_of(ALICE), FixedPoint18::from_whole(100));
        assert_eq!(f.sabres.lock().owner_of(id), Err(EconomyError::NotFound(id)));
    }

    #[test]
    fn test_unconfigured_price_pays_zero() {
        let mut f = fixture();
        let item = sabre_address(&f);
        let id = sabre_for(&f, ALICE);

        let receipt = f.market.sell(ALICE, item, id).unwrap();
        assert!(receipt.payout.is_zero());
        assert!(f.rewards.lock().total_supply().is_zero());
    }

    #[test]
    fn test_sell_unowned_is_rejected() {
        let mut f = fixture();
        let item = sabre_address(&f);
        f.market
            .set_item_reward(ADMIN, item, FixedPoint18::from_whole(100))
            .unwrap();
        let id = sabre_for(&f, ALICE);

        let result = f.market.sell(BOB, item, id);
        assert_eq!(
            result,
            Err(EconomyError::Unauthorized {
                principal: BOB,
                denial: Denial::NotOwner,
            })
        );
        assert!(f.rewards.lock().balance_of(BOB).is_zero());
        assert_eq!(f.sabres.lock().owner_of(id).unwrap(), ALICE);
    }

    #[test]
    fn test_double_sell_pays_once() {
        let mut f = fixture();
        let item = sabre_address(&f);
        f.market
            .set_item_reward(ADMIN, item, FixedPoint18::from_whole(5))
            .unwrap();
        let id = sabre_for(&f, ALICE);

        f.market.sell(ALICE, item, id).unwrap();
        assert_eq!(f.market.sell(ALICE, item, id), Err(EconomyError::NotFound(id)));
        assert_eq!(f.rewards.lock().balance_of(ALICE), FixedPoint18::from_whole(5));
    }

    #[test]
    fn test_approved_item_goes_through_custody() {
        let mut f = fixture();
        let item = sabre_address(&f);
        let id = sabre_for(&f, ALICE);
        f.sabres.lock().approve(ALICE, MARKET, id).unwrap();

        let receipt = f.market.sell(ALICE, item, id).unwrap();
        assert!(receipt.custodied);
        assert_eq!(f.sabres.lock().balance_of(MARKET), 0);
    }

    #[test]
    fn test_missing_mint_role_keeps_item() {
        let mut f = fixture();
        let item = sabre_address(&f);
        f.market
            .set_item_reward(ADMIN, item, FixedPoint18::from_whole(1))
            .unwrap();
        f.rewards
            .lock()
            .revoke_role(ADMIN, Role::Minter, MARKET)
            .unwrap();
        let id = sabre_for(&f, ALICE);

        assert!(matches!(
            f.market.sell(ALICE, item, id),
            Err(EconomyError::Unauthorized { .. })
        ));
        assert_eq!(f.sabres.lock().owner_of(id).unwrap(), ALICE);
    }

    #[test]
    fn test_register_is_admin_only_and_never_replaces() {
        let mut f = fixture();
        let item = sabre_address(&f);
        f.market
            .set_item_reward(ADMIN, item, FixedPoint18::from_whole(100))
            .unwrap();

        // A look-alike registry at the real address, administered by BOB.
        let mut forged = ItemRegistry::new(ItemKind::CossackSabre, item, "x/", BOB);
        forged.grant_role(BOB, Role::Minter, BOB).unwrap();
        forged.grant_role(BOB, Role::Burner, MARKET).unwrap();
        let forged_id = forged.mint_to(BOB, BOB).unwrap();
        let forged = forged.into_handle();

        assert_eq!(
            f.market.register(BOB, Arc::clone(&forged)),
            Err(EconomyError::missing_role(BOB, Role::Admin))
        );
        assert!(matches!(
            f.market.register(ADMIN, Arc::clone(&forged)),
            Err(EconomyError::InvalidArgument(_))
        ));

        assert_eq!(
            f.market.sell(BOB, item, forged_id),
            Err(EconomyError::NotFound(forged_id))
        );
        assert!(f.rewards.lock().balance_of(BOB).is_zero());

        let id = sabre_for(&f, ALICE);
        f.market.sell(ALICE, item, id).unwrap();
        assert_eq!(f.rewards.lock().balance_of(ALICE), FixedPoint18::from_whole(100));
    }

    #[test]
    fn test_set_item_reward_admin_only() {
        let mut f = fixture();
        let item = sabre_address(&f);
        assert!(f
            .market
            .set_item_reward(ALICE, item, FixedPoint18::ONE)
            .is_err());
        assert!(f.market.item_reward(item).is_zero());

        let unknown = Address::repeat_byte(0x99);
        assert!(matches!(
            f.market.set_item_reward(ADMIN, unknown, FixedPoint18::ONE),
            Err(EconomyError::InvalidArgument(_))
        ));
    }
}
