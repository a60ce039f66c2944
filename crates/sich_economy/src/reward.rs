//! # Reward Ledger
//!
//! The single fungible currency paid out by the marketplace. Amounts are
//! [`FixedPoint18`] base units (18 decimals).
//!
//! Minting requires `minter`. There is no burn: once paid out, currency only
//! moves between holders.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::Address;
use parking_lot::Mutex;
use sich_shared::REWARD_DECIMALS;

use crate::access::{AccessControl, Role};
use crate::error::{EconomyError, EconomyResult};
use crate::events::{EventJournal, LedgerEvent};
use crate::fixed_point::FixedPoint18;

/// Shared, single-writer handle to the reward ledger.
pub type RewardHandle = Arc<Mutex<RewardLedger>>;

/// Balances and allowances of the reward currency.
#[derive(Debug)]
pub struct RewardLedger {
    address: Address,
    name: String,
    symbol: String,
    access: AccessControl,
    balances: HashMap<Address, FixedPoint18>,
    allowances: HashMap<(Address, Address), FixedPoint18>,
    total_supply: FixedPoint18,
    journal: EventJournal,
}

impl RewardLedger {
    /// Creates a currency with no supply, administered by `admin`.
    #[must_use]
    pub fn new(
        address: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        admin: Address,
    ) -> Self {
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            access: AccessControl::new(address, admin),
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: FixedPoint18::ZERO,
            journal: EventJournal::new(),
        }
    }

    /// Wraps the ledger in a shared handle.
    #[must_use]
    pub fn into_handle(self) -> RewardHandle {
        Arc::new(Mutex::new(self))
    }

    /// This ledger's principal.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Currency name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Currency symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Decimal places of one whole unit.
    #[must_use]
    pub const fn decimals(&self) -> u32 {
        REWARD_DECIMALS
    }

    /// Role table (read-only).
    #[must_use]
    pub const fn access(&self) -> &AccessControl {
        &self.access
    }

    /// Returns true if `principal` holds `role` on this ledger.
    #[must_use]
    pub fn has_role(&self, role: Role, principal: Address) -> bool {
        self.access.has_role(role, principal)
    }

    /// Grants a role (admin only).
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

    /// Revokes a role (admin only).
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

    /// Drops one of the caller's own roles.
    ///
    /// # Errors
    ///
    /// `InvariantViolation` when renouncing the last admin.
    pub fn renounce_role(&mut self, caller: Address, role: Role) -> EconomyResult<()> {
        self.access.renounce_role(caller, role, &mut self.journal)
    }

    /// Balance of `owner`.
    #[must_use]
    pub fn balance_of(&self, owner: Address) -> FixedPoint18 {
        self.balances.get(&owner).copied().unwrap_or(FixedPoint18::ZERO)
    }

    /// Sum of all balances.
    #[inline]
    #[must_use]
    pub const fn total_supply(&self) -> FixedPoint18 {
        self.total_supply
    }

    /// Remaining amount `spender` may move on behalf of `owner`.
    #[must_use]
    pub fn allowance(&self, owner: Address, spender: Address) -> FixedPoint18 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(FixedPoint18::ZERO)
    }

    /// Checks that `caller` could mint `amount` to `to` right now.
    ///
    /// # Errors
    ///
    /// As [`RewardLedger::mint`].
    pub fn ensure_can_mint(
        &self,
        caller: Address,
        to: Address,
        amount: FixedPoint18,
    ) -> EconomyResult<()> {
        self.access.require(Role::Minter, caller)?;
        if amount.is_zero() {
            return Err(EconomyError::InvalidAmount);
        }
        ensure_receiver(to)?;
        self.total_supply.safe_add(amount)?;
        Ok(())
    }

    /// Mints `amount` to `to`. Requires `minter`.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `caller` lacks `minter`
    /// - `InvalidAmount` for a zero amount
    /// - `InvalidArgument` for the zero address
    /// - `ArithmeticOverflow` if the supply would overflow
    pub fn mint(
        &mut self,
        caller: Address,
        to: Address,
        amount: FixedPoint18,
    ) -> EconomyResult<()> {
        self.ensure_can_mint(caller, to, amount)?;
        // Every balance is bounded by the supply, so both sums fit.
        let supply = self.total_supply.safe_add(amount)?;
        let balance = self.balance_of(to).safe_add(amount)?;

        self.total_supply = supply;
        self.balances.insert(to, balance);

        tracing::info!(%to, %amount, "reward minted");
        self.journal.record(LedgerEvent::RewardTransfer {
            from: Address::ZERO,
            to,
            amount,
        });
        Ok(())
    }

    /// Moves `amount` from `caller` to `to`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for the zero address
    /// - `InsufficientBalance` if `amount` exceeds the caller's balance
    pub fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        amount: FixedPoint18,
    ) -> EconomyResult<()> {
        self.move_balance(caller, to, amount)
    }

    /// Sets the allowance of `spender` over the caller's balance.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `spender` is the zero address.
    pub fn approve(
        &mut self,
        caller: Address,
        spender: Address,
        amount: FixedPoint18,
    ) -> EconomyResult<()> {
        if spender == Address::ZERO {
            return Err(EconomyError::InvalidArgument(
                "approve to the zero address".to_string(),
            ));
        }

        if amount.is_zero() {
            self.allowances.remove(&(caller, spender));
        } else {
            self.allowances.insert((caller, spender), amount);
        }
        self.journal.record(LedgerEvent::RewardApproval {
            owner: caller,
            spender,
            amount,
        });
        Ok(())
    }

    /// Moves `amount` from `owner` to `to`, spending the caller's allowance.
    ///
    /// # Errors
    ///
    /// - `InsufficientBalance` if the allowance or the balance is too small
    /// - `InvalidArgument` for the zero address
    pub fn transfer_from(
        &mut self,
        caller: Address,
        owner: Address,
        to: Address,
        amount: FixedPoint18,
    ) -> EconomyResult<()> {
        let remaining = self.allowance(owner, caller).safe_sub(amount)?;
        self.move_balance(owner, to, amount)?;

        if remaining.is_zero() {
            self.allowances.remove(&(owner, caller));
        } else {
            self.allowances.insert((owner, caller), remaining);
        }
        Ok(())
    }

    /// Takes every pending event.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        self.journal.drain()
    }

    fn move_balance(
        &mut self,
        from: Address,
        to: Address,
        amount: FixedPoint18,
    ) -> EconomyResult<()> {
        ensure_receiver(to)?;
        let debited = self.balance_of(from).safe_sub(amount)?;

        if from != to {
            let credited = self.balance_of(to).safe_add(amount)?;
            self.balances.insert(from, debited);
            self.balances.insert(to, credited);
        }

        tracing::info!(%from, %to, %amount, "reward transferred");
        self.journal.record(LedgerEvent::RewardTransfer { from, to, amount });
        Ok(())
    }
}

fn ensure_receiver(to: Address) -> EconomyResult<()> {
    if to == Address::ZERO {
        Err(EconomyError::InvalidArgument("receiver is the zero address".to_string()))
    } else {
        Ok(())
    }
}
