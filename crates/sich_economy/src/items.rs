//! # Item Registry
//!
//! Unique, sequentially numbered items of one [`ItemKind`]. The economy runs
//! one registry per kind.
//!
//! ## Token ids
//!
//! Ids start at `1` and only ever grow. A burned id is gone for good: it can
//! not be minted again, transferred, or queried (`NotFound`).
//!
//! ## Authorization
//!
//! - `mint_to` needs `minter`, `burn` needs `burner`
//! - `transfer_from` needs the owner, the token's approved spender, or an
//!   operator approved for all of the owner's tokens
//!
//! Any approval on a token is cleared when it moves or burns.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use alloy_primitives::Address;
use parking_lot::Mutex;
use sich_shared::{ItemKind, TokenId};

use crate::access::{AccessControl, Role};
use crate::error::{Denial, EconomyError, EconomyResult};
use crate::events::{EventJournal, LedgerEvent};

/// Shared, single-writer handle to one item registry.
pub type ItemHandle = Arc<Mutex<ItemRegistry>>;

/// Ownership table of one item kind.
#[derive(Debug)]
pub struct ItemRegistry {
    kind: ItemKind,
    address: Address,
    base_uri: String,
    access: AccessControl,
    /// Live tokens only.
    owners: HashMap<TokenId, Address>,
    /// Live token count per owner.
    holdings: HashMap<Address, u64>,
    /// Single-token approvals.
    approvals: HashMap<TokenId, Address>,
    /// `(owner, operator)` pairs.
    operators: HashSet<(Address, Address)>,
    /// Highest id ever minted. `0` before the first mint.
    last_minted: TokenId,
    journal: EventJournal,
}

impl ItemRegistry {
    /// Creates an empty registry administered by `admin`.
    #[must_use]
    pub fn new(
        kind: ItemKind,
        address: Address,
        base_uri: impl Into<String>,
        admin: Address,
    ) -> Self {
        Self {
            kind,
            address,
            base_uri: base_uri.into(),
            access: AccessControl::new(address, admin),
            owners: HashMap::new(),
            holdings: HashMap::new(),
            approvals: HashMap::new(),
            operators: HashSet::new(),
            last_minted: 0,
            journal: EventJournal::new(),
        }
    }

    /// Wraps the registry in a shared handle.
    #[must_use]
    pub fn into_handle(self) -> ItemHandle {
        Arc::new(Mutex::new(self))
    }

    /// The kind of item this registry tracks.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// This registry's principal.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Collection name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Collection symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        self.kind.symbol()
    }

    /// Role table (read-only).
    #[must_use]
    pub const fn access(&self) -> &AccessControl {
        &self.access
    }

    /// Returns true if `principal` holds `role` on this registry.
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

    // ========================================================================
    // Queries
    // ========================================================================

    /// Current owner of `token_id`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the token was never minted or has been burned.
    pub fn owner_of(&self, token_id: TokenId) -> EconomyResult<Address> {
        self.owners
            .get(&token_id)
            .copied()
            .ok_or(EconomyError::NotFound(token_id))
    }

    /// Number of live tokens held by `owner`.
    #[must_use]
    pub fn balance_of(&self, owner: Address) -> u64 {
        self.holdings.get(&owner).copied().unwrap_or(0)
    }

    /// Approved spender of `token_id`, `Address::ZERO` if none.
    ///
    /// # Errors
    ///
    /// `NotFound` for unminted or burned tokens.
    pub fn get_approved(&self, token_id: TokenId) -> EconomyResult<Address> {
        self.owner_of(token_id)?;
        Ok(self.approvals.get(&token_id).copied().unwrap_or(Address::ZERO))
    }

    /// Returns true if `operator` may move every token of `owner`.
    #[must_use]
    pub fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.operators.contains(&(owner, operator))
    }

    /// Returns true if `spender` may move `token_id` right now.
    ///
    /// # Errors
    ///
    /// `NotFound` for unminted or burned tokens.
    pub fn is_approved_or_owner(&self, spender: Address, token_id: TokenId) -> EconomyResult<bool> {
        let owner = self.owner_of(token_id)?;
        Ok(spender == owner
            || self.approvals.get(&token_id) == Some(&spender)
            || self.is_approved_for_all(owner, spender))
    }

    /// Metadata URI: base URI followed by the decimal id.
    ///
    /// # Errors
    ///
    /// `NotFound` for unminted or burned tokens.
    pub fn token_uri(&self, token_id: TokenId) -> EconomyResult<String> {
        self.owner_of(token_id)?;
        Ok(format!("{}{token_id}", self.base_uri))
    }

    /// Base metadata URI.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Number of live (minted and not burned) tokens.
    #[must_use]
    pub fn total_supply(&self) -> u64 {
        self.owners.len() as u64
    }

    /// Highest id ever minted, `0` before the first mint.
    #[inline]
    #[must_use]
    pub const fn last_minted_token_id(&self) -> TokenId {
        self.last_minted
    }

    // ========================================================================
    // Mint / burn
    // ========================================================================

    /// Checks that `caller` could mint right now, without minting.
    ///
    /// # Errors
    ///
    /// `Unauthorized` without `minter`, `ArithmeticOverflow` if ids ran out.
    pub fn ensure_can_mint(&self, caller: Address) -> EconomyResult<TokenId> {
        self.access.require(Role::Minter, caller)?;
        self.last_minted
            .checked_add(1)
            .ok_or(EconomyError::ArithmeticOverflow)
    }

    /// Mints the next token to `to` and returns its id.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `caller` lacks `minter`
    /// - `InvalidArgument` if `to` is the zero address
    /// - `ArithmeticOverflow` if the id counter is exhausted
    pub fn mint_to(&mut self, caller: Address, to: Address) -> EconomyResult<TokenId> {
        let token_id = self.ensure_can_mint(caller)?;
        if to == Address::ZERO {
            return Err(EconomyError::InvalidArgument(
                "cannot mint to the zero address".to_string(),
            ));
        }

        self.last_minted = token_id;
        self.owners.insert(token_id, to);
        *self.holdings.entry(to).or_insert(0) += 1;

        tracing::info!(kind = %self.kind, %to, token_id, "item minted");
        self.journal.record(LedgerEvent::ItemTransfer {
            kind: self.kind,
            from: Address::ZERO,
            to,
            token_id,
        });
        Ok(token_id)
    }

    /// Burns `token_id` for good.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `caller` lacks `burner`
    /// - `NotFound` if the token was never minted or is already burned
    pub fn burn(&mut self, caller: Address, token_id: TokenId) -> EconomyResult<()> {
        self.access.require(Role::Burner, caller)?;
        let owner = self.owner_of(token_id)?;

        self.owners.remove(&token_id);
        self.approvals.remove(&token_id);
        self.decrement_holdings(owner);

        tracing::info!(kind = %self.kind, %owner, token_id, "item burned");
        self.journal.record(LedgerEvent::ItemTransfer {
            kind: self.kind,
            from: owner,
            to: Address::ZERO,
            token_id,
        });
        Ok(())
    }

    // ========================================================================
    // Approvals and transfers
    // ========================================================================

    /// Approves `spender` for `token_id`. `Address::ZERO` clears it.
    ///
    /// # Errors
    ///
    /// - `NotFound` for unminted or burned tokens
    /// - `Unauthorized` unless `caller` owns the token or operates for the owner
    /// - `InvalidArgument` if the owner approves itself
    pub fn approve(
        &mut self,
        caller: Address,
        spender: Address,
        token_id: TokenId,
    ) -> EconomyResult<()> {
        let owner = self.owner_of(token_id)?;
        if caller != owner && !self.is_approved_for_all(owner, caller) {
            return Err(EconomyError::Unauthorized {
                principal: caller,
                denial: Denial::NotOwnerOrApproved,
            });
        }
        if spender == owner {
            return Err(EconomyError::InvalidArgument(
                "approval to current owner".to_string(),
            ));
        }

        if spender == Address::ZERO {
            self.approvals.remove(&token_id);
        } else {
            self.approvals.insert(token_id, spender);
        }
        self.journal.record(LedgerEvent::ItemApproval {
            kind: self.kind,
            owner,
            spender,
            token_id,
        });
        Ok(())
    }

    /// Lets `operator` move every token of `caller`, or withdraws that.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `caller` approves itself.
    pub fn set_approval_for_all(
        &mut self,
        caller: Address,
        operator: Address,
        approved: bool,
    ) -> EconomyResult<()> {
        if caller == operator {
            return Err(EconomyError::InvalidArgument("approve to caller".to_string()));
        }

        if approved {
            self.operators.insert((caller, operator));
        } else {
            self.operators.remove(&(caller, operator));
        }
        self.journal.record(LedgerEvent::ItemApprovalForAll {
            kind: self.kind,
            owner: caller,
            operator,
            approved,
        });
        Ok(())
    }

    /// Moves `token_id` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - `NotFound` for unminted or burned tokens
    /// - `Unauthorized` unless `caller` is owner, approved spender or operator
    /// - `InvalidArgument` if `from` is not the owner or `to` is the zero address
    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> EconomyResult<()> {
        if !self.is_approved_or_owner(caller, token_id)? {
            return Err(EconomyError::Unauthorized {
                principal: caller,
                denial: Denial::NotOwnerOrApproved,
            });
        }
        let owner = self.owner_of(token_id)?;
        if owner != from {
            return Err(EconomyError::InvalidArgument(format!(
                "token {token_id} is not owned by {from}"
            )));
        }
        if to == Address::ZERO {
            return Err(EconomyError::InvalidArgument(
                "transfer to the zero address".to_string(),
            ));
        }

        self.approvals.remove(&token_id);
        self.decrement_holdings(from);
        *self.holdings.entry(to).or_insert(0) += 1;
        self.owners.insert(token_id, to);

        tracing::info!(kind = %self.kind, %from, %to, token_id, "item transferred");
        self.journal.record(LedgerEvent::ItemTransfer {
            kind: self.kind,
            from,
            to,
            token_id,
        });
        Ok(())
    }

    /// Takes every pending event.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        self.journal.drain()
    }

    fn decrement_holdings(&mut self, owner: Address) {
        if let Some(count) = self.holdings.get_mut(&owner) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.holdings.remove(&owner);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: Address = Address::repeat_byte(0xB0);
    const ADMIN: Address = Address::repeat_byte(0x01);
    const ALICE: Address = Address::repeat_byte(0x02);
    const BOB: Address = Address::repeat_byte(0x03);
    const CAROL: Address = Address::repeat_byte(0x04);

    fn registry() -> ItemRegistry {
        let mut registry = ItemRegistry::new(
            ItemKind::CossackSabre,
            REGISTRY,
            ItemKind::CossackSabre.default_uri(),
            ADMIN,
        );
        registry.grant_role(ADMIN, Role::Minter, ADMIN).unwrap();
        registry.grant_role(ADMIN, Role::Burner, ADMIN).unwrap();
        registry
    }

    #[test]
    fn test_ids_start_at_one() {
        let mut registry = registry();
        assert_eq!(registry.last_minted_token_id(), 0);

        assert_eq!(registry.mint_to(ADMIN, ALICE).unwrap(), 1);
        assert_eq!(registry.mint_to(ADMIN, BOB).unwrap(), 2);
        assert_eq!(registry.last_minted_token_id(), 2);
        assert_eq!(registry.owner_of(1).unwrap(), ALICE);
    }

    #[test]
    fn test_burned_ids_are_never_reused() {
        let mut registry = registry();
        let first = registry.mint_to(ADMIN, ALICE).unwrap();
        registry.burn(ADMIN, first).unwrap();

        let second = registry.mint_to(ADMIN, ALICE).unwrap();
        assert!(second > first);
        assert_eq!(registry.owner_of(first), Err(EconomyError::NotFound(first)));
        assert_eq!(registry.burn(ADMIN, first), Err(EconomyError::NotFound(first)));
    }

    #[test]
    fn test_burned_token_cannot_move_or_be_approved() {
        let mut registry = registry();
        let id = registry.mint_to(ADMIN, ALICE).unwrap();
        registry.set_approval_for_all(ALICE, BOB, true).unwrap();
        registry.burn(ADMIN, id).unwrap();
        registry.drain_events();

        assert_eq!(
            registry.transfer_from(ALICE, ALICE, CAROL, id),
            Err(EconomyError::NotFound(id))
        );
        assert_eq!(
            registry.transfer_from(BOB, ALICE, CAROL, id),
            Err(EconomyError::NotFound(id))
        );
        assert_eq!(registry.approve(ALICE, CAROL, id), Err(EconomyError::NotFound(id)));
        assert_eq!(registry.get_approved(id), Err(EconomyError::NotFound(id)));
        assert_eq!(registry.balance_of(CAROL), 0);
        assert!(registry.drain_events().is_empty());
    }

    #[test]
    fn test_mint_requires_minter() {
        let mut registry = registry();
        let result = registry.mint_to(ALICE, ALICE);
        assert!(matches!(result, Err(EconomyError::Unauthorized { .. })));
        assert_eq!(registry.last_minted_token_id(), 0);
    }

    #[test]
    fn test_burn_checks_role_before_existence() {
        let mut registry = registry();
        let result = registry.burn(ALICE, 42);
        assert!(matches!(result, Err(EconomyError::Unauthorized { .. })));
    }

    #[test]
    fn test_transfer_by_approved_spender_clears_approval() {
        let mut registry = registry();
        let id = registry.mint_to(ADMIN, ALICE).unwrap();

        registry.approve(ALICE, BOB, id).unwrap();
        assert_eq!(registry.get_approved(id).unwrap(), BOB);

        registry.transfer_from(BOB, ALICE, CAROL, id).unwrap();
        assert_eq!(registry.owner_of(id).unwrap(), CAROL);
        assert_eq!(registry.get_approved(id).unwrap(), Address::ZERO);
        assert_eq!(registry.balance_of(ALICE), 0);
        assert_eq!(registry.balance_of(CAROL), 1);
    }

    #[test]
    fn test_transfer_by_stranger_rejected() {
        let mut registry = registry();
        let id = registry.mint_to(ADMIN, ALICE).unwrap();

        let result = registry.transfer_from(BOB, ALICE, BOB, id);
        assert_eq!(
            result,
            Err(EconomyError::Unauthorized {
                principal: BOB,
                denial: Denial::NotOwnerOrApproved,
            })
        );
        assert_eq!(registry.owner_of(id).unwrap(), ALICE);
    }

    #[test]
    fn test_transfer_with_wrong_from_or_zero_receiver() {
        let mut registry = registry();
        let id = registry.mint_to(ADMIN, ALICE).unwrap();

        let result = registry.transfer_from(ALICE, BOB, CAROL, id);
        assert!(matches!(result, Err(EconomyError::InvalidArgument(_))));

        let result = registry.transfer_from(ALICE, ALICE, Address::ZERO, id);
        assert!(matches!(result, Err(EconomyError::InvalidArgument(_))));
    }

    #[test]
    fn test_operator_may_approve_and_transfer() {
        let mut registry = registry();
        let id = registry.mint_to(ADMIN, ALICE).unwrap();

        registry.set_approval_for_all(ALICE, BOB, true).unwrap();
        registry.approve(BOB, CAROL, id).unwrap();
        registry.transfer_from(BOB, ALICE, BOB, id).unwrap();
        assert_eq!(registry.owner_of(id).unwrap(), BOB);
    }

    #[test]
    fn test_burn_clears_approval_and_supply() {
        let mut registry = registry();
        let id = registry.mint_to(ADMIN, ALICE).unwrap();
        registry.approve(ALICE, BOB, id).unwrap();
        assert_eq!(registry.total_supply(), 1);

        registry.burn(ADMIN, id).unwrap();
        assert_eq!(registry.total_supply(), 0);
        assert_eq!(registry.get_approved(id), Err(EconomyError::NotFound(id)));
    }

    #[test]
    fn test_token_uri() {
        let mut registry = registry();
        let id = registry.mint_to(ADMIN, ALICE).unwrap();
        assert_eq!(registry.token_uri(id).unwrap(), "https://example.com/sabre/1");
        assert_eq!(registry.token_uri(9), Err(EconomyError::NotFound(9)));
        assert_eq!(registry.symbol(), "SABRE");
    }
}
