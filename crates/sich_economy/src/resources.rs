//! # Resource Ledger
//!
//! Multi-type fungible balances keyed by `(owner, resource type)`.
//!
//! ## Guarantees
//!
//! 1. **No negative balances**: burns and transfers are checked against the
//!    current balance before anything changes
//! 2. **Role-gated supply**: only `minter` mints, only `burner` burns
//! 3. **Atomic batches**: a batch validates every entry (duplicates summed)
//!    before applying any of them
//!
//! Total supply per type always equals the sum of all balances of that type.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use alloy_primitives::Address;
use parking_lot::Mutex;
use sich_shared::{ResourceId, RESOURCE_TYPE_COUNT};

use crate::access::{AccessControl, Role};
use crate::error::{Denial, EconomyError, EconomyResult};
use crate::events::{EventJournal, LedgerEvent};

/// Shared, single-writer handle to the resource ledger.
pub type ResourceHandle = Arc<Mutex<ResourceLedger>>;

/// Fungible resource balances for every player.
#[derive(Debug)]
pub struct ResourceLedger {
    /// This ledger's own principal.
    address: Address,
    /// Base metadata URI.
    uri: String,
    /// Role table.
    access: AccessControl,
    /// Non-zero balances only.
    balances: HashMap<(Address, ResourceId), u64>,
    /// Total supply per resource type.
    supply: HashMap<ResourceId, u64>,
    /// `(owner, operator)` pairs with blanket transfer approval.
    operators: HashSet<(Address, Address)>,
    /// Pending events.
    journal: EventJournal,
}

impl ResourceLedger {
    /// Creates an empty ledger administered by `admin`.
    #[must_use]
    pub fn new(address: Address, uri: impl Into<String>, admin: Address) -> Self {
        Self {
            address,
            uri: uri.into(),
            access: AccessControl::new(address, admin),
            balances: HashMap::new(),
            supply: HashMap::new(),
            operators: HashSet::new(),
            journal: EventJournal::new(),
        }
    }

    /// Wraps the ledger in a shared handle.
    #[must_use]
    pub fn into_handle(self) -> ResourceHandle {
        Arc::new(Mutex::new(self))
    }

    /// This ledger's principal.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Base metadata URI.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
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

    // ========================================================================
    // Queries
    // ========================================================================

    /// Balance of `owner` for `resource`. Unknown types hold nothing.
    #[must_use]
    pub fn balance_of(&self, owner: Address, resource: ResourceId) -> u64 {
        self.balances.get(&(owner, resource)).copied().unwrap_or(0)
    }

    /// Element-wise balances of `owners[i]` for `resources[i]`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the slices differ in length.
    pub fn balance_of_batch(
        &self,
        owners: &[Address],
        resources: &[ResourceId],
    ) -> EconomyResult<Vec<u64>> {
        ensure_same_len(owners.len(), resources.len())?;
        Ok(owners
            .iter()
            .zip(resources)
            .map(|(owner, resource)| self.balance_of(*owner, *resource))
            .collect())
    }

    /// Sum of all balances of `resource`.
    #[must_use]
    pub fn total_supply(&self, resource: ResourceId) -> u64 {
        self.supply.get(&resource).copied().unwrap_or(0)
    }

    /// Returns true if `operator` may move every resource of `owner`.
    #[must_use]
    pub fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.operators.contains(&(owner, operator))
    }

    // ========================================================================
    // Supply changes
    // ========================================================================

    /// Mints `quantity` of `resource` to `to`. Requires `minter`.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `caller` lacks `minter`
    /// - `InvalidArgument` for an unknown resource type or the zero address
    /// - `InvalidAmount` for a zero quantity
    /// - `ArithmeticOverflow` if a balance or the supply would overflow
    pub fn mint(
        &mut self,
        caller: Address,
        to: Address,
        resource: ResourceId,
        quantity: u64,
    ) -> EconomyResult<()> {
        self.access.require(Role::Minter, caller)?;
        ensure_receiver(to)?;
        let credits = self.stage_credits(to, &[(resource, quantity)])?;

        self.apply(&credits);
        tracing::info!(%to, %resource, quantity, "resource minted");
        self.journal.record(LedgerEvent::ResourceTransfer {
            operator: caller,
            from: Address::ZERO,
            to,
            resource,
            quantity,
        });
        Ok(())
    }

    /// Mints several resource types to `to` in one all-or-nothing call.
    ///
    /// # Errors
    ///
    /// As [`ResourceLedger::mint`], plus `InvalidArgument` on length mismatch.
    pub fn mint_batch(
        &mut self,
        caller: Address,
        to: Address,
        resources: &[ResourceId],
        quantities: &[u64],
    ) -> EconomyResult<()> {
        self.access.require(Role::Minter, caller)?;
        ensure_receiver(to)?;
        let entries = zip_entries(resources, quantities)?;
        let credits = self.stage_credits(to, &entries)?;

        self.apply(&credits);
        tracing::info!(%to, entries = entries.len(), "resource batch minted");
        self.journal.record(LedgerEvent::ResourceBatchTransfer {
            operator: caller,
            from: Address::ZERO,
            to,
            entries,
        });
        Ok(())
    }

    /// Burns `quantity` of `resource` held by `from`. Requires `burner`.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `caller` lacks `burner`
    /// - `InvalidArgument` for an unknown resource type
    /// - `InvalidAmount` for a zero quantity
    /// - `InsufficientBalance` if `quantity` exceeds the balance
    pub fn burn(
        &mut self,
        caller: Address,
        from: Address,
        resource: ResourceId,
        quantity: u64,
    ) -> EconomyResult<()> {
        self.access.require(Role::Burner, caller)?;
        let debits = self.stage_debits(from, &[(resource, quantity)])?;

        self.apply(&debits);
        tracing::info!(%from, %resource, quantity, "resource burned");
        self.journal.record(LedgerEvent::ResourceTransfer {
            operator: caller,
            from,
            to: Address::ZERO,
            resource,
            quantity,
        });
        Ok(())
    }

    /// Burns several resource types from `from` in one all-or-nothing call.
    ///
    /// # Errors
    ///
    /// As [`ResourceLedger::burn`], plus `InvalidArgument` on length mismatch.
    pub fn burn_batch(
        &mut self,
        caller: Address,
        from: Address,
        resources: &[ResourceId],
        quantities: &[u64],
    ) -> EconomyResult<()> {
        self.access.require(Role::Burner, caller)?;
        let entries = zip_entries(resources, quantities)?;
        let debits = self.stage_debits(from, &entries)?;

        self.apply(&debits);
        tracing::info!(%from, entries = entries.len(), "resource batch burned");
        self.journal.record(LedgerEvent::ResourceBatchTransfer {
            operator: caller,
            from,
            to: Address::ZERO,
            entries,
        });
        Ok(())
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    /// Lets `operator` move every resource of `caller`, or withdraws that.
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
            return Err(EconomyError::InvalidArgument(
                "cannot set approval status for self".to_string(),
            ));
        }

        if approved {
            self.operators.insert((caller, operator));
        } else {
            self.operators.remove(&(caller, operator));
        }
        self.journal.record(LedgerEvent::ResourceApprovalForAll {
            owner: caller,
            operator,
            approved,
        });
        Ok(())
    }

    /// Moves `quantity` of `resource` from `from` to `to`.
    ///
    /// `caller` must be `from` or an approved operator of `from`.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `caller` is neither owner nor operator
    /// - `InvalidArgument` for the zero address or an unknown type
    /// - `InvalidAmount` for a zero quantity
    /// - `InsufficientBalance` if `quantity` exceeds the balance
    pub fn safe_transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        resource: ResourceId,
        quantity: u64,
    ) -> EconomyResult<()> {
        if caller != from && !self.is_approved_for_all(from, caller) {
            return Err(EconomyError::Unauthorized {
                principal: caller,
                denial: Denial::NotOwnerOrApproved,
            });
        }
        ensure_receiver(to)?;
        let debits = self.stage_debits(from, &[(resource, quantity)])?;

        if from != to {
            let credit = self
                .balance_of(to, resource)
                .checked_add(quantity)
                .ok_or(EconomyError::ArithmeticOverflow)?;
            for debit in &debits {
                self.set_balance(from, resource, debit.new_balance);
            }
            self.set_balance(to, resource, credit);
        }

        tracing::info!(%from, %to, %resource, quantity, "resource transferred");
        self.journal.record(LedgerEvent::ResourceTransfer {
            operator: caller,
            from,
            to,
            resource,
            quantity,
        });
        Ok(())
    }

    /// Takes every pending event.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        self.journal.drain()
    }

    // ========================================================================
    // Staging: validate everything, mutate nothing
    // ========================================================================

    /// Computes post-mint balances and supplies, or fails without touching state.
    fn stage_credits(
        &self,
        owner: Address,
        entries: &[(ResourceId, u64)],
    ) -> EconomyResult<Vec<StagedEntry>> {
        aggregate(entries)?
            .into_iter()
            .map(|(resource, quantity)| {
                let new_balance = self
                    .balance_of(owner, resource)
                    .checked_add(quantity)
                    .ok_or(EconomyError::ArithmeticOverflow)?;
                let new_supply = self
                    .total_supply(resource)
                    .checked_add(quantity)
                    .ok_or(EconomyError::ArithmeticOverflow)?;
                Ok(StagedEntry { owner, resource, new_balance, new_supply })
            })
            .collect()
    }

    /// Computes post-burn balances and supplies, or fails without touching state.
    fn stage_debits(
        &self,
        owner: Address,
        entries: &[(ResourceId, u64)],
    ) -> EconomyResult<Vec<StagedEntry>> {
        aggregate(entries)?
            .into_iter()
            .map(|(resource, quantity)| {
                let available = self.balance_of(owner, resource);
                let new_balance = available.checked_sub(quantity).ok_or(
                    EconomyError::InsufficientBalance {
                        required: u128::from(quantity),
                        available: u128::from(available),
                    },
                )?;
                // Supply >= any single balance, so this cannot underflow.
                let new_supply = self.total_supply(resource).saturating_sub(quantity);
                Ok(StagedEntry { owner, resource, new_balance, new_supply })
            })
            .collect()
    }

    fn apply(&mut self, staged: &[StagedEntry]) {
        for entry in staged {
            self.set_balance(entry.owner, entry.resource, entry.new_balance);
            self.supply.insert(entry.resource, entry.new_supply);
        }
    }

    fn set_balance(&mut self, owner: Address, resource: ResourceId, balance: u64) {
        if balance == 0 {
            self.balances.remove(&(owner, resource));
        } else {
            self.balances.insert((owner, resource), balance);
        }
    }
}

/// A validated balance/supply change waiting to be applied.
#[derive(Clone, Copy, Debug)]
struct StagedEntry {
    owner: Address,
    resource: ResourceId,
    new_balance: u64,
    new_supply: u64,
}

/// Validates entries and sums duplicates per resource type.
fn aggregate(entries: &[(ResourceId, u64)]) -> EconomyResult<BTreeMap<ResourceId, u64>> {
    let mut totals = BTreeMap::new();
    for &(resource, quantity) in entries {
        ensure_resource(resource)?;
        if quantity == 0 {
            return Err(EconomyError::InvalidAmount);
        }
        let total: &mut u64 = totals.entry(resource).or_insert(0);
        *total = total.checked_add(quantity).ok_or(EconomyError::ArithmeticOverflow)?;
    }
    Ok(totals)
}

fn zip_entries(
    resources: &[ResourceId],
    quantities: &[u64],
) -> EconomyResult<Vec<(ResourceId, u64)>> {
    ensure_same_len(resources.len(), quantities.len())?;
    Ok(resources.iter().copied().zip(quantities.iter().copied()).collect())
}

fn ensure_resource(resource: ResourceId) -> EconomyResult<()> {
    if resource.get() < RESOURCE_TYPE_COUNT {
        Ok(())
    } else {
        Err(EconomyError::InvalidArgument(format!(
            "unknown resource type {}",
            resource.get()
        )))
    }
}

fn ensure_receiver(to: Address) -> EconomyResult<()> {
    if to == Address::ZERO {
        Err(EconomyError::InvalidArgument("receiver is the zero address".to_string()))
    } else {
        Ok(())
    }
}

fn ensure_same_len(left: usize, right: usize) -> EconomyResult<()> {
    if left == right {
        Ok(())
    } else {
        Err(EconomyError::InvalidArgument(format!(
            "length mismatch: {left} vs {right}"
        )))
    }
}
