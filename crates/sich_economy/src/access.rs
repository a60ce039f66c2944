//! # Access Registry
//!
//! Per-asset role table. Every ledger, registry, engine and marketplace owns
//! exactly one [`AccessControl`] and asks it before any privileged mutation.
//!
//! ## Rules
//!
//! 1. The principal given at construction starts as the only `admin`
//! 2. Only an `admin` may grant or revoke roles (including `admin` itself)
//! 3. Granting a held role or revoking an unheld one is a no-op success
//! 4. The last `admin` can never be removed (`InvariantViolation`)

use std::collections::HashSet;
use std::fmt;

use alloy_primitives::{keccak256, Address, B256};
use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, EconomyResult};
use crate::events::{EventJournal, LedgerEvent};

/// A named capability grantable per asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Role {
    /// May grant and revoke every role.
    Admin = 0,
    /// May mint.
    Minter = 1,
    /// May burn.
    Burner = 2,
}

impl Role {
    /// Every role, in table order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Minter, Self::Burner];

    /// 32-byte role identifier as used by on-chain access control:
    /// zero for admin, `keccak256("<NAME>_ROLE")` otherwise.
    #[must_use]
    pub fn id(self) -> B256 {
        match self {
            Self::Admin => B256::ZERO,
            Self::Minter => keccak256("MINTER_ROLE"),
            Self::Burner => keccak256("BURNER_ROLE"),
        }
    }

    #[inline]
    const fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::Minter => "minter",
            Self::Burner => "burner",
        })
    }
}

/// Role table of a single asset.
#[derive(Clone, Debug)]
pub struct AccessControl {
    /// The asset this table guards (used in events and logs).
    asset: Address,
    /// Holders, indexed by `Role::slot`.
    holders: [HashSet<Address>; 3],
}

impl AccessControl {
    /// Creates a table where `admin` is the sole administrator.
    #[must_use]
    pub fn new(asset: Address, admin: Address) -> Self {
        let mut holders: [HashSet<Address>; 3] = Default::default();
        holders[Role::Admin.slot()].insert(admin);
        Self { asset, holders }
    }

    /// Address of the guarded asset.
    #[inline]
    #[must_use]
    pub const fn asset(&self) -> Address {
        self.asset
    }

    /// Returns true if `principal` holds `role`.
    #[inline]
    #[must_use]
    pub fn has_role(&self, role: Role, principal: Address) -> bool {
        self.holders[role.slot()].contains(&principal)
    }

    /// Number of principals holding `role`.
    #[must_use]
    pub fn member_count(&self, role: Role) -> usize {
        self.holders[role.slot()].len()
    }

    /// Fails fast with `Unauthorized` unless `principal` holds `role`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` with [`crate::Denial::MissingRole`].
    pub fn require(&self, role: Role, principal: Address) -> EconomyResult<()> {
        if self.has_role(role, principal) {
            Ok(())
        } else {
            tracing::warn!(asset = %self.asset, %principal, %role, "role check failed");
            Err(EconomyError::missing_role(principal, role))
        }
    }

    /// Grants `role` to `account`. Caller must be an admin.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not an admin.
    pub fn grant_role(
        &mut self,
        caller: Address,
        role: Role,
        account: Address,
        journal: &mut EventJournal,
    ) -> EconomyResult<()> {
        self.require(Role::Admin, caller)?;

        if self.holders[role.slot()].insert(account) {
            tracing::info!(asset = %self.asset, %role, %account, sender = %caller, "role granted");
            journal.record(LedgerEvent::RoleGranted {
                asset: self.asset,
                role,
                account,
                sender: caller,
            });
        }
        Ok(())
    }

    /// Revokes `role` from `account`. Caller must be an admin.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `caller` is not an admin
    /// - `InvariantViolation` if this would remove the last admin
    pub fn revoke_role(
        &mut self,
        caller: Address,
        role: Role,
        account: Address,
        journal: &mut EventJournal,
    ) -> EconomyResult<()> {
        self.require(Role::Admin, caller)?;
        self.remove(caller, role, account, journal)
    }

    /// Drops `role` from `caller` itself. No admin rights needed.
    ///
    /// # Errors
    ///
    /// `InvariantViolation` if `caller` is the last admin renouncing `admin`.
    pub fn renounce_role(
        &mut self,
        caller: Address,
        role: Role,
        journal: &mut EventJournal,
    ) -> EconomyResult<()> {
        self.remove(caller, role, caller, journal)
    }

    fn remove(
        &mut self,
        sender: Address,
        role: Role,
        account: Address,
        journal: &mut EventJournal,
    ) -> EconomyResult<()> {
        if !self.has_role(role, account) {
            return Ok(());
        }
        if role == Role::Admin && self.member_count(Role::Admin) == 1 {
            return Err(EconomyError::InvariantViolation(format!(
                "cannot remove the last admin of {}",
                self.asset
            )));
        }

        self.holders[role.slot()].remove(&account);
        tracing::info!(asset = %self.asset, %role, %account, %sender, "role revoked");
        journal.record(LedgerEvent::RoleRevoked {
            asset: self.asset,
            role,
            account,
            sender,
        });
        Ok(())
    }
}
