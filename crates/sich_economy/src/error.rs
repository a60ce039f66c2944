//! # Economy Error Types
//!
//! All errors that can occur in the economy system.
//!
//! Every failing call leaves state exactly as it was before the call.

use std::fmt;

use alloy_primitives::Address;
use sich_shared::{ResourceId, TokenId};
use thiserror::Error;

use crate::access::Role;

/// Why a principal was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Denial {
    /// The principal does not hold the role on the asset.
    MissingRole(Role),
    /// The principal does not own the item.
    NotOwner,
    /// The principal is neither the owner nor an approved spender/operator.
    NotOwnerOrApproved,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRole(role) => write!(f, "missing role {role}"),
            Self::NotOwner => f.write_str("not the owner"),
            Self::NotOwnerOrApproved => f.write_str("not the owner or an approved spender"),
        }
    }
}

/// Errors that can occur in the economy system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    /// Caller lacks the role or ownership the operation requires.
    #[error("unauthorized: {principal} ({denial})")]
    Unauthorized {
        /// The rejected principal.
        principal: Address,
        /// Why it was rejected.
        denial: Denial,
    },

    /// Burn or transfer exceeds the holder's balance.
    #[error("insufficient balance: need {required}, have {available}")]
    InsufficientBalance {
        /// Amount requested (base units).
        required: u128,
        /// Amount held (base units).
        available: u128,
    },

    /// A recipe requirement is not met.
    #[error("insufficient resources: need {required} of {resource}, have {available}")]
    InsufficientResources {
        /// The missing resource.
        resource: ResourceId,
        /// Quantity the recipe requires.
        required: u64,
        /// Quantity the player holds.
        available: u64,
    },

    /// Zero quantity where a positive one is required.
    #[error("invalid amount: must be greater than zero")]
    InvalidAmount,

    /// Malformed argument (length mismatch, unknown resource, zero address...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Search attempted before the cooldown elapsed.
    #[error("cooldown active: {remaining_secs}s remaining")]
    CooldownActive {
        /// Seconds until the next search is allowed.
        remaining_secs: u64,
    },

    /// Token was never minted or has been burned.
    #[error("token not found: {0}")]
    NotFound(TokenId),

    /// The call would break a ledger invariant (e.g. remove the last admin).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Arithmetic overflow in a balance, supply, or counter.
    #[error("arithmetic overflow in economic calculation")]
    ArithmeticOverflow,

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EconomyError {
    /// Shorthand for a missing-role rejection.
    #[must_use]
    pub const fn missing_role(principal: Address, role: Role) -> Self {
        Self::Unauthorized {
            principal,
            denial: Denial::MissingRole(role),
        }
    }
}

/// Result type for economy operations.
pub type EconomyResult<T> = Result<T, EconomyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EconomyError::missing_role(Address::ZERO, Role::Minter);
        assert!(err.to_string().contains("missing role minter"));

        let err = EconomyError::InsufficientResources {
            resource: ResourceId::new(1),
            required: 3,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "insufficient resources: need 3 of Iron#1, have 1"
        );
    }
}
