//! # Ledger Events
//!
//! Every committed mutation appends one event to the journal of the
//! component that owns the mutated state. Rejected calls append nothing.
//!
//! Mint and burn follow the token convention: a transfer from
//! `Address::ZERO` is a mint, a transfer to `Address::ZERO` is a burn.

use alloy_primitives::Address;
use sich_shared::{ItemKind, ResourceId, TokenId};

use crate::access::Role;
use crate::fixed_point::FixedPoint18;

/// Economic event for observers (indexers, UI, audit).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    /// A role was granted on an asset.
    RoleGranted {
        /// Asset whose registry changed.
        asset: Address,
        /// The role.
        role: Role,
        /// New holder.
        account: Address,
        /// Admin that granted it.
        sender: Address,
    },
    /// A role was revoked or renounced.
    RoleRevoked {
        /// Asset whose registry changed.
        asset: Address,
        /// The role.
        role: Role,
        /// Former holder.
        account: Address,
        /// Principal that removed it.
        sender: Address,
    },
    /// Single resource movement (mint, burn or transfer).
    ResourceTransfer {
        /// Principal that executed the call.
        operator: Address,
        /// Source (`ZERO` on mint).
        from: Address,
        /// Destination (`ZERO` on burn).
        to: Address,
        /// Resource type.
        resource: ResourceId,
        /// Quantity moved.
        quantity: u64,
    },
    /// Batched resource movement.
    ResourceBatchTransfer {
        /// Principal that executed the call.
        operator: Address,
        /// Source (`ZERO` on mint).
        from: Address,
        /// Destination (`ZERO` on burn).
        to: Address,
        /// Resource types and quantities, in call order.
        entries: Vec<(ResourceId, u64)>,
    },
    /// Operator approval on resources changed.
    ResourceApprovalForAll {
        /// Balance owner.
        owner: Address,
        /// Operator.
        operator: Address,
        /// New approval state.
        approved: bool,
    },
    /// Item ownership changed (mint, burn or transfer).
    ItemTransfer {
        /// Item kind.
        kind: ItemKind,
        /// Previous owner (`ZERO` on mint).
        from: Address,
        /// New owner (`ZERO` on burn).
        to: Address,
        /// Token.
        token_id: TokenId,
    },
    /// Single-token approval set.
    ItemApproval {
        /// Item kind.
        kind: ItemKind,
        /// Token owner.
        owner: Address,
        /// Approved spender (`ZERO` clears).
        spender: Address,
        /// Token.
        token_id: TokenId,
    },
    /// Operator approval on items changed.
    ItemApprovalForAll {
        /// Item kind.
        kind: ItemKind,
        /// Token owner.
        owner: Address,
        /// Operator.
        operator: Address,
        /// New approval state.
        approved: bool,
    },
    /// Reward currency moved (mint or transfer).
    RewardTransfer {
        /// Source (`ZERO` on mint).
        from: Address,
        /// Destination.
        to: Address,
        /// Amount.
        amount: FixedPoint18,
    },
    /// Reward allowance set.
    RewardApproval {
        /// Balance owner.
        owner: Address,
        /// Spender.
        spender: Address,
        /// New allowance.
        amount: FixedPoint18,
    },
    /// A player searched and received resources.
    Searched {
        /// The player.
        player: Address,
        /// Timestamp recorded as the player's last search.
        timestamp: u64,
        /// Resources granted (may be empty).
        yields: Vec<(ResourceId, u64)>,
    },
    /// The search cooldown was changed.
    SearchCooldownSet {
        /// New cooldown in seconds.
        seconds: u64,
    },
    /// A recipe was executed.
    Crafted {
        /// The player.
        player: Address,
        /// Item kind produced.
        kind: ItemKind,
        /// New token.
        token_id: TokenId,
    },
    /// A marketplace price changed.
    ItemRewardSet {
        /// Item registry address.
        item: Address,
        /// New payout per item.
        amount: FixedPoint18,
    },
    /// An item was sold to the marketplace.
    Sold {
        /// Seller.
        seller: Address,
        /// Item registry address.
        item: Address,
        /// Burned token.
        token_id: TokenId,
        /// Reward paid.
        payout: FixedPoint18,
    },
}

/// Append-only buffer of events owned by one component.
#[derive(Clone, Debug, Default)]
pub struct EventJournal {
    events: Vec<LedgerEvent>,
}

impl EventJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn record(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// Takes every pending event, leaving the journal empty.
    pub fn drain(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pending events, oldest first.
    #[must_use]
    pub fn pending(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_journal() {
        let mut journal = EventJournal::new();
        journal.record(LedgerEvent::SearchCooldownSet { seconds: 5 });
        assert_eq!(journal.len(), 1);

        let drained = journal.drain();
        assert_eq!(drained, vec![LedgerEvent::SearchCooldownSet { seconds: 5 }]);
        assert!(journal.is_empty());
    }
}
