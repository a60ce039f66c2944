//! # SICH Economy
//!
//! State-transition ledger for a closed in-game economy: players search
//! for resources, craft them into unique items, and sell items for the
//! reward currency.
//!
//! ## Design Principles
//!
//! 1. **All or nothing** - every precondition is checked before the first
//!    mutation; a failed call leaves every balance untouched
//! 2. **Explicit capabilities** - each component owns a role table and
//!    checks it before any privileged write
//! 3. **Zero floating point** - resources are `u64`, rewards are
//!    [`FixedPoint18`]
//! 4. **Injected time and randomness** - [`Clock`] and [`EntropySource`]
//!
//! ## Thread Safety
//!
//! Every component lives behind an `Arc<parking_lot::Mutex<_>>`. Operations
//! spanning components lock in one global order (engine or marketplace,
//! then resources, then item registry, then rewards) and hold the locks
//! until they finish, so effects are serialized.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use alloy_primitives::Address;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use sich_economy::{Economy, EconomyConfig, ManualClock, RngEntropy};
//!
//! let admin = Address::repeat_byte(0x01);
//! let player = Address::repeat_byte(0x02);
//! let economy = Economy::bootstrap(
//!     &EconomyConfig::with_admin(admin),
//!     Arc::new(ManualClock::new(0)),
//!     Box::new(RngEntropy::new(ChaCha8Rng::seed_from_u64(7))),
//! )?;
//!
//! let outcome = economy.search(player)?;
//! assert_eq!(outcome.next_search_at, 60);
//! # Ok::<(), sich_economy::EconomyError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod access;
pub mod clock;
pub mod config;
pub mod crafting;
pub mod entropy;
pub mod error;
pub mod events;
pub mod fixed_point;
pub mod integration;
pub mod items;
pub mod marketplace;
pub mod resources;
pub mod reward;
pub mod search;

pub use access::{AccessControl, Role};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EconomyConfig, PerKind};
pub use crafting::{
    CraftReceipt, CraftingEngine, EngineHandle, Recipe, RecipeBook, RecipeItem, SearchOutcome,
};
pub use entropy::{EntropySource, RngEntropy, SaltedEntropy};
pub use error::{Denial, EconomyError, EconomyResult};
pub use events::{EventJournal, LedgerEvent};
pub use fixed_point::FixedPoint18;
pub use integration::{Asset, Economy};
pub use items::{ItemHandle, ItemRegistry};
pub use marketplace::{Marketplace, MarketplaceHandle, SaleReceipt};
pub use resources::{ResourceHandle, ResourceLedger};
pub use reward::{RewardHandle, RewardLedger};
pub use search::{YieldEntry, YieldTable};
