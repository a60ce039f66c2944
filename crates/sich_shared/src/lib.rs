//! # SICH Shared
//!
//! Identifiers and constants used by every economy component.
//!
//! ## CRITICAL RULE
//!
//! This crate holds no state. Anything that owns a balance or an ownership
//! map lives in `sich_economy`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod address;
pub mod constants;
pub mod ids;

pub use address::derive_contract_address;
pub use constants::{
    DEFAULT_SEARCH_COOLDOWN_SECS, DIAMOND, GOLD, IRON, LEATHER, RESOURCE_TYPE_COUNT,
    REWARD_DECIMALS, STONE, WOOD,
};
pub use ids::{ItemKind, Principal, ResourceId, TokenId};
