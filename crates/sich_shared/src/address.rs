//! Deterministic component addresses.
//!
//! Engine, marketplace and ledgers are principals too: roles are granted to
//! their addresses. Deriving those addresses from the deployer and a nonce
//! keeps them stable across runs with the same configuration.

use alloy_primitives::{keccak256, Address};

/// Derives the address of the `nonce`-th component created by `deployer`.
///
/// `keccak256(deployer ++ nonce_be)`, last 20 bytes.
#[must_use]
pub fn derive_contract_address(deployer: Address, nonce: u64) -> Address {
    let mut preimage = [0u8; 28];
    preimage[..20].copy_from_slice(deployer.as_slice());
    preimage[20..].copy_from_slice(&nonce.to_be_bytes());
    let hash = keccak256(preimage);
    Address::from_slice(&hash[12..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let deployer = Address::repeat_byte(0xAB);
        assert_eq!(
            derive_contract_address(deployer, 3),
            derive_contract_address(deployer, 3)
        );
    }

    #[test]
    fn test_nonce_changes_address() {
        let deployer = Address::repeat_byte(0xAB);
        assert_ne!(
            derive_contract_address(deployer, 0),
            derive_contract_address(deployer, 1)
        );
        assert_ne!(derive_contract_address(deployer, 0), Address::ZERO);
    }
}
