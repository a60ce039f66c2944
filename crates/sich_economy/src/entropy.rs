//! # Search Entropy
//!
//! Search yields are random. The engine asks an [`EntropySource`] for raw
//! 64-bit rolls and turns them into resources with a
//! [`YieldTable`](crate::search::YieldTable).
//!
//! ## Providers
//!
//! - [`SaltedEntropy`]: SipHash-2-4 keyed by a 256-bit server secret, mixed
//!   with the player, the timestamp and a never-reused nonce. A player who
//!   knows everything but the secret cannot predict a roll.
//! - [`RngEntropy`]: any `rand` generator. Seeded `ChaCha8Rng` for
//!   reproducible simulations, `StepRng` for scripted tests.
//!
//! ```text
//! roll = SipHash24(k1, k2)(player, timestamp, nonce)
//!   k1 = rotl(secret[0] + nonce, 13) ^ secret[1]
//!   k2 = rotl(secret[2] + timestamp, 17) ^ secret[3]
//! ```

use std::fmt;
use std::hash::Hasher;

use alloy_primitives::Address;
use rand::RngCore;
use siphasher::sip128::{Hasher128, SipHasher24};

/// Supplier of raw random rolls.
pub trait EntropySource: Send {
    /// Next 64-bit roll for `player` searching at `timestamp`.
    fn next_roll(&mut self, player: Address, timestamp: u64) -> u64;
}

/// Keyed-hash entropy with a server-side secret.
#[derive(Clone)]
pub struct SaltedEntropy {
    /// **Never expose.** 256-bit secret split into four words.
    secret: [u64; 4],
    /// Monotonic, never reused.
    nonce: u64,
}

impl SaltedEntropy {
    /// Creates a source from 32 secret bytes.
    #[must_use]
    pub fn new(secret: &[u8; 32]) -> Self {
        let mut words = [0u64; 4];
        for (word, chunk) in words.iter_mut().zip(secret.chunks_exact(8)) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            *word = u64::from_le_bytes(bytes);
        }
        Self {
            secret: words,
            nonce: 0,
        }
    }

    /// Creates a source with a secret drawn from `rng`.
    #[must_use]
    pub fn from_rng<R: RngCore>(rng: &mut R) -> Self {
        let mut secret = [0u8; 32];
        rng.fill_bytes(&mut secret);
        Self::new(&secret)
    }

    /// Number of rolls produced so far.
    #[inline]
    #[must_use]
    pub const fn nonce(&self) -> u64 {
        self.nonce
    }

    fn derive_keys(&self, timestamp: u64) -> (u64, u64) {
        let k1 = self.secret[0]
            .wrapping_add(self.nonce)
            .rotate_left(13)
            ^ self.secret[1];
        let k2 = self.secret[2]
            .wrapping_add(timestamp)
            .rotate_left(17)
            ^ self.secret[3];
        (k1, k2)
    }
}

impl EntropySource for SaltedEntropy {
    fn next_roll(&mut self, player: Address, timestamp: u64) -> u64 {
        let (k1, k2) = self.derive_keys(timestamp);
        let mut hasher = SipHasher24::new_with_keys(k1, k2);
        hasher.write(player.as_slice());
        hasher.write_u64(timestamp);
        hasher.write_u64(self.nonce);
        self.nonce = self.nonce.wrapping_add(1);

        let result = hasher.finish128();
        result.h1 ^ result.h2
    }
}

impl fmt::Debug for SaltedEntropy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaltedEntropy")
            .field("secret", &"[REDACTED]")
            .field("nonce", &self.nonce)
            .finish()
    }
}

/// Adapter from any `rand` generator. Ignores player and timestamp.
#[derive(Clone, Debug)]
pub struct RngEntropy<R> {
    rng: R,
}

impl<R: RngCore + Send> RngEntropy<R> {
    /// Wraps `rng`.
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore + Send> EntropySource for RngEntropy<R> {
    fn next_roll(&mut self, _player: Address, _timestamp: u64) -> u64 {
        self.rng.next_u64()
    }
}
