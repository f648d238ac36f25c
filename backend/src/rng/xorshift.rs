//! xorshift64* random number generator
//!
//! xorshift64* passes BigCrush and keeps 64 bits of state, which is all the
//! simulator needs to replay a kiosk session from its seed.
//!
//! # Determinism
//!
//! Same seed → same sequence. Tests rely on this to assert exact outcomes of
//! probabilistic ticks.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use kiosk_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let roll = rng.range(0, 100); // [0, 100)
/// let coin = rng.chance(0.5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is replaced by 1 (xorshift never leaves the zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Generate random f64 in range [min, max)
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }

    /// Bernoulli trial: true with the given probability
    ///
    /// Probabilities outside [0, 1] saturate, so `chance(0.0)` never fires and
    /// `chance(1.0)` always does.
    ///
    /// # Example
    /// ```
    /// use kiosk_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// assert!(!rng.chance(0.0));
    /// assert!(rng.chance(1.0));
    /// ```
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Pick a uniformly random index into a collection of `len` elements
    ///
    /// Returns `None` for empty collections.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some((self.next() % len as u64) as usize)
    }

    /// Pick a uniformly random element of a slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.index(items.len()).map(|i| &items[i])
    }

    /// Random (version 4 layout) UUID built from two draws
    ///
    /// Ids made this way replay exactly under the same seed.
    pub fn next_uuid(&mut self) -> Uuid {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.next().to_le_bytes());
        bytes[8..].copy_from_slice(&self.next().to_le_bytes());
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }

    /// Get current RNG state
    pub fn get_state(&self) -> u64 {
        self.state
    }
}
