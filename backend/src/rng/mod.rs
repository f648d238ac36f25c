//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, seedable random number generation.
//! CRITICAL: Order generation, probabilistic transitions and stock shocks
//! all draw from this module so that a seed reproduces a whole run.

mod xorshift;

pub use xorshift::RngManager;
