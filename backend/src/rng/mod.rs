//! Deterministic random number generation
//!
//! Episodes draw their simulator seeds from a xorshift64* stream seeded by the
//! configured seed, so a run of resets is reproducible end to end.

mod xorshift;

pub use xorshift::SeedRng;
