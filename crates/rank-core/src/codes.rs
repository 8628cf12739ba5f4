//! Tracking-number and receiver-OTP generation.
//!
//! # Determinism
//!
//! The generator wraps a `SmallRng`.  Production seeds it from OS entropy;
//! tests pass a fixed seed so generated codes are reproducible.  Uniqueness
//! of tracking numbers is not guaranteed here: the dispatcher checks the
//! store and regenerates on collision.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Prefix shared by every tracking number.
pub const TRACKING_PREFIX: &str = "TRK-";

/// Number of random characters after [`TRACKING_PREFIX`].
pub const TRACKING_BODY_LEN: usize = 10;

/// Unambiguous uppercase alphanumerics (no `0/O`, `1/I`).
const TRACKING_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Source of parcel tracking numbers and one-time PINs.
pub struct CodeGenerator(SmallRng);

impl CodeGenerator {
    /// Seed deterministically.
    pub fn seeded(seed: u64) -> Self {
        CodeGenerator(SmallRng::seed_from_u64(seed))
    }

    /// Seed from OS entropy.
    pub fn from_entropy() -> Self {
        CodeGenerator(SmallRng::from_entropy())
    }

    /// Seeded when `seed` is `Some`, entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::seeded(s),
            None    => Self::from_entropy(),
        }
    }

    /// A fresh tracking number, e.g. `TRK-7QK2M9XH4C`.
    pub fn tracking_number(&mut self) -> String {
        let mut out = String::with_capacity(TRACKING_PREFIX.len() + TRACKING_BODY_LEN);
        out.push_str(TRACKING_PREFIX);
        for _ in 0..TRACKING_BODY_LEN {
            let i = self.0.gen_range(0..TRACKING_ALPHABET.len());
            out.push(TRACKING_ALPHABET[i] as char);
        }
        out
    }

    /// A numeric OTP of exactly `digits` characters (leading zeros allowed).
    pub fn otp(&mut self, digits: u8) -> String {
        (0..digits)
            .map(|_| char::from(b'0' + self.0.gen_range(0..10u8)))
            .collect()
    }
}

/// `true` if `s` has the shape produced by [`CodeGenerator::tracking_number`].
pub fn is_tracking_number(s: &str) -> bool {
    s.strip_prefix(TRACKING_PREFIX).is_some_and(|body| {
        body.len() == TRACKING_BODY_LEN && body.bytes().all(|b| TRACKING_ALPHABET.contains(&b))
    })
}
