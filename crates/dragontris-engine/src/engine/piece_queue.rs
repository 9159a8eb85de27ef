use std::{fmt::Write as _, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Supplies pieces with a single-piece lookahead.
///
/// Every draw is independent and uniform over the seven kinds. There is no
/// bag, so the same kind can repeat any number of times.
///
/// # Example
///
/// ```
/// use dragontris_engine::{PieceQueue, PieceSeed};
///
/// let seed: PieceSeed = "000102030405060708090a0b0c0d0e0f".parse().unwrap();
/// let mut a = PieceQueue::with_seed(seed);
/// let mut b = PieceQueue::with_seed(seed);
///
/// let next = a.peek_next();
/// assert_eq!(a.pop_next(), next);
/// assert_eq!(b.pop_next(), next);
/// ```
#[derive(Debug, Clone)]
pub struct PieceQueue {
    rng: Pcg32,
    next: PieceKind,
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the piece generator, written as 32 hex digits. Using the
/// same seed produces the same sequence of pieces, which makes sessions
/// reproducible for debugging and testing.
///
/// # Example
///
/// ```
/// use dragontris_engine::{GameSession, PieceSeed, SessionConfig};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let config = SessionConfig { seed: Some(seed), ..SessionConfig::default() };
///
/// let a = GameSession::new(config.clone());
/// let b = GameSession::new(config);
/// // Both sessions will draw the same piece sequence.
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

/// Error returned when a seed string is not 32 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed: {reason}")]
pub struct ParsePieceSeedError {
    reason: String,
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(ParsePieceSeedError {
                reason: format!("expected 32 characters, got {}", hex_str.len()),
            });
        }
        if let Some(c) = hex_str.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ParsePieceSeedError {
                reason: format!("{hex_str} (unexpected character {c:?})"),
            });
        }
        let num = u128::from_str_radix(hex_str, 16).map_err(|e| ParsePieceSeedError {
            reason: format!("{hex_str} ({e})"),
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl std::fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{self}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceQueue {
    /// Creates a queue seeded from the thread-local generator.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let mut rng = Pcg32::from_seed(seed.0);
        let next = rng.random();
        Self { rng, next }
    }

    /// Returns the lookahead piece without consuming it.
    #[must_use]
    pub fn peek_next(&self) -> PieceKind {
        self.next
    }

    /// Takes the lookahead piece and draws a fresh one behind it.
    pub fn pop_next(&mut self) -> PieceKind {
        let fresh = self.rng.random();
        std::mem::replace(&mut self.next, fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_from_bytes(bytes: [u8; 16]) -> PieceSeed {
        PieceSeed(bytes)
    }

    #[test]
    fn test_roundtrip_random_seed() {
        let seed: PieceSeed = rand::rng().random();
        let serialized = serde_json::to_string(&seed).unwrap();
        let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(seed, deserialized);
    }

    #[test]
    fn test_known_value_sequential_bytes() {
        // Big-endian: bytes appear in order as hex pairs
        let seed = seed_from_bytes([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ]);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
        assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
    }

    #[test]
    fn test_parse_uppercase_hex() {
        let seed: PieceSeed = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
        assert_eq!(seed.0[0], 0x01);
        assert_eq!(seed.0[15], 0x10);
    }

    #[test]
    fn test_parse_errors() {
        for bad in [
            "",
            "0123456789abcdef0123456789abcde",
            "0123456789abcdef0123456789abcdef0",
            "ghijklmnopqrstuvwxyzghijklmnopqr",
            "+123456789abcdef0123456789abcdef",
            " 123456789abcdef0123456789abcdef",
        ] {
            let err = bad.parse::<PieceSeed>().unwrap_err();
            assert!(err.to_string().contains("invalid hex"), "{bad:?}");
            assert!(serde_json::from_str::<PieceSeed>(&format!("\"{bad}\"")).is_err());
        }
    }

    #[test]
    fn test_deterministic_piece_generation() {
        let seed = seed_from_bytes([
            0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66,
            0x77, 0x88,
        ]);
        let mut queue1 = PieceQueue::with_seed(seed);
        let mut queue2 = PieceQueue::with_seed(seed);
        for _ in 0..20 {
            assert_eq!(queue1.peek_next(), queue2.peek_next());
            assert_eq!(queue1.pop_next(), queue2.pop_next());
        }
    }

    #[test]
    fn test_pop_returns_previous_lookahead() {
        let mut queue = PieceQueue::with_seed(seed_from_bytes([7; 16]));
        for _ in 0..50 {
            let expected = queue.peek_next();
            assert_eq!(queue.pop_next(), expected);
        }
    }
}
