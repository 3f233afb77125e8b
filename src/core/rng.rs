//! Deterministic random number generation.
//!
//! Everything random in a match flows through one seeded `GameRng`:
//! - shootout reference points
//! - the coin flip that settles a tied shootout
//! - capability tokens
//!
//! Same seed, same match. Tests rely on this.
//!
//! ```
//! use billiard_table::core::GameRng;
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! assert_eq!(a.coin_flip(), b.coin_flip());
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::ball::{Position, Region};
use super::player::Token;

/// Seeded ChaCha8 generator.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in `[low, high)`. Returns `low` for an empty range.
    pub fn gen_range_f64(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.inner.gen_range(low..high)
    }

    /// Uniform point inside a region.
    pub fn point_in(&mut self, region: &Region) -> Position {
        Position::new(
            self.gen_range_f64(region.min.x, region.max.x).round(),
            self.gen_range_f64(region.min.y, region.max.y).round(),
        )
    }

    /// Unweighted coin flip.
    pub fn coin_flip(&mut self) -> bool {
        self.inner.gen_bool(0.5)
    }

    /// Fresh 256-bit capability token, hex encoded.
    pub fn token(&mut self) -> Token {
        let bytes: [u8; 32] = self.inner.gen();
        Token::new(bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.gen_range_f64(0.0, 1000.0), rng2.gen_range_f64(0.0, 1000.0));
        }
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = GameRng::new(1);
        let mut rng2 = GameRng::new(2);

        let seq1: Vec<_> = (0..10).map(|_| rng1.gen_range_f64(0.0, 1000.0)).collect();
        let seq2: Vec<_> = (0..10).map(|_| rng2.gen_range_f64(0.0, 1000.0)).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_empty_range() {
        let mut rng = GameRng::new(7);
        assert_eq!(rng.gen_range_f64(5.0, 5.0), 5.0);
    }

    #[test]
    fn test_point_in_region() {
        let mut rng = GameRng::new(3);
        let region = Region::new(Position::new(200.0, 100.0), Position::new(600.0, 1015.0));

        for _ in 0..50 {
            assert!(region.contains(rng.point_in(&region)));
        }
    }

    #[test]
    fn test_coin_flip_hits_both_sides() {
        let mut rng = GameRng::new(11);
        let flips: Vec<_> = (0..64).map(|_| rng.coin_flip()).collect();

        assert!(flips.contains(&true));
        assert!(flips.contains(&false));
    }

    #[test]
    fn test_tokens_are_unique_hex() {
        let mut rng = GameRng::new(42);
        let a = rng.token();
        let b = rng.token();

        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
