//! Fair coin level generator.

use rand::prelude::*;

use crate::level_generator::{LevelError, LevelGenerator, check_total};

/// A level generator which flips a fair coin for every level.
///
/// Every node starts at height 1. While the coin comes up heads and the
/// maximum has not been reached, the node is promoted one level further. The
/// height `$h$` is therefore reached with probability `$2^{-h}$`, with all the
/// remaining probability mass collapsed onto `total`.
///
/// Each instance owns its random number generator. Use
/// [`with_seed`][CoinFlip::with_seed] for a reproducible sequence.
#[derive(Debug)]
pub struct CoinFlip {
    /// The total number of levels that are assumed to exist.
    total: usize,
    /// The coin.
    rng: SmallRng,
}

impl CoinFlip {
    /// Create a new coin flip generator with `total` levels, seeded from the
    /// thread-local entropy source.
    ///
    /// # Errors
    ///
    /// `total` must be in `[1, MAX_LEVEL_LIMIT]`.
    #[inline]
    pub fn new(total: usize) -> Result<Self, LevelError> {
        check_total(total)?;
        Ok(CoinFlip {
            total,
            rng: SmallRng::from_rng(&mut rand::rng()),
        })
    }

    /// Create a new coin flip generator with `total` levels whose sequence is
    /// fully determined by `seed`.
    ///
    /// # Errors
    ///
    /// `total` must be in `[1, MAX_LEVEL_LIMIT]`.
    #[inline]
    pub fn with_seed(total: usize, seed: u64) -> Result<Self, LevelError> {
        check_total(total)?;
        Ok(CoinFlip {
            total,
            rng: SmallRng::seed_from_u64(seed),
        })
    }
}

impl LevelGenerator for CoinFlip {
    #[inline]
    fn total(&self) -> usize {
        self.total
    }

    #[inline]
    fn level(&mut self) -> usize {
        let mut level = 1;
        while level < self.total && self.rng.random_bool(0.5) {
            level += 1;
        }
        level
    }

    #[inline]
    fn fork(&self) -> Self {
        CoinFlip {
            total: self.total,
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }
}
