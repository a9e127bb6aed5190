//! Geometric level generator.

use rand::prelude::*;

use crate::level_generator::{LevelError, LevelGenerator, check_total};

/// A level generator using a geometric distribution.
///
/// This distribution assumes that if a node is present at some level `$n$`,
/// then the probability that it is present at level `$n+1$` is some constant
/// `$p \in (0, 1)$`. This produces a geometric distribution, albeit truncated
/// at the maximum number of levels allowed.
///
/// Unlike [`CoinFlip`][crate::CoinFlip], a single uniform variate is drawn per
/// node regardless of its height.
#[derive(Debug)]
pub struct Geometric {
    /// The total number of levels that are assumed to exist.
    total: usize,
    /// The probability that a node is present in the next level.
    p: f64,
    /// `$p^{\text{total}}$`, the tail mass cut off by the truncation.
    p_total: f64,
    /// The random number generator.
    rng: SmallRng,
}

impl Geometric {
    /// Create a new geometric level generator with `total` number of levels,
    /// and `p` as the probability that a given node is present in the next
    /// level.
    ///
    /// # Errors
    ///
    /// `p` must be strictly between 0 and 1, and `total` must be in
    /// `[1, MAX_LEVEL_LIMIT]`.
    #[inline]
    pub fn new(total: usize, p: f64) -> Result<Self, LevelError> {
        Self::from_rng(total, p, SmallRng::from_rng(&mut rand::rng()))
    }

    /// As [`new`][Geometric::new], with the random sequence fully determined by
    /// `seed`.
    ///
    /// # Errors
    ///
    /// See [`new`][Geometric::new].
    #[inline]
    pub fn with_seed(total: usize, p: f64, seed: u64) -> Result<Self, LevelError> {
        Self::from_rng(total, p, SmallRng::seed_from_u64(seed))
    }

    fn from_rng(total: usize, p: f64, rng: SmallRng) -> Result<Self, LevelError> {
        check_total(total)?;
        if !(0.0 < p && p < 1.0) {
            return Err(LevelError::InvalidProbability);
        }
        // `check_total` bounds `total` well within i32.
        let exponent = i32::try_from(total).map_err(|_err| LevelError::MaxTooLarge)?;
        Ok(Geometric {
            total,
            p,
            p_total: p.powi(exponent),
            rng,
        })
    }

    /// The probability that a node is promoted to the next level.
    #[must_use]
    #[inline]
    pub fn p(&self) -> f64 {
        self.p
    }
}

impl LevelGenerator for Geometric {
    #[inline]
    fn total(&self) -> usize {
        self.total
    }

    /// Generate a height for a new node by inverting the cumulative
    /// distribution function of the truncated geometric distribution.
    ///
    /// With `$t$` the total number of levels, the zero-based level `$n$`
    /// satisfies
    ///
    /// ```math
    /// P(N \geq n) = \frac{p^n - p^t}{1 - p^t}
    /// ```
    ///
    /// which, for a uniform variate `$u \in [0, 1)$`, inverts to
    ///
    /// ```math
    /// n = \left\lfloor \log_p\left(1 - (1 - p^t) \cdot u\right) \right\rfloor.
    /// ```
    ///
    /// The returned height is `$n + 1$`.
    #[inline]
    #[expect(clippy::float_arithmetic, reason = "Computing inverse CDF")]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::as_conversions,
        reason = "The logarithm lies in [0, total] so the cast is exact"
    )]
    fn level(&mut self) -> usize {
        let u = self.rng.random::<f64>();
        let n = (1.0 - (1.0 - self.p_total) * u).log(self.p).floor() as usize;
        // Rounding can land exactly on `total` when `u` is close to 1.
        n.min(self.total - 1) + 1
    }

    #[inline]
    fn fork(&self) -> Self {
        Geometric {
            total: self.total,
            p: self.p,
            p_total: self.p_total,
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }
}
