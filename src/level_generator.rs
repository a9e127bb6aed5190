//! Skiplists use a probabilistic distribution of nodes over the internal
//! levels, whereby the lowest level (level 0) contains all the nodes, and each
//! level $n > 0$ will contain a random subset of the nodes on level `n - 1`.
//!
//! Most commonly, a geometric distribution is used whereby the chance that a
//! node occupies level $n$ is $p$ times the chance of occupying level $n-1$
//! (with $0 < p < 1$). The default [`CoinFlip`] generator is the special case
//! $p = 1/2$, drawn one fair coin at a time.
//!
//! It is very unlikely that this will need to be changed as the default should
//! suffice, but if need be custom level generators can be implemented.

pub mod coin_flip;
pub mod geometric;

use thiserror::Error;

pub use self::{coin_flip::CoinFlip, geometric::Geometric};

/// The number of levels a skiplist uses unless told otherwise.
pub const DEFAULT_MAX_LEVEL: usize = 20;

/// The largest number of levels a level generator accepts.
///
/// With a fair coin, a level this high is reached with probability $2^{-99}$,
/// so anything above it is wasted head links.
pub const MAX_LEVEL_LIMIT: usize = 100;

// ////////////////////////////////////////////////////////////////////////////
// Level Generator
// ////////////////////////////////////////////////////////////////////////////

/// Upon the insertion of a new node in the list, the node is replicated to high
/// levels with a certain probability as determined by a [`LevelGenerator`].
pub trait LevelGenerator {
    /// The total number of levels that are assumed to exist.
    ///
    /// A skiplist uses at most [`MAX_LEVEL_LIMIT`] levels; a larger total is
    /// clamped to it, as are the heights returned by [`level`][Self::level].
    #[must_use]
    fn total(&self) -> usize;

    /// Generate the height of a new node, that is the number of levels it
    /// participates in.
    ///
    /// This function must return a value in the range `[1, total]`.
    #[must_use]
    fn level(&mut self) -> usize;

    /// Create an independent generator with the same parameters.
    ///
    /// The new generator must not share or replay the random sequence of
    /// `self`; cloned skiplists rely on this so that the copy's node heights
    /// are drawn afresh.
    #[must_use]
    fn fork(&self) -> Self
    where
        Self: Sized;
}

/// Errors that can occur when creating a level generator.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum LevelError {
    /// The maximum number of levels must be non-zero.
    #[error("max must be non-zero.")]
    ZeroMax,
    /// The maximum number of levels must not exceed [`MAX_LEVEL_LIMIT`].
    #[error("max must be at most 100.")]
    MaxTooLarge,
    /// The probability `$p$` must be in the range `$(0, 1)$`.
    #[error("p must be in (0, 1).")]
    InvalidProbability,
}

/// Validate the total number of levels shared by every generator.
pub(crate) fn check_total(total: usize) -> Result<(), LevelError> {
    if total == 0 {
        Err(LevelError::ZeroMax)
    } else if total > MAX_LEVEL_LIMIT {
        Err(LevelError::MaxTooLarge)
    } else {
        Ok(())
    }
}
