//! A skiplist is a way of storing elements in such a way that elements can be efficiently
//! accessed, inserted and removed, all in `O(log(n))` on average.
//!
//! Conceptually, a skiplist resembles something like:
//!
//! ```text
//! <head> ----------> [2] --------------------------------------------------> [9] ---------->
//! <head> ----------> [2] ------------------------------------[7] ----------> [9] ---------->
//! <head> ----------> [2] ----------> [4] ------------------> [7] ----------> [9] --> [10] ->
//! <head> --> [1] --> [2] --> [3] --> [4] --> [5] --> [6] --> [7] --> [8] --> [9] --> [10] ->
//! ```
//!
//! where each node `[x]` has references to nodes further down the list, allowing the algorithm
//! to effectively skip ahead.
//!
//! This crate provides [`SkipList`], an always-sorted skiplist which holds each value at most
//! once. The nodes live in an arena owned by the list and refer to one another by index, so the
//! crate contains no `unsafe` code. How many levels a node reaches is decided by a
//! [`LevelGenerator`] owned by each list; [`CoinFlip`] is the default and [`Geometric`] allows
//! other promotion probabilities.
//!
//! ```
//! use skipset::SkipList;
//!
//! let mut list: SkipList<u32> = [40, 10, 30].into();
//! list.insert(20);
//! assert_eq!(list.to_string(), "10 -> 20 -> 30 -> 40");
//!
//! let copy = list.clone();
//! assert!(list.remove(&30));
//! assert!(copy.contains(&30));
//! ```
//!
//! The ordering used is `T`'s [`Ord`] implementation, which **must** be well-behaved.
//! Specifically, it must satisfy the following properties:
//!
//! - Be well defined: `a.cmp(b)` should always return the same value
//! - Be anti-symmetric: `a.cmp(b) == Greater` iff `b.cmp(a) == Less`.
//! - Be transitive: If `a > b` and `b > c` then `a > c`.
//!
//! Failure to satisfy these properties results in unexpected behaviour, such as values which can
//! no longer be found.
//!
//! A skiplist is not synchronised internally. Sharing one between threads requires external
//! synchronisation, just like the standard collections.

#![forbid(unsafe_code)]

pub mod iter;
pub mod level_generator;
mod skiplist;
mod skipnode;

pub use crate::{
    iter::{Cursor, IntoIter, Iter},
    level_generator::{CoinFlip, DEFAULT_MAX_LEVEL, Geometric, LevelError, LevelGenerator},
    skiplist::{Levels, SkipList},
};
