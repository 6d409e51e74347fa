//! Index <-> candidate-string bijection over an arbitrary alphabet.
//!
//! The search space is every string of length `1..=max_length` over an
//! alphabet `A`, enumerated in length-major, lexicographic-within-length
//! order. `total` counts it, `at` maps an index into it, `shard_range`
//! splits `[0, total)` into `part_count` disjoint, contiguous ranges.
//!
//! No I/O, no allocation beyond the returned `String`, no panics: every
//! fallible arithmetic step returns [`CodecError`].

#![deny(missing_docs)]

mod alphabet;
mod errors;
mod index;
mod shard;

pub use alphabet::{Alphabet, DEFAULT_ALPHABET};
pub use errors::CodecError;
pub use index::{at, locate, total};
pub use shard::shard_range;
