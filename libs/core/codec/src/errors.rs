use thiserror::Error;

/// Arithmetic or input failure in the index codec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// `a^k` or a partial sum of it overflowed `u64` before reaching `i`.
    #[error("index codec arithmetic overflowed for alphabet size {alphabet_size} and max_length {max_length}")]
    Overflow {
        /// Alphabet size at the point of overflow.
        alphabet_size: u64,
        /// Max length at the point of overflow.
        max_length: u32,
    },
    /// `i` is not in `[0, total(alphabet_size, max_length))`.
    #[error("index {index} is out of range for total {total}")]
    IndexOutOfRange {
        /// The offending index.
        index: u64,
        /// The valid exclusive upper bound.
        total: u64,
    },
    /// An alphabet with fewer than one symbol was supplied.
    #[error("alphabet must contain at least one symbol")]
    EmptyAlphabet,
    /// `max_length` was zero.
    #[error("max_length must be at least 1")]
    ZeroMaxLength,
    /// `part_count` was zero.
    #[error("part_count must be at least 1")]
    ZeroPartCount,
    /// A string outside the codec's alphabet or length bound was passed to `locate`.
    #[error("string is not a member of the enumerated search space")]
    NotInSpace,
}
