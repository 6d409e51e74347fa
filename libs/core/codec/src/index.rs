use crate::{Alphabet, CodecError};

/// Count of strings of length `len` over an alphabet of `alphabet_size` symbols: `a^len`.
fn strings_of_length(alphabet_size: u64, len: u32) -> Result<u64, CodecError> {
    alphabet_size.checked_pow(len).ok_or(CodecError::Overflow {
        alphabet_size,
        max_length: len,
    })
}

/// Total number of strings of length `1..=max_length` over an alphabet of
/// `alphabet_size` symbols: `N = sum_{k=1..L} a^k`.
pub fn total(alphabet_size: u64, max_length: u32) -> Result<u64, CodecError> {
    if alphabet_size == 0 {
        return Err(CodecError::EmptyAlphabet);
    }
    if max_length == 0 {
        return Err(CodecError::ZeroMaxLength);
    }
    let mut sum: u64 = 0;
    for k in 1..=max_length {
        let count = strings_of_length(alphabet_size, k)?;
        sum = sum.checked_add(count).ok_or(CodecError::Overflow {
            alphabet_size,
            max_length,
        })?;
    }
    Ok(sum)
}

/// Maps a linear index `i in [0, total(alphabet.size(), max_length))` to its
/// candidate string, per spec: find the smallest `k` whose length-major
/// bucket contains `i`, then emit `k` symbols most-significant first via
/// positional division/modulo by `a^(k-p-1)`.
pub fn at(i: u64, alphabet: &Alphabet, max_length: u32) -> Result<String, CodecError> {
    let a = alphabet.size();
    if a == 0 {
        return Err(CodecError::EmptyAlphabet);
    }
    if max_length == 0 {
        return Err(CodecError::ZeroMaxLength);
    }

    let mut consumed: u64 = 0;
    for k in 1..=max_length {
        let bucket = strings_of_length(a, k)?;
        let bucket_end = consumed
            .checked_add(bucket)
            .ok_or(CodecError::Overflow { alphabet_size: a, max_length })?;
        if i < bucket_end {
            let mut r = i - consumed;
            let mut symbols = Vec::with_capacity(k as usize);
            for p in 0..k {
                let power = k - p - 1;
                let divisor = strings_of_length(a, power)?;
                let digit = r / divisor;
                r %= divisor;
                let symbol = alphabet
                    .symbol(digit)
                    .expect("digit is bounded by alphabet size by construction");
                symbols.push(symbol);
            }
            return Ok(symbols.into_iter().collect());
        }
        consumed = bucket_end;
    }

    Err(CodecError::IndexOutOfRange {
        index: i,
        total: consumed,
    })
}

/// Inverse of [`at`]: the unique index `i` such that `at(i, alphabet,
/// max_length) == s`. Used by tests to assert the round-trip property; not
/// on the worker's hot path.
pub fn locate(s: &str, alphabet: &Alphabet, max_length: u32) -> Result<u64, CodecError> {
    let a = alphabet.size();
    let chars: Vec<char> = s.chars().collect();
    let k = chars.len() as u32;
    if k == 0 || k > max_length {
        return Err(CodecError::NotInSpace);
    }

    let mut consumed: u64 = 0;
    for len in 1..k {
        consumed = consumed
            .checked_add(strings_of_length(a, len)?)
            .ok_or(CodecError::Overflow { alphabet_size: a, max_length })?;
    }

    let mut r: u64 = 0;
    for (p, &ch) in chars.iter().enumerate() {
        let power = k - p as u32 - 1;
        let divisor = strings_of_length(a, power)?;
        let digit = alphabet.position(ch).ok_or(CodecError::NotInSpace)?;
        r = r
            .checked_add(digit.checked_mul(divisor).ok_or(CodecError::Overflow {
                alphabet_size: a,
                max_length,
            })?)
            .ok_or(CodecError::Overflow { alphabet_size: a, max_length })?;
    }

    consumed
        .checked_add(r)
        .ok_or(CodecError::Overflow { alphabet_size: a, max_length })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn total_matches_hand_sum_for_small_cases() {
        // a=2, L=3: 2 + 4 + 8 = 14
        assert_eq!(total(2, 3).unwrap(), 14);
    }

    #[test]
    fn at_zero_is_first_symbol() {
        let alphabet = Alphabet::default_alphanumeric();
        assert_eq!(at(0, &alphabet, 3).unwrap(), "a");
    }

    #[test]
    fn at_out_of_range_errors() {
        let alphabet = Alphabet::new("ab".chars());
        let n = total(2, 2).unwrap();
        assert!(at(n, &alphabet, 2).is_err());
    }

    proptest! {
        #[test]
        fn at_locate_round_trip(
            a in 2u64..8,
            max_length in 1u32..4,
            seed in any::<u64>(),
        ) {
            let alphabet: Alphabet = (b'a'..).take(a as usize).map(|b| b as char).collect();
            let n = total(a, max_length).unwrap();
            let i = seed % n;
            let s = at(i, &alphabet, max_length).unwrap();
            prop_assert!(s.len() >= 1 && s.len() <= max_length as usize);
            let back = locate(&s, &alphabet, max_length).unwrap();
            prop_assert_eq!(back, i);
        }

        #[test]
        fn at_is_injective_over_small_space(a in 2u64..6, max_length in 1u32..4) {
            let alphabet: Alphabet = (b'a'..).take(a as usize).map(|b| b as char).collect();
            let n = total(a, max_length).unwrap();
            let mut seen = std::collections::HashSet::new();
            for i in 0..n {
                let s = at(i, &alphabet, max_length).unwrap();
                prop_assert!(seen.insert(s), "index {} collided with an earlier candidate", i);
            }
            prop_assert_eq!(seen.len() as u64, n);
        }
    }
}
