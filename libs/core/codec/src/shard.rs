use crate::CodecError;

/// Half-open index range `[start, end)` owned by shard `part_number` out of
/// `part_count` total shards, per spec: `start = floor(n*p/c)`, `end =
/// floor(n*(p+1)/c)`. The union over `p in 0..part_count` is exactly `[0,
/// n)` and the ranges are pairwise disjoint.
pub fn shard_range(n: u64, part_number: u64, part_count: u64) -> Result<(u64, u64), CodecError> {
    if part_count == 0 {
        return Err(CodecError::ZeroPartCount);
    }
    if part_number >= part_count {
        return Err(CodecError::IndexOutOfRange {
            index: part_number,
            total: part_count,
        });
    }

    let start = n
        .checked_mul(part_number)
        .map(|p| p / part_count)
        .ok_or(CodecError::Overflow {
            alphabet_size: n,
            max_length: part_count as u32,
        })?;
    let end = n
        .checked_mul(part_number + 1)
        .map(|p| p / part_count)
        .ok_or(CodecError::Overflow {
            alphabet_size: n,
            max_length: part_count as u32,
        })?;

    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_partition_the_space_exactly() {
        let n = 1_000u64;
        for part_count in 1..=7u64 {
            let mut cursor = 0u64;
            for p in 0..part_count {
                let (start, end) = shard_range(n, p, part_count).unwrap();
                assert_eq!(start, cursor, "gap or overlap before shard {p}");
                assert!(end >= start);
                cursor = end;
            }
            assert_eq!(cursor, n, "shards with part_count={part_count} did not cover all of N");
        }
    }

    #[test]
    fn rejects_zero_part_count() {
        assert!(shard_range(10, 0, 0).is_err());
    }

    #[test]
    fn rejects_part_number_past_part_count() {
        assert!(shard_range(10, 3, 3).is_err());
    }
}
