// [apps/worker/src/enumerator.rs]
//! Partition Enumerator (spec §4.2): given a shard, iterate its index
//! range, hash each candidate, collect matches. Runs inside
//! `spawn_blocking` — grounded on the teacher's `engine.rs` use of
//! `spawn_blocking` for `StrategyExecutor::execute_mission_sequence`, since
//! this loop is CPU-bound and must not steal cycles from the async
//! reactor driving the bus connection.

use crackhash_core_codec::{at, shard_range, total, Alphabet};
use crackhash_domain_models::Shard;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// How many candidates to enumerate between cancellation checks. Checking
/// every iteration would add a branch-and-atomic-load per MD5 block;
/// checking every `CANCEL_CHECK_STRIDE` keeps responsiveness without
/// materially slowing the hot loop.
const CANCEL_CHECK_STRIDE: u64 = 4096;

/// Enumerates `shard`'s index range and returns every candidate whose MD5
/// digest matches `shard.hash` (case-insensitive). Deterministic and
/// reproducible: the same shard always yields the same candidates in the
/// same order (spec §4.2), which is what makes replaying a redelivered
/// shard idempotent upstream in the Dispatcher.
#[instrument(skip(shard, cancellation), fields(request_id = %shard.request_id, part = shard.part_number))]
pub fn enumerate(shard: &Shard, cancellation: &CancellationToken) -> Vec<String> {
    let alphabet: Alphabet = shard.alphabet.to_codec();
    let target = shard.hash.to_ascii_lowercase();

    let n = match total(alphabet.size(), shard.max_length) {
        Ok(n) => n,
        Err(err) => {
            tracing::error!(error = %err, "shard arithmetic overflowed, yielding no candidates");
            return Vec::new();
        }
    };
    let (start, end) = match shard_range(n, shard.part_number, shard.part_count) {
        Ok(range) => range,
        Err(err) => {
            tracing::error!(error = %err, "invalid shard range, yielding no candidates");
            return Vec::new();
        }
    };

    let mut found = Vec::new();
    let mut i = start;
    while i < end {
        if i.wrapping_sub(start) % CANCEL_CHECK_STRIDE == 0 && cancellation.is_cancelled() {
            debug!("enumeration cancelled mid-shard");
            break;
        }

        if let Ok(candidate) = at(i, &alphabet, shard.max_length) {
            let digest = format!("{:x}", md5::compute(candidate.as_bytes()));
            if digest == target {
                found.push(candidate);
            }
        }

        i += 1;
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crackhash_domain_models::WireAlphabet;

    fn shard(hash: &str, max_length: u32, part_number: u64, part_count: u64) -> Shard {
        Shard {
            request_id: "req-1".into(),
            part_number,
            part_count,
            hash: hash.into(),
            max_length,
            alphabet: WireAlphabet::from_codec(&Alphabet::default_alphanumeric()),
        }
    }

    #[test]
    fn finds_known_plaintext_within_its_shard() {
        let digest = format!("{:x}", md5::compute(b"ab"));
        let s = shard(&digest, 2, 0, 1);
        let cancellation = CancellationToken::new();
        let found = enumerate(&s, &cancellation);
        assert_eq!(found, vec!["ab".to_string()]);
    }

    #[test]
    fn empty_shard_yields_no_matches() {
        let s = shard("00000000000000000000000000000000", 2, 0, 1);
        let cancellation = CancellationToken::new();
        assert!(enumerate(&s, &cancellation).is_empty());
    }

    #[test]
    fn cancellation_stops_enumeration_promptly() {
        let digest = format!("{:x}", md5::compute(b"zz"));
        let s = shard(&digest, 4, 0, 1);
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let found = enumerate(&s, &cancellation);
        assert!(found.is_empty(), "cancelled before the first stride boundary should yield nothing");
    }
}
