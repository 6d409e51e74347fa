use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Opaque, globally unique request identifier assigned at ingest.
pub type RequestId = String;

/// Generates a fresh [`RequestId`].
pub fn new_request_id() -> RequestId {
    uuid::Uuid::new_v4().to_string()
}

/// User-facing crack request body, `POST /api/hash/crack`.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrackRequest {
    /// Hex-encoded MD5 digest to invert, 32 characters.
    pub hash: String,
    /// Longest candidate length the search space should cover.
    #[typeshare(serialized_as = "number")]
    pub max_length: u32,
}

impl CrackRequest {
    /// `true` if `hash` looks like a 32-character hex digest. Cheap sanity
    /// check at the ingress boundary; not a cryptographic validation.
    pub fn has_well_formed_hash(&self) -> bool {
        self.hash.len() == 32 && self.hash.chars().all(|c| c.is_ascii_hexdigit())
    }
}
