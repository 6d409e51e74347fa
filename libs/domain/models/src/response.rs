use serde::{Deserialize, Serialize};

use crate::request::RequestId;

/// `<Found>` wrapper around the plaintexts a worker discovered in its shard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Found {
    #[serde(rename = "Value")]
    pub value: Vec<String>,
}

/// A worker's report for exactly one shard, published to the response
/// exchange as `CrackHashWorkerResponse`. Exactly one per shard completed,
/// possibly with an empty `found` set (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename = "CrackHashWorkerResponse")]
pub struct WorkerResponse {
    /// Unique per publish; assigned by the worker, or by the response store
    /// on first receipt if absent (spec §4.6).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[serde(rename = "Id")]
    pub id: Option<String>,
    #[serde(rename = "RequestId")]
    pub request_id: RequestId,
    #[serde(rename = "Found")]
    pub found: Found,
}

impl WorkerResponse {
    /// Builds a response with a fresh `id`, the shape the worker produces.
    pub fn new(request_id: RequestId, found: Vec<String>) -> Self {
        Self {
            id: Some(uuid::Uuid::new_v4().to_string()),
            request_id,
            found: Found { value: found },
        }
    }
}
