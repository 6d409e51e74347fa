use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::request::{CrackRequest, RequestId};

/// Terminal/non-terminal status of a [`RequestInfo`], per spec §4.4's state
/// machine. `Status::recompute` is the single source of truth for
/// transitions; nothing else may assign a terminal status directly.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    New,
    InProgress,
    Ready,
    PartialReady,
    Error,
}

impl Status {
    /// `true` for `Ready`, `PartialReady`, `Error` — no further aggregation
    /// or dispatch may mutate a terminal [`RequestInfo`].
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Ready | Status::PartialReady | Status::Error)
    }

    /// Pure recomputation from counts, spec §4.4: `failed==total` -> Error;
    /// `ready+failed==total` -> PartialReady (failed>0) or Ready; otherwise
    /// no change (`IN_PROGRESS` persists).
    pub fn recompute(ready: u64, failed: u64, total: u64) -> Status {
        if total > 0 && failed == total {
            Status::Error
        } else if ready + failed == total {
            if failed > 0 {
                Status::PartialReady
            } else {
                Status::Ready
            }
        } else {
            Status::InProgress
        }
    }
}

/// Persisted aggregate state for one [`RequestId`], one document in the
/// `requests` collection (spec §4.5/§6).
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestInfo {
    pub id: RequestId,
    #[typeshare(serialized_as = "String")]
    pub created_at: DateTime<Utc>,
    pub request: CrackRequest,
    pub status: Status,
    /// Number of shards dispatched; becomes `partCount`.
    #[typeshare(serialized_as = "number")]
    pub service_count: u64,
    /// Count of distinct shards whose response has been merged.
    #[typeshare(serialized_as = "number")]
    pub ready_service_count: u64,
    /// Shards whose assigned worker failed health.
    #[typeshare(serialized_as = "number")]
    pub failed_service_count: u64,
    /// Deduplicated discovered plaintexts.
    pub found_data: Vec<String>,
    /// Human-readable accumulated error text.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_reason: Option<String>,
}

impl RequestInfo {
    /// Fresh `NEW` record at ingest time, per spec §3 lifecycle.
    pub fn new(id: RequestId, request: CrackRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            request,
            status: Status::New,
            service_count: 0,
            ready_service_count: 0,
            failed_service_count: 0,
            found_data: Vec::new(),
            error_reason: None,
        }
    }

    /// Appends `word` to `found_data` iff not already present, preserving
    /// invariant 2 (no duplicate entries).
    pub fn record_find(&mut self, word: String) {
        if !self.found_data.contains(&word) {
            self.found_data.push(word);
        }
    }

    /// Marks a transition into `ERROR` with a reason, bypassing the
    /// counts-based recomputation (discovery/publish failures, spec §4.4
    /// step 1/3).
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = Status::Error;
        self.error_reason = Some(reason.into());
    }

    /// Recomputes `status` from the current counts via [`Status::recompute`].
    pub fn refresh_status(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = Status::recompute(
            self.ready_service_count,
            self.failed_service_count,
            self.service_count,
        );
    }
}
