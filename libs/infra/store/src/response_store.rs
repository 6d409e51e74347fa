// [libs/infra/store/src/response_store.rs]
//! Crash-safe buffer of worker responses (spec §4.6), keyed by
//! `(request_id, response_id)`. Grounded on the original's
//! `manager/internal/store/respstore/response_store.go`: no in-memory
//! cache here by design — this collection exists specifically to survive
//! the gap between "response received" and "merged into RequestInfo",
//! caching it would defeat that purpose.

use std::sync::Arc;

use crackhash_domain_models::WorkerResponse;
use tracing::instrument;

use crate::client::StoreClient;
use crate::errors::StoreError;

pub struct ResponseStore {
    store: StoreClient,
}

impl ResponseStore {
    pub fn new(store: StoreClient) -> Arc<Self> {
        Arc::new(Self { store })
    }

    /// Persists `resp`, assigning a fresh `response_id` if the publisher
    /// did not supply one (spec §4.6).
    #[instrument(skip(self, resp))]
    pub async fn save(&self, resp: &WorkerResponse) -> Result<String, StoreError> {
        let response_id = resp.id.clone().unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let document = serde_json::to_string(resp)?;
        let conn = self.store.get_connection()?;
        conn.execute(
            "INSERT INTO responses (response_id, request_id, document) VALUES (?1, ?2, ?3)
             ON CONFLICT(response_id) DO UPDATE SET document = excluded.document",
            libsql::params![response_id.clone(), resp.request_id.clone(), document],
        )
        .await?;
        Ok(response_id)
    }

    /// All buffered responses for `request_id`, used by crash recovery to
    /// replay them through aggregation (spec §4.4).
    #[instrument(skip(self))]
    pub async fn get_by_request_id(&self, request_id: &str) -> Result<Vec<WorkerResponse>, StoreError> {
        let conn = self.store.get_connection()?;
        let mut rows = conn
            .query("SELECT document FROM responses WHERE request_id = ?1", [request_id])
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let document: String = row.get(0)?;
            out.push(serde_json::from_str(&document)?);
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn delete_by_request_id(&self, request_id: &str) -> Result<(), StoreError> {
        let conn = self.store.get_connection()?;
        conn.execute("DELETE FROM responses WHERE request_id = ?1", [request_id])
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_by_response_id(&self, response_id: &str) -> Result<(), StoreError> {
        let conn = self.store.get_connection()?;
        conn.execute("DELETE FROM responses WHERE response_id = ?1", [response_id])
            .await?;
        Ok(())
    }
}
