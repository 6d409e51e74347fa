// [libs/infra/store/src/request_store.rs]
//! Persistent `RequestId -> RequestInfo` mapping with a write-through
//! in-memory cache (spec §4.5). Grounded on the original's
//! `manager/internal/store/requeststore/request_store.go`: the in-memory
//! map there is the entire store (no backing DB); here it is layered in
//! front of the libSQL `requests` table, store first then cache, matching
//! spec §4.5's "store first; on success, cache" rule.

use std::collections::HashMap;
use std::sync::Arc;

use crackhash_domain_models::{RequestId, RequestInfo, Status};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::client::StoreClient;
use crate::errors::StoreError;

fn status_label(status: Status) -> &'static str {
    match status {
        Status::New => "NEW",
        Status::InProgress => "IN_PROGRESS",
        Status::Ready => "READY",
        Status::PartialReady => "PARTIAL_READY",
        Status::Error => "ERROR",
    }
}

pub struct RequestStore {
    store: StoreClient,
    cache: RwLock<HashMap<RequestId, RequestInfo>>,
}

impl RequestStore {
    pub fn new(store: StoreClient) -> Arc<Self> {
        Arc::new(Self {
            store,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Populates the cache on miss, per spec §4.5.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<RequestInfo, StoreError> {
        if let Some(cached) = self.cache.read().await.get(id) {
            return Ok(cached.clone());
        }

        let conn = self.store.get_connection()?;
        let mut rows = conn
            .query("SELECT document FROM requests WHERE id = ?1", [id])
            .await?;
        let row = rows.next().await?.ok_or(StoreError::RequestNotFound)?;
        let document: String = row.get(0)?;
        let info: RequestInfo = serde_json::from_str(&document)?;

        self.cache.write().await.insert(id.to_string(), info.clone());
        Ok(info)
    }

    /// Lists every persisted request, used by crash recovery (spec §4.4).
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<RequestInfo>, StoreError> {
        let conn = self.store.get_connection()?;
        let mut rows = conn.query("SELECT document FROM requests", ()).await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let document: String = row.get(0)?;
            out.push(serde_json::from_str(&document)?);
        }
        Ok(out)
    }

    /// Inserts or replaces `info`, store first then cache.
    #[instrument(skip(self, info))]
    pub async fn save(&self, info: &RequestInfo) -> Result<(), StoreError> {
        let document = serde_json::to_string(info)?;
        let conn = self.store.get_connection()?;
        conn.execute(
            "INSERT INTO requests (id, status, document) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET status = excluded.status, document = excluded.document, updated_at = CURRENT_TIMESTAMP",
            libsql::params![info.id.clone(), status_label(info.status), document],
        )
        .await?;
        self.cache.write().await.insert(info.id.clone(), info.clone());
        Ok(())
    }

    /// Full replace, alias of [`Self::save`] per spec §4.5's `update`.
    pub async fn update(&self, info: &RequestInfo) -> Result<(), StoreError> {
        self.save(info).await
    }

    /// Status-only partial update, used by the health prober.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: &str,
        status: Status,
        error_reason: Option<String>,
    ) -> Result<(), StoreError> {
        let mut info = self.get(id).await?;
        info.status = status;
        info.error_reason = error_reason;
        self.save(&info).await
    }

    /// Deletes from both store and cache.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let conn = self.store.get_connection()?;
        conn.execute("DELETE FROM requests WHERE id = ?1", [id]).await?;
        self.cache.write().await.remove(id);
        Ok(())
    }

    /// Evicts `id` from the cache only, leaving the store untouched.
    pub async fn delete_from_cache(&self, id: &str) {
        self.cache.write().await.remove(id);
    }
}
