// [apps/worker/src/health.rs]
//! Minimal health surface the registry's TTL check (or a direct probe)
//! hits to decide liveness. Mirrors the teacher's thin health handlers
//! in `handlers/mod.rs` — a router with one route, no state needed.

use axum::{routing::get, Router};

pub fn router() -> Router {
    Router::new().route("/api/health", get(|| async { "OK" }))
}
