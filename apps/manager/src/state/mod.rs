// [apps/manager/src/state/mod.rs]
//! Shared application state handed to every axum handler via `State`.

use std::sync::Arc;

use crate::dispatcher::Dispatcher;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}
