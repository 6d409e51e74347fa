//! Persistent Request Store and Response Store (spec §4.5/§4.6), both
//! backed by libSQL (`StoreClient`), the Request Store fronted by a
//! write-through in-memory cache.

pub mod client;
pub mod errors;
pub mod request_store;
pub mod response_store;
pub mod schema;

pub use client::StoreClient;
pub use errors::StoreError;
pub use request_store::RequestStore;
pub use response_store::ResponseStore;
