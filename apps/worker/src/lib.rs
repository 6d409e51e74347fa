// [apps/worker/src/lib.rs]
/*!
 * =================================================================
 * APARATO: WORKER LIBRARY ROOT
 * CLASIFICACIÓN: ESTRATO L1-WORKER
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE LOS COMPONENTES DEL NODO
 * =================================================================
 */

pub mod config;
pub mod enumerator;
pub mod health;
pub mod service;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::service::WorkerService;
}

pub use config::Config;
pub use service::WorkerService;
