// [libs/infra/registry/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SERVICE REGISTRY LIBRARY BARREL
 * CLASIFICACION: INFRASTRUCTURE LIB (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICION PUBLICA DEL CLIENTE DE DESCUBRIMIENTO
 * =================================================================
 */

pub mod client;
pub mod errors;

pub use client::{RegistryClient, ServiceInstance, TtlCheck};
pub use errors::RegistryError;
