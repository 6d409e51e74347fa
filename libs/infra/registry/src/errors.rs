// [libs/infra/registry/src/errors.rs]
//! =================================================================
//! APARATO: REGISTRY CLIENT ERRORS
//! RESPONSABILIDAD: CATALOGACION DE FALLOS DE DESCUBRIMIENTO DE SERVICIOS
//! =================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("NETWORK_UNREACHABLE: failed to reach service registry: {0}")]
    NetworkFault(#[from] reqwest::Error),

    #[error("REGISTRATION_REJECTED: registry returned status {0}")]
    RegistrationRejected(String),

    #[error("DISCOVERY_FAILED: health query for service '{0}' failed")]
    DiscoveryFailed(String),
}
