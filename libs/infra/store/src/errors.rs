// [libs/infra/store/src/errors.rs]
/*!
 * =================================================================
 * APARATO: STORE ERROR CATALOG
 * CLASIFICACION: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACION SEMANTICA DE FALLOS DE PERSISTENCIA
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Error de enlace fisico o de red con el cluster libSQL.
    #[error("[L3_DB_NET_FAULT]: DATABASE_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    /// Fallo en la configuracion del entorno (Variables vacias o malformadas).
    #[error("[L3_DB_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    /// Error de sintaxis o ejecucion devuelto por el motor libSQL.
    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    /// Fallo en la serializacion/deserializacion de un documento JSON.
    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(#[from] serde_json::Error),

    /// La solicitud pedida no existe (spec §4.5 `NotFound`).
    #[error("[L3_REQUEST_FAULT]: REQUEST_NOT_FOUND")]
    RequestNotFound,

    /// La respuesta pedida no existe (spec §4.6).
    #[error("[L3_RESPONSE_FAULT]: RESPONSE_NOT_FOUND")]
    ResponseNotFound,
}
