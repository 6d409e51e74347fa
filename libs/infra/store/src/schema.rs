/**
 * =================================================================
 * APARATO: SOVEREIGN DATABASE SCHEMA
 * CLASIFICACION: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * Dos colecciones, `requests` y `responses` (spec §6), cada una un
 * documento JSON bajo una clave primaria, mas columnas de consulta
 * extraidas para evitar un table-scan en el camino caliente del
 * Dispatcher.
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument};

const TACTICAL_TABLES: &[(&str, &str)] = &[
    (
        "TABLE_REQUESTS",
        r#"
        CREATE TABLE IF NOT EXISTS requests (
            id TEXT PRIMARY KEY,
            status TEXT NOT NULL,
            document TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#,
    ),
    (
        "TABLE_RESPONSES",
        r#"
        CREATE TABLE IF NOT EXISTS responses (
            response_id TEXT PRIMARY KEY,
            request_id TEXT NOT NULL,
            document TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#,
    ),
];

const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    (
        "IDX_REQUESTS_STATUS",
        "CREATE INDEX IF NOT EXISTS idx_requests_status ON requests(status);",
    ),
    (
        "IDX_RESPONSES_REQUEST",
        "CREATE INDEX IF NOT EXISTS idx_responses_request ON responses(request_id);",
    ),
];

/// Runs the idempotent schema synchronization. Returns an error if a base
/// table fails to solidify, signalling a broken libSQL link.
#[instrument(skip(database_connection))]
pub async fn apply_full_sovereign_schema(database_connection: &Connection) -> Result<()> {
    info!("[SCHEMA_ENGINE]: initiating structural synchronization");
    solidify_base_strata(database_connection).await?;
    harden_access_layer(database_connection).await?;
    info!("[SCHEMA_ENGINE]: ledger level and certified");
    Ok(())
}

async fn solidify_base_strata(db: &Connection) -> Result<()> {
    for (identifier, sql) in TACTICAL_TABLES {
        debug!("  solidifying: {}", identifier);
        db.execute(sql, ())
            .await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {}", identifier))?;
    }
    Ok(())
}

async fn harden_access_layer(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  hardening: {}", identifier);
        db.execute(sql, ())
            .await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {}", identifier))?;
    }
    Ok(())
}
