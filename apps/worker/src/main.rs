// [apps/worker/src/main.rs]
/*!
 * =================================================================
 * APARATO: WORKER SHELL
 * CLASIFICACIÓN: APPLICATION LAYER (ENTRY POINT)
 * RESPONSABILIDAD: BOOTSTRAP DE ENTORNO E IGNICIÓN DEL SERVICIO
 *
 * # Mathematical Proof (Deterministic Init):
 * Garantiza que el nodo solo inicie si la sinapsis con el broker y el
 * registro de servicios es estable. El uso de CancellationToken asegura
 * que la señal de apagado se propague sin condiciones de carrera entre
 * la tarea del consumidor y el servidor de salud.
 * =================================================================
 */

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crackhash_worker_lib::{health, Config, WorkerService};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    crackhash_shared_heimdall::init_tracing("crack-hash-worker");

    info!("worker node starting ignition sequence");

    let cancellation = CancellationToken::new();
    let signal_cancellation = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("termination requested by host, sealing current shard");
            signal_cancellation.cancel();
        }
    });

    let bind_addr = config.resolve_bind_addr()?;
    let health_shutdown = cancellation.clone();
    let health_server = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        axum::serve(listener, health::router())
            .with_graceful_shutdown(async move {
                health_shutdown.cancelled().await;
            })
            .await
    });

    let service = WorkerService::bootstrap(config).await?;
    service.run(cancellation).await?;

    let _ = health_server.await?;

    info!("shutdown sequence concluded, worker node offline");
    Ok(())
}
