// [apps/manager/src/main.rs]
/*!
 * =================================================================
 * APARATO: MANAGER SHELL
 * CLASIFICACIÓN: APPLICATION LAYER (ENTRY POINT)
 * RESPONSABILIDAD: BOOTSTRAP DE ENTORNO E IGNICIÓN DEL SERVICIO
 *
 * # Mathematical Proof (Deterministic Init):
 * El servicio solo acepta trafico de ingesta una vez que la recuperacion
 * de fallos sobre el estado persistido ha concluido, evitando que una
 * solicitud nueva compita con la reconstruccion de una anterior.
 * =================================================================
 */

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crackhash_manager_lib::{routes, Config, ManagerService};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    crackhash_shared_heimdall::init_tracing("crack-hash-manager");

    info!("manager node starting ignition sequence");

    let cancellation = CancellationToken::new();
    let signal_cancellation = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("termination requested by host, draining in-flight aggregation");
            signal_cancellation.cancel();
        }
    });

    let service = ManagerService::bootstrap(config.clone()).await?;
    let app_state = service.app_state();

    let bind_addr = config.bind_addr;
    let http_shutdown = cancellation.clone();
    let http_server = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        axum::serve(listener, routes::router(app_state))
            .with_graceful_shutdown(async move {
                http_shutdown.cancelled().await;
            })
            .await
    });

    service.run(cancellation).await?;
    let _ = http_server.await?;

    info!("shutdown sequence concluded, manager node offline");
    Ok(())
}
