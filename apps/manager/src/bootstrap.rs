// [apps/manager/src/bootstrap.rs]
//! Manager Service bootstrap: wires the store, registry client, and bus
//! connection into a [`Dispatcher`], runs crash recovery, then drives the
//! response-queue consumer (spec §4.4/§4.6).

use std::sync::Arc;

use crackhash_domain_models::WorkerResponse;
use crackhash_infra_bus::topology::{RESPONSE_BINDING, TASK_BINDING};
use crackhash_infra_bus::{consume, ConsumeOptions, Connection, DeliveryMode, Publisher};
use crackhash_infra_registry::RegistryClient;
use crackhash_infra_store::{RequestStore, ResponseStore, StoreClient};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::state::AppState;

pub struct ManagerService {
    state: AppState,
    connection: Connection,
}

impl ManagerService {
    #[instrument(skip(config))]
    pub async fn bootstrap(config: Config) -> anyhow::Result<Self> {
        let connection = Connection::connect(config.amqp_url.clone(), config.reconnect_timeout()).await?;
        crackhash_infra_bus::topology::declare_topology(&connection, &[TASK_BINDING, RESPONSE_BINDING]).await?;

        let store = StoreClient::connect(&config.store_url, config.store_auth_token.clone()).await?;
        let request_store = RequestStore::new(store.clone());
        let response_store = ResponseStore::new(store);

        let discoverer = Arc::new(RegistryClient::new(config.registry_url.clone()));
        let publisher = Arc::new(
            Publisher::<crackhash_domain_models::Shard>::new(
                &connection,
                TASK_BINDING.exchange,
                TASK_BINDING.routing_key,
                DeliveryMode::Persistent,
            )
            .await?,
        );

        let dispatcher = Dispatcher::new(
            request_store,
            response_store,
            discoverer,
            publisher,
            config.worker_service_name.clone(),
            config.health_timeout(),
        );

        info!("running crash recovery over persisted requests");
        if let Err(err) = dispatcher.run_recovery().await {
            warn!(error = %err, "crash recovery did not complete cleanly, continuing with ingress open");
        }

        Ok(Self {
            state: AppState { dispatcher },
            connection,
        })
    }

    pub fn app_state(&self) -> AppState {
        self.state.clone()
    }

    /// Drives the response-queue consumer until `cancellation` fires or the
    /// bus connection is closed.
    #[instrument(skip(self, cancellation))]
    pub async fn run(&self, cancellation: CancellationToken) -> anyhow::Result<()> {
        let dispatcher = self.state.dispatcher.clone();
        tokio::select! {
            result = consume::<WorkerResponse, _, _>(
                &self.connection,
                RESPONSE_BINDING.queue,
                "manager-response-consumer",
                ConsumeOptions::default(),
                move |resp, _delivery| {
                    let dispatcher = dispatcher.clone();
                    async move { dispatcher.handle_response(resp).await }
                },
            ) => result.map_err(Into::into),
            _ = cancellation.cancelled() => {
                info!("shutdown requested, response consumer stopping");
                Ok(())
            }
        }
    }
}
