// [apps/worker/src/service.rs]
//! Worker Service (spec §4.8): registers with the service registry,
//! subscribes to the task queue, runs the Partition Enumerator per
//! delivery, and publishes the result to the response exchange.

use std::sync::Arc;

use crackhash_domain_models::{Shard, WorkerResponse};
use crackhash_infra_bus::topology::{RESPONSE_BINDING, TASK_BINDING};
use crackhash_infra_bus::{consume, ConsumeOptions, Connection, DeliveryMode, Outcome, PublishFlags, Publisher};
use crackhash_infra_registry::{RegistryClient, TtlCheck};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::enumerator::enumerate;

/// Ties the bus connection, registry client, and enumerator together for
/// the lifetime of one worker process.
pub struct WorkerService {
    config: Config,
    registry: RegistryClient,
    connection: Connection,
    instance_id: String,
}

impl WorkerService {
    pub async fn bootstrap(config: Config) -> anyhow::Result<Self> {
        let connection = Connection::connect(config.amqp_url.clone(), config.reconnect_timeout()).await?;
        crackhash_infra_bus::topology::declare_topology(
            &connection,
            &[TASK_BINDING, RESPONSE_BINDING],
        )
        .await?;

        let registry = RegistryClient::new(config.registry_url.clone());
        let instance_id = format!("{}-{}", config.worker_service_name, Uuid::new_v4());

        Ok(Self {
            config,
            registry,
            connection,
            instance_id,
        })
    }

    /// Registers this worker with a TTL health check, then runs the
    /// consume loop until the process is cancelled.
    #[instrument(skip(self, cancellation), fields(instance = %self.instance_id))]
    pub async fn run(&self, cancellation: CancellationToken) -> anyhow::Result<()> {
        let bind_addr = self.config.resolve_bind_addr()?;
        self.registry
            .register_with_ttl_check(
                &self.config.worker_service_name,
                &self.instance_id,
                &bind_addr.ip().to_string(),
                bind_addr.port(),
                TtlCheck {
                    http_url: format!("http://{}/api/health", bind_addr),
                    interval: self.config.health_timeout(),
                    timeout: self.config.health_timeout(),
                },
            )
            .await?;
        info!("registered with service registry, entering consume loop");

        let responses = Arc::new(
            Publisher::<WorkerResponse>::new(
                &self.connection,
                RESPONSE_BINDING.exchange,
                RESPONSE_BINDING.routing_key,
                DeliveryMode::Persistent,
            )
            .await?,
        );

        let cancellation_for_handler = cancellation.clone();
        consume::<Shard, _, _>(
            &self.connection,
            TASK_BINDING.queue,
            self.instance_id.clone(),
            ConsumeOptions::default(),
            move |shard, _delivery| {
                let responses = responses.clone();
                let cancellation = cancellation_for_handler.clone();
                async move { handle_shard(shard, &responses, &cancellation).await }
            },
        )
        .await?;

        Ok(())
    }
}

async fn handle_shard(
    shard: Shard,
    responses: &Publisher<WorkerResponse>,
    cancellation: &CancellationToken,
) -> Outcome {
    let request_id = shard.request_id.clone();
    let cancellation = cancellation.clone();
    let found = match tokio::task::spawn_blocking(move || enumerate(&shard, &cancellation)).await {
        Ok(found) => found,
        Err(err) => {
            warn!(error = %err, "enumerator task panicked");
            return Outcome::Nack { requeue: false };
        }
    };

    let response = WorkerResponse::new(request_id, found);
    match responses.publish(&response, PublishFlags::default()).await {
        Ok(()) => Outcome::Ack,
        Err(err) => {
            warn!(error = %err, "failed to publish worker response, requeueing shard");
            Outcome::Nack { requeue: true }
        }
    }
}
