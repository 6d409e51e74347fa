use lapin::options::{ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::ExchangeKind;

use crate::connection::Connection;
use crate::errors::BusError;

/// One exchange/queue/binding triple to bring up on a fresh broker.
pub struct TopologyBinding {
    pub exchange: &'static str,
    pub queue: &'static str,
    pub routing_key: &'static str,
}

/// Declares the two exchanges and two queues spec §6 names
/// (`crack-request-exchange`/`queue.crack.request`,
/// `crack-response-exchange`/`crack-response-queue`), all durable. The
/// original left this implicit in broker configuration; declaring it here
/// idempotently lets a fresh broker come up without an external
/// provisioning step.
pub async fn declare_topology(connection: &Connection, bindings: &[TopologyBinding]) -> Result<(), BusError> {
    let channel = connection.channel().await?;
    for binding in bindings {
        channel
            .exchange_declare(
                binding.exchange,
                ExchangeKind::Direct,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        channel
            .queue_declare(
                binding.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;
        channel
            .queue_bind(
                binding.queue,
                binding.exchange,
                binding.routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;
    }
    Ok(())
}

/// The task topology: manager publishes, worker consumes.
pub const TASK_BINDING: TopologyBinding = TopologyBinding {
    exchange: "crack-request-exchange",
    queue: "queue.crack.request",
    routing_key: "crack-request",
};

/// The response topology: worker publishes, manager consumes.
pub const RESPONSE_BINDING: TopologyBinding = TopologyBinding {
    exchange: "crack-response-exchange",
    queue: "crack-response-queue",
    routing_key: "crack.response",
};
