use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use futures_util::stream::StreamExt;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions};
use lapin::types::FieldTable;
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use crate::connection::Connection;
use crate::errors::BusError;

/// Subscription flags, mirroring the original's `Config` (spec §4.3).
#[derive(Debug, Clone, Default)]
pub struct ConsumeOptions {
    pub auto_ack: bool,
    pub exclusive: bool,
    pub no_local: bool,
    pub no_wait: bool,
}

/// Per-delivery outcome a handler hands back, telling the consumer loop
/// whether to ack or nack. The handler owns ack/nack per spec §4.3.
pub enum Outcome {
    Ack,
    Nack { requeue: bool },
}

/// Subscribes to `queue` and, for each delivery, unmarshals it to `T` and
/// runs `handler`. On unmarshal error the delivery is logged and dropped
/// (acked, not requeued — avoids a poison-message loop). On a handler panic
/// the panic is caught, logged, and the delivery is nacked without requeue.
/// If the delivery stream ends while the channel is still open, the
/// consumer resubscribes.
pub async fn consume<T, F, Fut>(
    connection: &Connection,
    queue: impl Into<String> + Clone,
    consumer_tag: impl Into<String> + Clone,
    options: ConsumeOptions,
    mut handler: F,
) -> Result<(), BusError>
where
    T: DeserializeOwned,
    F: FnMut(T, &Delivery) -> Fut,
    Fut: std::future::Future<Output = Outcome>,
{
    let _marker: PhantomData<T> = PhantomData;
    loop {
        let channel = connection.channel().await?;
        let consume_options = BasicConsumeOptions {
            no_local: options.no_local,
            no_ack: options.auto_ack,
            exclusive: options.exclusive,
            nowait: options.no_wait,
        };
        let mut consumer = channel
            .basic_consume(
                &queue.clone().into(),
                &consumer_tag.clone().into(),
                consume_options,
                FieldTable::default(),
            )
            .await?;

        while let Some(delivery) = consumer.next().await {
            let delivery = match delivery {
                Ok(d) => d,
                Err(err) => {
                    error!(target: "bus.consumer", error = %err, "delivery stream error");
                    break;
                }
            };

            let parsed: Result<T, _> = quick_xml::de::from_str(
                std::str::from_utf8(&delivery.data).unwrap_or_default(),
            );

            let outcome = match parsed {
                Ok(value) => {
                    let fut = handler(value, &delivery);
                    match AssertUnwindSafe(fut).catch_unwind().await {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            error!(target: "bus.consumer", "handler panicked, recovering");
                            Outcome::Nack { requeue: false }
                        }
                    }
                }
                Err(err) => {
                    warn!(target: "bus.consumer", error = %err, "dropping undecodable delivery");
                    Outcome::Ack
                }
            };

            if !options.auto_ack {
                let ack_result = match outcome {
                    Outcome::Ack => delivery.ack(BasicAckOptions::default()).await,
                    Outcome::Nack { requeue } => {
                        delivery.nack(BasicNackOptions { requeue, ..Default::default() }).await
                    }
                };
                if let Err(err) = ack_result {
                    error!(target: "bus.consumer", error = %err, "failed to ack/nack delivery");
                }
            }
        }

        warn!(target: "bus.consumer", "delivery stream ended, resubscribing");
    }
}
