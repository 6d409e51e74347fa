use std::marker::PhantomData;

use lapin::options::BasicPublishOptions;
use lapin::BasicProperties;
use serde::Serialize;

use crate::connection::Connection;
use crate::errors::BusError;

/// Delivery mode per the AMQP spec: `Transient` may be lost on broker
/// restart, `Persistent` survives it. The system uses `Persistent` for all
/// traffic (spec §4.3/§6).
#[derive(Debug, Clone, Copy)]
pub enum DeliveryMode {
    Transient = 1,
    Persistent = 2,
}

/// Per-call publish flags, forwarded to `basic_publish` (spec §4.3).
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishFlags {
    pub mandatory: bool,
    pub immediate: bool,
}

/// Marshals a value of type `T` to XML and publishes it to a fixed
/// `(exchange, routing_key)`. Owns a dedicated channel, never shared with a
/// concurrent publisher (spec §5).
pub struct Publisher<T> {
    channel: lapin::Channel,
    exchange: String,
    routing_key: String,
    delivery_mode: DeliveryMode,
    _marker: PhantomData<T>,
}

impl<T: Serialize> Publisher<T> {
    /// Opens a fresh channel on `connection` dedicated to this publisher.
    pub async fn new(
        connection: &Connection,
        exchange: impl Into<String>,
        routing_key: impl Into<String>,
        delivery_mode: DeliveryMode,
    ) -> Result<Self, BusError> {
        let channel = connection.channel().await?;
        Ok(Self {
            channel,
            exchange: exchange.into(),
            routing_key: routing_key.into(),
            delivery_mode,
            _marker: PhantomData,
        })
    }

    /// Serializes `value` as XML and publishes it. Returns a bounded error
    /// on marshal or publish failure; no internal retry (spec §4.3 —
    /// caller policy decides).
    pub async fn publish(&self, value: &T, flags: PublishFlags) -> Result<(), BusError> {
        let body = quick_xml::se::to_string(value)?;
        let properties = BasicProperties::default()
            .with_content_type("application/xml".into())
            .with_delivery_mode(self.delivery_mode as u8);
        let options = BasicPublishOptions {
            mandatory: flags.mandatory,
            immediate: flags.immediate,
        };
        self.channel
            .basic_publish(&self.exchange, &self.routing_key, options, body.as_bytes(), properties)
            .await?
            .await?;
        Ok(())
    }
}
