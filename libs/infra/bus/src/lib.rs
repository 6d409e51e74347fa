//! Durable, typed AMQP pub/sub adapter (spec §4.3): a reconnecting
//! [`Connection`], a generic [`Publisher`], and a generic `consume` loop
//! with redelivery and panic recovery.

mod connection;
mod consumer;
mod errors;
mod publisher;
pub mod topology;

pub use connection::Connection;
pub use consumer::{consume, ConsumeOptions, Outcome};
pub use errors::BusError;
pub use publisher::{DeliveryMode, PublishFlags, Publisher};
