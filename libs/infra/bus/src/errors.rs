use thiserror::Error;

/// Abstract error kinds the Message Bus Adapter surfaces (spec §7).
#[derive(Debug, Error)]
pub enum BusError {
    #[error("amqp connection already closed")]
    ConnectionClosed,
    #[error("amqp channel already closed")]
    ChannelClosed,
    #[error("failed to marshal message body: {0}")]
    Marshal(#[from] quick_xml::SeError),
    #[error("failed to unmarshal message body: {0}")]
    Unmarshal(#[from] quick_xml::DeError),
    #[error("amqp operation failed: {0}")]
    Amqp(#[from] lapin::Error),
}
