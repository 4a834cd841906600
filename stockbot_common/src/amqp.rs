//! AMQP helpers shared by the worker and the client.
use lapin::options::QueueDeclareOptions;
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties};

use crate::config::BrokerConfig;
use crate::net::{CHAT_QUEUE, STOCK_QUEUE};
use crate::result::Result;

/// Reply code sent when closing a channel or connection normally.
pub const REPLY_SUCCESS: u16 = 200;

/// Opens a connection to the broker described by `config`.
pub async fn connect(config: &BrokerConfig) -> Result<Connection> {
    let connection =
        Connection::connect(&config.amqp_uri(), ConnectionProperties::default()).await?;
    Ok(connection)
}

/// Declares the request and reply queues. Safe to call repeatedly.
///
/// Both queues are non-durable, non-exclusive and never auto-deleted.
pub async fn declare_queues(channel: &Channel) -> Result<()> {
    for queue in [STOCK_QUEUE, CHAT_QUEUE] {
        let options = QueueDeclareOptions {
            durable: false,
            exclusive: false,
            auto_delete: false,
            ..QueueDeclareOptions::default()
        };
        channel
            .queue_declare(queue, options, FieldTable::default())
            .await?;
    }
    Ok(())
}
