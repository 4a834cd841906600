//! AMQP implementation of the supervisor's [`Broker`] and [`Session`] seams.
use async_trait::async_trait;
use futures::StreamExt;
use lapin::message::Delivery;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions, BasicQosOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, Consumer};
use log::{debug, info};
use stockbot_common::amqp::{self, REPLY_SUCCESS};
use stockbot_common::net::{CHAT_QUEUE, CONSUMER_TAG, STOCK_QUEUE};
use stockbot_common::{BotReply, BrokerConfig, Result};

use crate::pipeline::{DeliveryHandle, ReplyPublisher};
use crate::supervisor::{Broker, Session};

/// At most one unacknowledged delivery per consumer.
const PREFETCH_COUNT: u16 = 1;

/// Opens AMQP sessions against the configured broker.
pub struct AmqpBroker {
    config: BrokerConfig,
}

impl AmqpBroker {
    /// Creates a broker for `config`. Nothing is connected until [`Broker::open`].
    pub fn new(config: BrokerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Broker for AmqpBroker {
    type Session = AmqpSession;

    async fn open(&self) -> Result<AmqpSession> {
        info!(
            "Connecting to broker at {}:{}",
            self.config.host, self.config.port
        );
        let connection = amqp::connect(&self.config).await?;

        match subscribe(&connection).await {
            Ok((channel, consumer)) => Ok(AmqpSession {
                connection,
                channel,
                consumer,
            }),
            Err(err) => {
                if let Err(close_err) = connection.close(REPLY_SUCCESS, "setup failed").await {
                    debug!("Ignoring error while closing connection: {}", close_err);
                }
                Err(err)
            }
        }
    }
}

async fn subscribe(connection: &Connection) -> Result<(Channel, Consumer)> {
    let channel = connection.create_channel().await?;
    amqp::declare_queues(&channel).await?;
    channel
        .basic_qos(PREFETCH_COUNT, BasicQosOptions::default())
        .await?;
    let consumer = channel
        .basic_consume(
            STOCK_QUEUE,
            CONSUMER_TAG,
            BasicConsumeOptions {
                no_ack: false,
                ..BasicConsumeOptions::default()
            },
            FieldTable::default(),
        )
        .await?;
    Ok((channel, consumer))
}

/// One connection, one channel and the request-queue consumer on it.
pub struct AmqpSession {
    connection: Connection,
    channel: Channel,
    consumer: Consumer,
}

#[async_trait]
impl ReplyPublisher for AmqpSession {
    async fn publish(&self, reply: &BotReply) -> Result<()> {
        self.channel
            .basic_publish(
                "",
                CHAT_QUEUE,
                BasicPublishOptions::default(),
                &reply.encode(),
                BasicProperties::default(),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Session for AmqpSession {
    type Delivery = AmqpDelivery;

    async fn next_delivery(&mut self) -> Option<Result<AmqpDelivery>> {
        self.consumer
            .next()
            .await
            .map(|item| item.map(AmqpDelivery).map_err(Into::into))
    }

    async fn close(self) {
        if let Err(err) = self.channel.close(REPLY_SUCCESS, "shutdown").await {
            debug!("Ignoring error while closing channel: {}", err);
        }
        if let Err(err) = self.connection.close(REPLY_SUCCESS, "shutdown").await {
            debug!("Ignoring error while closing connection: {}", err);
        }
    }
}

/// A delivery from the request queue.
pub struct AmqpDelivery(Delivery);

#[async_trait]
impl DeliveryHandle for AmqpDelivery {
    fn tag(&self) -> u64 {
        self.0.delivery_tag
    }

    fn body(&self) -> &[u8] {
        &self.0.data
    }

    async fn ack(self) -> Result<()> {
        self.0.acker.ack(BasicAckOptions::default()).await?;
        Ok(())
    }

    async fn reject(self) -> Result<()> {
        self.0
            .acker
            .nack(BasicNackOptions {
                multiple: false,
                requeue: false,
            })
            .await?;
        Ok(())
    }
}
