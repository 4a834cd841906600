//! Stock bot client — publishes a single stock request to the worker's `stockQueue` and
//! prints the bot reply read back from `chatQueue`.
//!
//! Usage example (CLI):
//! ```bash
//! RABBITMQ_HOST=localhost stockbot_client --symbol aapl.us --room traders
//! ```
//!
//! The broker is configured through the same `RABBITMQ_*` variables as the worker. The
//! client waits for a reply addressed to the requested room, `--wait-secs` to elapse, or
//! Ctrl+C, whichever comes first. Replies read from `chatQueue` are acknowledged, so run
//! it against a development broker rather than alongside a live chat consumer.
#![warn(missing_docs)]
mod args;
mod sender;

use crate::args::Args;
use crate::sender::RequestSender;
use chrono::Local;
use clap::Parser;
use futures::StreamExt;
use lapin::Consumer;
use lapin::options::{BasicAckOptions, BasicConsumeOptions};
use lapin::types::FieldTable;
use log::{debug, info, warn};
use stockbot_common::amqp::{self, REPLY_SUCCESS};
use stockbot_common::net::{CHAT_QUEUE, DEFAULT_ROOM};
use stockbot_common::{BotReply, BrokerConfig, Result, StockBotError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Consumer tag used by the client on the reply queue.
const CLIENT_CONSUMER_TAG: &str = "stockbot-client";

/// Reads replies until one for `room` arrives. Returns `None` if the consumer closes.
async fn wait_for_reply(consumer: &mut Consumer, room: &str) -> Result<Option<BotReply>> {
    while let Some(delivery) = consumer.next().await {
        let delivery = delivery?;
        delivery.acker.ack(BasicAckOptions::default()).await?;

        match BotReply::from_json_bytes(&delivery.data) {
            Ok(reply) if reply.room_id == room => return Ok(Some(reply)),
            Ok(reply) => debug!("Skipping reply for room {}: {}", reply.room_id, reply.message),
            Err(e) => warn!(
                "Received non-JSON reply ({}): {}",
                e,
                String::from_utf8_lossy(&delivery.data)
            ),
        }
    }
    Ok(None)
}

#[tokio::main]
async fn main() -> Result<(), StockBotError> {
    init_logger();
    let args = Args::parse();
    let config = BrokerConfig::from_env()?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down client...");
            cancel.cancel();
        })
        .map_err(|e| StockBotError::Config(format!("failed to install signal handler: {e}")))?;
    }

    let request = args.request();
    if request.symbol.is_empty() {
        return Err(StockBotError::invalid_request(DEFAULT_ROOM, "symbol must not be blank"));
    }

    info!("Connecting to broker at {}:{}", config.host, config.port);
    let connection = amqp::connect(&config).await?;
    let channel = connection.create_channel().await?;
    amqp::declare_queues(&channel).await?;

    let mut consumer = channel
        .basic_consume(
            CHAT_QUEUE,
            CLIENT_CONSUMER_TAG,
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;
    RequestSender::send_request(&channel, &request, args.raw).await?;

    let outcome = tokio::select! {
        _ = cancel.cancelled() => Ok(None),
        _ = tokio::time::sleep(Duration::from_secs(args.wait_secs)) => {
            warn!("No reply for room {} within {}s", request.room_id, args.wait_secs);
            Ok(None)
        }
        reply = wait_for_reply(&mut consumer, &request.room_id) => reply,
    };

    if let Err(e) = channel.close(REPLY_SUCCESS, "done").await {
        debug!("Ignoring error while closing channel: {}", e);
    }
    if let Err(e) = connection.close(REPLY_SUCCESS, "done").await {
        debug!("Ignoring error while closing connection: {}", e);
    }

    if let Some(reply) = outcome? {
        println!(
            "[{}] #{} {}",
            Local::now().format("%H:%M:%S"),
            reply.room_id,
            reply.message
        );
    }
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
