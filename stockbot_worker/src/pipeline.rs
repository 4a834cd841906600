//! Per-delivery message pipeline.
//!
//! Every delivery walks one of two paths:
//!
//! - `Received → Decoded → Fetched → Replied → Acked`
//! - `Received → Failed → ErrorReplied → Nacked`
//!
//! Each stage returns an explicit `Result`; any request-level error (bad payload,
//! provider failure, malformed provider response) selects the failure path and never
//! leaves the pipeline. Exactly one reply is published per delivery, then exactly one
//! terminal action is taken on it. Only broker errors while publishing or
//! acknowledging are returned to the caller.
use async_trait::async_trait;
use log::{debug, error, info};
use stockbot_common::net::DEFAULT_ROOM;
use stockbot_common::{BotReply, Result, StockBotError, StockRequest};
use strum_macros::Display;

use crate::fetcher::QuoteSource;

/// Publishes replies to the chat queue.
#[async_trait]
pub trait ReplyPublisher: Send + Sync {
    /// Publish one encoded reply.
    async fn publish(&self, reply: &BotReply) -> Result<()>;
}

/// An inbound delivery awaiting its terminal action.
///
/// `ack` and `reject` consume the handle, so a delivery is settled at most once.
#[async_trait]
pub trait DeliveryHandle: Send {
    /// Broker correlation tag.
    fn tag(&self) -> u64;
    /// Raw message body.
    fn body(&self) -> &[u8];
    /// Acknowledge; the broker drops the message.
    async fn ack(self) -> Result<()>;
    /// Negatively acknowledge without requeue; the broker discards the message.
    async fn reject(self) -> Result<()>;
}

/// Pipeline states, used for logging.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    Received,
    Decoded,
    Fetched,
    Replied,
    Acked,
    Failed,
    ErrorReplied,
    Nacked,
}

/// Terminal action chosen for a delivery.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Disposition {
    Ack,
    Reject,
}

/// Result of processing one message body: the reply to publish and how to settle the
/// delivery.
#[derive(Debug)]
pub struct Outcome {
    /// Reply to publish, success text or the generic bot error.
    pub reply: BotReply,
    /// How the delivery is settled after publishing.
    pub disposition: Disposition,
    /// The request-level error that selected the failure path, if any.
    pub error: Option<StockBotError>,
}

impl Outcome {
    fn answered(reply: BotReply) -> Self {
        Outcome {
            reply,
            disposition: Disposition::Ack,
            error: None,
        }
    }

    fn failed(room_id: String, error: StockBotError) -> Self {
        Outcome {
            reply: BotReply::bot_error(room_id),
            disposition: Disposition::Reject,
            error: Some(error),
        }
    }
}

/// Composes decoding, fetching and reply composition for each delivery.
pub struct Pipeline<S> {
    source: S,
}

impl<S: QuoteSource> Pipeline<S> {
    /// Creates a pipeline fetching quotes from `source`.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Decide the reply and disposition for a message body.
    pub async fn process(&self, body: &[u8]) -> Outcome {
        let request = match StockRequest::decode(body) {
            Ok(request) => request,
            Err(err) => {
                // decode only yields InvalidRequest, which always names a room
                let room_id = err.room_id().unwrap_or(DEFAULT_ROOM).to_string();
                return Outcome::failed(room_id, err);
            }
        };
        debug!("[{}] {} for room {}", Stage::Decoded, request.symbol, request.room_id);

        match self.source.fetch(&request.symbol).await {
            Ok(quote) => {
                debug!("[{}] {:?}", Stage::Fetched, quote);
                Outcome::answered(BotReply::new(request.room_id, quote.reply_text()))
            }
            Err(err) => Outcome::failed(request.room_id, err),
        }
    }

    /// Process `delivery`, publish its reply through `publisher`, then settle it.
    ///
    /// Returns the disposition applied, or the broker error that prevented publishing
    /// or settling. In the latter case the delivery is left unsettled for the broker to
    /// redeliver on the next session.
    pub async fn handle<P, D>(&self, publisher: &P, delivery: D) -> Result<Disposition>
    where
        P: ReplyPublisher + ?Sized,
        D: DeliveryHandle,
    {
        let tag = delivery.tag();
        debug!("[{}] delivery {}", Stage::Received, tag);

        let outcome = self.process(delivery.body()).await;
        let replied = match &outcome.error {
            None => Stage::Replied,
            Some(err) => {
                error!("[{}] delivery {}: {}", Stage::Failed, tag, err);
                Stage::ErrorReplied
            }
        };

        publisher.publish(&outcome.reply).await?;
        debug!("[{}] delivery {} to room {}", replied, tag, outcome.reply.room_id);

        let settled = match outcome.disposition {
            Disposition::Ack => {
                delivery.ack().await?;
                Stage::Acked
            }
            Disposition::Reject => {
                delivery.reject().await?;
                Stage::Nacked
            }
        };
        info!(
            "[{}] delivery {}: {} -> {}",
            settled, tag, outcome.reply.room_id, outcome.reply.message
        );
        Ok(outcome.disposition)
    }
}
