//! Connection supervisor.
//!
//! Owns the broker session lifecycle: open a session (connection, channel, queue
//! declarations, prefetch of one, consumer), feed every delivery through the pipeline,
//! and on any transport fault close the session, wait the backoff and start over.
//! Only cancellation ends the loop.
//!
//! The session is closed on every exit path of an iteration, whether it ended through
//! cancellation or a fault. Cancellation is observed while opening, between deliveries
//! and during the backoff wait; a delivery already taken is always carried through to
//! its terminal action.
use std::time::Duration;

use async_trait::async_trait;
use log::{error, info, warn};
use stockbot_common::net::STOCK_QUEUE;
use stockbot_common::{Result, StockBotError};
use strum_macros::Display;
use tokio_util::sync::CancellationToken;

use crate::fetcher::QuoteSource;
use crate::pipeline::{DeliveryHandle, Pipeline, ReplyPublisher};

/// Opens broker sessions.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Session type produced by [`Broker::open`].
    type Session: Session;

    /// Connect and subscribe to the request queue.
    ///
    /// Anything acquired before a failure is released before the error is returned.
    async fn open(&self) -> Result<Self::Session>;
}

/// A subscribed broker session: a source of deliveries and a sink for replies.
#[async_trait]
pub trait Session: ReplyPublisher {
    /// Delivery handle type.
    type Delivery: DeliveryHandle;

    /// Wait for the next delivery. `None` means the consumer stream ended.
    async fn next_delivery(&mut self) -> Option<Result<Self::Delivery>>;

    /// Release the channel and connection. Errors are logged and swallowed.
    async fn close(self);
}

/// Supervisor states, used for logging.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SupervisorState {
    Disconnected,
    Connecting,
    Subscribed,
    Listening,
    Faulted,
}

/// Keeps the pipeline attached to the request queue until cancelled.
pub struct Supervisor<B, S> {
    broker: B,
    pipeline: Pipeline<S>,
    backoff: Duration,
}

impl<B, S> Supervisor<B, S>
where
    B: Broker,
    S: QuoteSource,
{
    /// Creates a supervisor that waits `backoff` between failed sessions.
    pub fn new(broker: B, pipeline: Pipeline<S>, backoff: Duration) -> Self {
        Self {
            broker,
            pipeline,
            backoff,
        }
    }

    /// Run sessions until `cancel` fires. Transport faults never end the loop.
    pub async fn run(&self, cancel: CancellationToken) {
        while !cancel.is_cancelled() {
            match self.run_session(&cancel).await {
                Ok(()) => break,
                Err(err) => {
                    error!(
                        "[{}] Broker session failed: {}. Retrying in {:?}",
                        SupervisorState::Faulted,
                        err,
                        self.backoff
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(self.backoff) => {}
                    }
                }
            }
        }
        info!("[{}] Supervisor stopped", SupervisorState::Disconnected);
    }

    /// One session. `Ok` means cancellation was observed.
    async fn run_session(&self, cancel: &CancellationToken) -> Result<()> {
        info!("[{}] Opening broker session", SupervisorState::Connecting);
        let mut session = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            opened = self.broker.open() => opened?,
        };
        info!("[{}] Consuming {}", SupervisorState::Subscribed, STOCK_QUEUE);

        let result = self.listen(&mut session, cancel).await;
        session.close().await;
        info!("[{}] Broker session closed", SupervisorState::Disconnected);
        result
    }

    async fn listen(&self, session: &mut B::Session, cancel: &CancellationToken) -> Result<()> {
        info!("[{}] Waiting for stock requests", SupervisorState::Listening);
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Shutdown requested");
                    return Ok(());
                }
                next = session.next_delivery() => next,
            };

            match next {
                Some(Ok(delivery)) => {
                    self.pipeline.handle(&*session, delivery).await?;
                }
                Some(Err(err)) => return Err(err),
                None => {
                    warn!("Consumer on {} was closed by the broker", STOCK_QUEUE);
                    return Err(StockBotError::TransportFault("consumer stream ended".to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CsvQuotes, Event, Script, ScriptedBroker};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use stockbot_common::BotReply;

    const AAPL_CSV: &str = "Symbol,Date,Time,Open,High,Low,Close,Volume\n\
                            AAPL.US,2024-01-01,22:00:07,184.10,186.00,183.90,185.50,1000\n";
    const BACKOFF: Duration = Duration::from_secs(3);

    fn supervisor(broker: &Arc<ScriptedBroker>) -> Arc<Supervisor<Arc<ScriptedBroker>, CsvQuotes>> {
        let quotes = CsvQuotes::default().with("aapl.us", AAPL_CSV);
        Arc::new(Supervisor::new(Arc::clone(broker), Pipeline::new(quotes), BACKOFF))
    }

    /// Runs the supervisor for `elapsed` of (paused) time, then cancels it and waits.
    async fn run_for(broker: &Arc<ScriptedBroker>, elapsed: Duration) {
        let supervisor = supervisor(broker);
        let cancel = CancellationToken::new();
        let task = {
            let cancel = cancel.clone();
            tokio::spawn(async move { supervisor.run(cancel).await })
        };
        tokio::time::sleep(elapsed).await;
        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn setup_faults_retry_until_cancelled() {
        let broker = ScriptedBroker::failing_forever();
        run_for(&broker, Duration::from_secs(10)).await;

        assert!(broker.opens.load(Ordering::SeqCst) >= 3);
        assert!(broker.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn waits_backoff_between_attempts() {
        let broker = ScriptedBroker::failing_forever();
        run_for(&broker, Duration::from_secs(1)).await;

        assert_eq!(broker.opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_setup_faults_and_handles_deliveries() {
        let broker = ScriptedBroker::new(vec![
            Script::Fault,
            Script::Fault,
            Script::Session {
                deliveries: vec![r#"{"stockCode":"aapl.us","roomId":"traders"}"#, "  "],
                closes_after: false,
            },
        ]);
        run_for(&broker, Duration::from_secs(30)).await;

        assert_eq!(broker.opens.load(Ordering::SeqCst), 3);
        assert_eq!(
            broker.events(),
            vec![
                Event::Published(BotReply::new("traders", "AAPL.US quote is $185.50 per share")),
                Event::Acked(1),
                Event::Published(BotReply::bot_error("general")),
                Event::Rejected(2),
                Event::Closed,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn closed_consumer_reconnects() {
        let broker = ScriptedBroker::new(vec![Script::Session {
            deliveries: vec!["aapl.us"],
            closes_after: true,
        }]);
        run_for(&broker, Duration::from_secs(5)).await;

        assert_eq!(broker.opens.load(Ordering::SeqCst), 2);
        assert_eq!(
            broker.events(),
            vec![
                Event::Published(BotReply::new("general", "AAPL.US quote is $185.50 per share")),
                Event::Acked(1),
                Event::Closed,
                Event::Closed,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_while_listening_closes_session_once() {
        let broker = ScriptedBroker::new(Vec::new());
        run_for(&broker, Duration::from_millis(10)).await;

        assert_eq!(broker.opens.load(Ordering::SeqCst), 1);
        assert_eq!(broker.events(), vec![Event::Closed]);
    }

    #[tokio::test]
    async fn cancelled_before_start_never_connects() {
        let broker = ScriptedBroker::new(Vec::new());
        let cancel = CancellationToken::new();
        cancel.cancel();
        supervisor(&broker).run(cancel).await;

        assert_eq!(broker.opens.load(Ordering::SeqCst), 0);
    }
}
