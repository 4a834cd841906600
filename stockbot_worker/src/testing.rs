//! In-memory fakes for the pipeline and supervisor seams.
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use stockbot_common::{BotReply, Result, StockBotError};

use crate::fetcher::{QuoteSource, parse_quote_csv};
use crate::model::quote::Quote;
use crate::pipeline::{DeliveryHandle, ReplyPublisher};
use crate::supervisor::{Broker, Session};

/// Observable broker side effects, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Published(BotReply),
    Acked(u64),
    Rejected(u64),
    Closed,
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

fn record(log: &EventLog, event: Event) {
    log.lock().unwrap().push(event);
}

/// Serves canned provider CSV per symbol; unknown symbols fail like a timed-out call.
#[derive(Default)]
pub struct CsvQuotes {
    responses: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl CsvQuotes {
    pub fn with(mut self, symbol: &str, csv: &str) -> Self {
        self.responses.insert(symbol.to_string(), csv.to_string());
        self
    }
}

#[async_trait]
impl QuoteSource for CsvQuotes {
    async fn fetch(&self, symbol: &str) -> Result<Quote> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(symbol) {
            Some(csv) => parse_quote_csv(csv),
            None => Err(StockBotError::FetchFailed(format!("{symbol}: operation timed out"))),
        }
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    events: EventLog,
    fail: bool,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> EventLog {
        Arc::clone(&self.events)
    }

    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

#[async_trait]
impl ReplyPublisher for RecordingPublisher {
    async fn publish(&self, reply: &BotReply) -> Result<()> {
        if self.fail {
            return Err(StockBotError::TransportFault("channel closed".to_string()));
        }
        record(&self.events, Event::Published(reply.clone()));
        Ok(())
    }
}

pub struct FakeDelivery {
    tag: u64,
    body: Vec<u8>,
    events: EventLog,
}

impl FakeDelivery {
    pub fn new(tag: u64, body: &[u8], events: EventLog) -> Self {
        Self {
            tag,
            body: body.to_vec(),
            events,
        }
    }
}

#[async_trait]
impl DeliveryHandle for FakeDelivery {
    fn tag(&self) -> u64 {
        self.tag
    }

    fn body(&self) -> &[u8] {
        &self.body
    }

    async fn ack(self) -> Result<()> {
        record(&self.events, Event::Acked(self.tag));
        Ok(())
    }

    async fn reject(self) -> Result<()> {
        record(&self.events, Event::Rejected(self.tag));
        Ok(())
    }
}

/// What the next `open()` call produces.
pub enum Script {
    /// Setup fails with a transport fault.
    Fault,
    /// A session that hands out `deliveries`, then either waits forever or reports the
    /// consumer stream as closed.
    Session {
        deliveries: Vec<&'static str>,
        closes_after: bool,
    },
}

/// Broker whose sessions follow a script. Once the script runs out, every `open()`
/// fails when `endless_faults` is set, otherwise yields a session that idles until
/// cancelled.
#[derive(Default)]
pub struct ScriptedBroker {
    scripts: Mutex<VecDeque<Script>>,
    endless_faults: bool,
    pub opens: AtomicUsize,
    pub events: EventLog,
}

impl ScriptedBroker {
    pub fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            ..Self::default()
        })
    }

    pub fn failing_forever() -> Arc<Self> {
        Arc::new(Self {
            endless_faults: true,
            ..Self::default()
        })
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Broker for Arc<ScriptedBroker> {
    type Session = FakeSession;

    async fn open(&self) -> Result<FakeSession> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let next = self.scripts.lock().unwrap().pop_front();
        let (deliveries, closes_after) = match next {
            Some(Script::Fault) => {
                return Err(StockBotError::TransportFault("connection refused".to_string()));
            }
            Some(Script::Session {
                deliveries,
                closes_after,
            }) => (deliveries, closes_after),
            None if self.endless_faults => {
                return Err(StockBotError::TransportFault("connection refused".to_string()));
            }
            None => (Vec::new(), false),
        };

        let deliveries = deliveries
            .into_iter()
            .zip(1u64..)
            .map(|(body, tag)| FakeDelivery::new(tag, body.as_bytes(), Arc::clone(&self.events)))
            .collect();
        Ok(FakeSession {
            deliveries,
            closes_after,
            events: Arc::clone(&self.events),
        })
    }
}

pub struct FakeSession {
    deliveries: VecDeque<FakeDelivery>,
    closes_after: bool,
    events: EventLog,
}

#[async_trait]
impl ReplyPublisher for FakeSession {
    async fn publish(&self, reply: &BotReply) -> Result<()> {
        record(&self.events, Event::Published(reply.clone()));
        Ok(())
    }
}

#[async_trait]
impl Session for FakeSession {
    type Delivery = FakeDelivery;

    async fn next_delivery(&mut self) -> Option<Result<FakeDelivery>> {
        if let Some(delivery) = self.deliveries.pop_front() {
            return Some(Ok(delivery));
        }
        if self.closes_after {
            return None;
        }
        std::future::pending().await
    }

    async fn close(self) {
        record(&self.events, Event::Closed);
    }
}
