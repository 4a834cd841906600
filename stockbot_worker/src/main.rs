//! Stock bot worker.
//!
//! This binary consumes stock quote requests from the `stockQueue` AMQP queue, fetches the
//! current quote from the CSV quote provider and publishes a chat reply to `chatQueue`.
//! It wires together three building blocks:
//!
//! - `HttpQuoteFetcher` — one bounded HTTP call per request, parsed into a `Quote`.
//! - `Pipeline` — decodes each delivery, fetches, composes the reply, publishes it and then
//!   acks (success) or nacks without requeue (any failure). Every delivery gets exactly one
//!   reply.
//! - `Supervisor` — opens the broker session with a prefetch of one, keeps the pipeline
//!   attached, and on transport faults closes everything, waits and reconnects.
//!
//! Configuration is read once from the environment (`RABBITMQ_HOST`, `RABBITMQ_USER`,
//! `RABBITMQ_PASS`, ... see `config`). Ctrl+C or SIGTERM requests a graceful shutdown.
#![warn(missing_docs)]
use crate::broker::AmqpBroker;
use crate::config::WorkerConfig;
use crate::fetcher::HttpQuoteFetcher;
use crate::pipeline::Pipeline;
use crate::supervisor::Supervisor;
use log::info;
use stockbot_common::{Result, StockBotError};
use tokio_util::sync::CancellationToken;

mod broker;
mod config;
mod fetcher;
pub mod model;
mod pipeline;
mod supervisor;
#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<(), StockBotError> {
    init_logger();
    let config = WorkerConfig::from_env()?;
    info!(
        "Stock bot starting: broker {}:{}, quotes from {}",
        config.broker.host, config.broker.port, config.quote_url_template
    );

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            info!("Shutdown signal received. Stopping worker...");
            cancel.cancel();
        })
        .map_err(|e| StockBotError::Config(format!("failed to install signal handler: {e}")))?;
    }

    let fetcher = HttpQuoteFetcher::new(&config.quote_url_template, config.fetch_timeout)?;
    let supervisor = Supervisor::new(
        AmqpBroker::new(config.broker),
        Pipeline::new(fetcher),
        config.retry_backoff,
    );
    supervisor.run(cancel).await;

    info!("Stock bot stopped");
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
