//! Publishing stock requests to the worker's request queue.
use lapin::options::BasicPublishOptions;
use lapin::{BasicProperties, Channel};
use log::info;
use stockbot_common::net::STOCK_QUEUE;
use stockbot_common::{Result, StockRequest};

/// Helper type for sending requests to the worker.
pub struct RequestSender;

impl RequestSender {
    /// Publish `request` to the request queue, either as a JSON object or, when `raw` is
    /// set, as the bare symbol.
    pub async fn send_request(channel: &Channel, request: &StockRequest, raw: bool) -> Result<()> {
        let body = if raw {
            request.symbol.clone().into_bytes()
        } else {
            request.to_json_bytes()?
        };

        info!("Sending request: {}", String::from_utf8_lossy(&body));
        channel
            .basic_publish(
                "",
                STOCK_QUEUE,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default(),
            )
            .await?;
        Ok(())
    }
}
