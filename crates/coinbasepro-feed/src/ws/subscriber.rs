/*
[INPUT]:  Open feed transport and a subscribe request
[OUTPUT]: First substantive message after the subscription acknowledgement
[POS]:    WebSocket layer - subscribe-and-wait
[UPDATE]: When changing how acknowledgements are skipped or bounded
*/

use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info};

use super::connection::FeedTransport;
use crate::error::{FeedError, Result};
use crate::types::{Message, SubscribeRequest};

const RAW_LOG_MAX_BYTES: usize = 1024;

/// Serialize `payload` and send it as one text frame
pub async fn send_request<T, P>(transport: &mut T, payload: &P) -> Result<()>
where
    T: FeedTransport + ?Sized,
    P: Serialize + Sync,
{
    let text = serde_json::to_string(payload)?;
    transport.send_text(text).await
}

/// Decode one inbound payload into a [`Message`]
pub fn decode_message(raw: &str) -> Result<Message> {
    serde_json::from_str::<Message>(raw).map_err(|err| {
        let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
        debug!(
            error = %err,
            bytes = raw.len(),
            message = %preview,
            "ws message parse failed"
        );
        FeedError::Serialization(err)
    })
}

/// Receive and decode exactly one message
pub async fn next_message<T>(transport: &mut T) -> Result<Message>
where
    T: FeedTransport + ?Sized,
{
    let raw = transport.recv_text().await?;
    let message = decode_message(&raw)?;
    debug!(
        message_type = %message.message_type,
        product_id = %message.product_id,
        bytes = raw.len(),
        "ws message received"
    );
    Ok(message)
}

/// Send `request`, then return the first message that is not a
/// subscription acknowledgement.
///
/// With `wait` set to `None` the acknowledgement loop is unbounded.
pub async fn start_subscribe<T>(
    transport: &mut T,
    request: &SubscribeRequest,
    wait: Option<Duration>,
) -> Result<Message>
where
    T: FeedTransport + ?Sized,
{
    send_request(transport, request).await?;
    info!(
        action = ?request.kind,
        channels = ?request.channel_names(),
        "ws subscription sent"
    );

    match wait {
        None => skip_acknowledgements(transport).await,
        Some(duration) => timeout(duration, skip_acknowledgements(transport))
            .await
            .map_err(|_| FeedError::Timeout { duration })?,
    }
}

async fn skip_acknowledgements<T>(transport: &mut T) -> Result<Message>
where
    T: FeedTransport + ?Sized,
{
    loop {
        let message = next_message(transport).await?;
        if !message.is_subscriptions() {
            return Ok(message);
        }

        let channels: Vec<&str> = message
            .channels
            .iter()
            .map(|channel| channel.name.as_str())
            .collect();
        debug!(?channels, "ws subscription acknowledged");
    }
}

fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(end + 3);
    out.push_str(&value[..end]);
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageChannel;
    use crate::ws::scripted::ScriptedTransport;
    use serde_json::json;

    fn ticker_request() -> SubscribeRequest {
        SubscribeRequest::subscribe(vec![MessageChannel::new("ticker", ["BTC-USD"])])
    }

    fn ack() -> serde_json::Value {
        json!({
            "type": "subscriptions",
            "channels": [{"name": "ticker", "product_ids": ["BTC-USD"]}]
        })
    }

    #[tokio::test]
    async fn test_sends_request_before_reading() {
        let mut transport = ScriptedTransport::new([json!({"type": "ticker"})]);

        start_subscribe(&mut transport, &ticker_request(), None)
            .await
            .expect("subscribe should succeed");

        assert_eq!(transport.sent.len(), 1);
        let sent: serde_json::Value = serde_json::from_str(&transport.sent[0]).unwrap();
        assert_eq!(
            sent,
            json!({
                "type": "subscribe",
                "channels": [{"name": "ticker", "product_ids": ["BTC-USD"]}]
            })
        );
    }

    #[tokio::test]
    async fn test_skips_every_acknowledgement() {
        let mut transport = ScriptedTransport::new([
            ack(),
            ack(),
            json!({"type": "ticker", "product_id": "BTC-USD"}),
            json!({"type": "ticker", "product_id": "ETH-USD"}),
        ]);

        let message = start_subscribe(&mut transport, &ticker_request(), None)
            .await
            .expect("subscribe should succeed");

        assert_eq!(message.message_type, "ticker");
        assert_eq!(message.product_id, "BTC-USD");
        assert_eq!(transport.remaining(), 1);
    }

    #[tokio::test]
    async fn test_returns_error_type_messages_unchanged() {
        let mut transport = ScriptedTransport::new([json!({
            "type": "error",
            "message": "Failed to subscribe",
            "reason": "BTC-XYZ is not a valid product"
        })]);

        let message = start_subscribe(&mut transport, &ticker_request(), None)
            .await
            .expect("error frames are still messages");

        assert_eq!(message.message_type, "error");
        assert_eq!(message.reason, "BTC-XYZ is not a valid product");
    }

    #[tokio::test]
    async fn test_malformed_frame_propagates_immediately() {
        let mut transport = ScriptedTransport::new([ack()]);
        transport.push_raw("{not json");
        transport.push_raw(&json!({"type": "ticker"}).to_string());

        let err = start_subscribe(&mut transport, &ticker_request(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, FeedError::Serialization(_)));
        assert_eq!(transport.remaining(), 1);
    }

    #[tokio::test]
    async fn test_closed_stream_propagates() {
        let mut transport = ScriptedTransport::new([ack()]);

        let err = start_subscribe(&mut transport, &ticker_request(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, FeedError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_send_failure_propagates() {
        let mut transport = ScriptedTransport::new([json!({"type": "ticker"})]);
        transport.closed = true;

        let err = start_subscribe(&mut transport, &ticker_request(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, FeedError::ConnectionClosed));
        assert!(transport.sent.is_empty());
    }

    /// Acknowledges forever and never sends data
    struct AckOnlyTransport;

    #[async_trait::async_trait]
    impl FeedTransport for AckOnlyTransport {
        async fn send_text(&mut self, _text: String) -> Result<()> {
            Ok(())
        }

        async fn recv_text(&mut self) -> Result<String> {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(ack().to_string())
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_bounded_wait_times_out_on_endless_acknowledgements() {
        let duration = Duration::from_millis(50);

        let err = start_subscribe(&mut AckOnlyTransport, &ticker_request(), Some(duration))
            .await
            .unwrap_err();

        match err {
            FeedError::Timeout { duration: elapsed } => assert_eq!(elapsed, duration),
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("abcdef", 3), "abc...");
        assert_eq!(truncate_for_log("aé", 2), "a...");
    }
}
